//! Chooses the presented view and relays "record created" from the form to the
//! directory while the directory is presented.

use std::sync::Arc;

use tokio::{
    sync::{broadcast::error::RecvError, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    directory::DirectoryController,
    form::{FormController, FormEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Form,
    Directory,
}

pub struct ViewCoordinator {
    form: Arc<FormController>,
    directory: Arc<DirectoryController>,
    active: Mutex<View>,
    relay: Mutex<Option<JoinHandle<()>>>,
}

impl ViewCoordinator {
    /// Starts with the form presented and subscribes to its notifications.
    pub fn start(form: Arc<FormController>, directory: Arc<DirectoryController>) -> Arc<Self> {
        let coordinator = Arc::new(Self {
            form,
            directory,
            active: Mutex::new(View::Form),
            relay: Mutex::new(None),
        });
        let relay = tokio::spawn(Self::relay_events(
            Arc::downgrade(&coordinator),
            coordinator.form.subscribe_events(),
        ));
        if let Ok(mut slot) = coordinator.relay.try_lock() {
            *slot = Some(relay);
        }
        coordinator
    }

    pub fn form(&self) -> &Arc<FormController> {
        &self.form
    }

    pub fn directory(&self) -> &Arc<DirectoryController> {
        &self.directory
    }

    pub async fn active(&self) -> View {
        *self.active.lock().await
    }

    /// Presents `view`. Leaving the form discards its draft; presenting the
    /// directory initializes it.
    pub async fn present(&self, view: View) {
        let previous = {
            let mut active = self.active.lock().await;
            std::mem::replace(&mut *active, view)
        };
        if previous == view {
            return;
        }
        info!(?previous, ?view, "presenting view");

        if previous == View::Form {
            self.form.reset().await;
        }
        if view == View::Directory {
            self.directory.initialize().await;
        }
    }

    pub async fn shutdown(&self) {
        if let Some(relay) = self.relay.lock().await.take() {
            relay.abort();
        }
    }

    async fn relay_events(
        coordinator: std::sync::Weak<Self>,
        mut events: tokio::sync::broadcast::Receiver<FormEvent>,
    ) {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "form notifications lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let Some(coordinator) = coordinator.upgrade() else {
                break;
            };

            match event {
                FormEvent::RecordCreated(record) => {
                    if coordinator.active().await != View::Directory {
                        debug!(record_id = record.id.0, "record created while directory hidden");
                        continue;
                    }
                    info!(record_id = record.id.0, "refreshing directory after record created");
                    let directory = Arc::clone(&coordinator.directory);
                    tokio::spawn(async move { directory.refresh().await });
                }
            }
        }
    }
}

impl Drop for ViewCoordinator {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.get_mut().take() {
            relay.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
