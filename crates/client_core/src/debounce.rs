use std::{future::Future, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};
use tracing::debug;

/// Runs at most one pending task after a quiet period.
///
/// Scheduling again before the period elapses cancels the pending task. Once
/// the period has elapsed the task is detached, so cancellation never reaches
/// work that has already started.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                debug!("debounced task rescheduled");
            }
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Drops the pending task, if any. Returns whether one was still waiting.
    pub async fn cancel(&self) -> bool {
        match self.pending.lock().await.take() {
            Some(previous) => {
                let waiting = !previous.is_finished();
                previous.abort();
                waiting
            }
            None => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test(start_paused = true)]
    async fn only_the_last_scheduled_task_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let runs = Arc::new(Mutex::new(Vec::new()));

        for label in ["a", "ab", "abc"] {
            let runs = runs.clone();
            debouncer
                .schedule(async move { runs.lock().await.push(label) })
                .await;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(runs.lock().await.is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*runs.lock().await, vec!["abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_out_tasks_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let runs = runs.clone();
            debouncer
                .schedule(async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .await;
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_task() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        debouncer
            .schedule(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert!(debouncer.cancel().await);
        assert!(!debouncer.cancel().await);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
