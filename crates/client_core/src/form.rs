//! Registration form: draft editing, validation and single-flight submission.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use shared::{
    domain::{DraftRecord, NewRecord, Record},
    error::{Failure, OperationResult},
    protocol::CreateRecordResponse,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    store::RecordStore,
    validation::{validate_age, validate_username, ValidationError, AGE_FIELD, USERNAME_FIELD},
};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "record created";
pub const DEFAULT_SUBMIT_FAILURE_MESSAGE: &str = "failed to create record";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub draft: DraftRecord,
    pub field_errors: BTreeMap<String, String>,
    pub general_error: Option<String>,
    pub submitting: bool,
    pub success_message: Option<String>,
}

impl FormState {
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    /// Both fields currently valid and nothing in flight.
    pub fn can_submit(&self) -> bool {
        !self.submitting
            && validate_username(&self.draft.username).is_ok()
            && validate_age(&self.draft.age).is_ok()
    }
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    RecordCreated(Record),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Record),
    /// Local validation failed; nothing was sent.
    Invalid,
    /// The store rejected the record or could not be reached.
    Rejected(Failure),
    /// A submission was already in flight.
    Ignored,
}

pub struct FormController {
    store: Arc<dyn RecordStore>,
    state: Mutex<FormState>,
    // bumped on reset; a submission only writes back into the draft it was started from
    draft_generation: AtomicU64,
    events: broadcast::Sender<FormEvent>,
}

impl FormController {
    pub fn new(store: Arc<dyn RecordStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            store,
            state: Mutex::new(FormState::default()),
            draft_generation: AtomicU64::new(0),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> FormState {
        self.state.lock().await.clone()
    }

    pub async fn can_submit(&self) -> bool {
        self.state.lock().await.can_submit()
    }

    pub async fn set_username(&self, value: impl Into<String>) {
        let value = value.into();
        let mut guard = self.state.lock().await;
        let error = validate_username(&value).err();
        guard.draft.username = value;
        apply_field_change(&mut guard, USERNAME_FIELD, error);
    }

    pub async fn set_age(&self, value: impl Into<String>) {
        let value = value.into();
        let mut guard = self.state.lock().await;
        let error = validate_age(&value).err();
        guard.draft.age = value;
        apply_field_change(&mut guard, AGE_FIELD, error);
    }

    /// Discards the draft and everything derived from it.
    pub async fn reset(&self) {
        let mut guard = self.state.lock().await;
        // an in-flight submission still owns the flag and clears it when it settles
        let submitting = guard.submitting;
        self.draft_generation.fetch_add(1, Ordering::SeqCst);
        *guard = FormState {
            submitting,
            ..FormState::default()
        };
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (generation, new_record) = {
            let mut guard = self.state.lock().await;
            if guard.submitting {
                debug!("submit ignored: submission already in flight");
                return SubmitOutcome::Ignored;
            }

            let username = validate_username(&guard.draft.username);
            let age = validate_age(&guard.draft.age);
            let (Ok(()), Ok(age)) = (username, age) else {
                guard.field_errors = [username.err(), age.err()]
                    .into_iter()
                    .flatten()
                    .map(|err| (err.field().to_string(), err.to_string()))
                    .collect();
                guard.general_error = None;
                guard.success_message = None;
                return SubmitOutcome::Invalid;
            };

            guard.submitting = true;
            guard.field_errors.clear();
            guard.general_error = None;
            let generation = self.draft_generation.load(Ordering::SeqCst);
            let new_record = NewRecord {
                username: guard.draft.username.trim().to_string(),
                age,
            };
            (generation, new_record)
        };

        let result = self.store.create_record(new_record).await;

        let mut guard = self.state.lock().await;
        guard.submitting = false;
        if self.draft_generation.load(Ordering::SeqCst) != generation {
            return self.settle_discarded(result);
        }

        match result {
            Ok(created) => {
                guard.draft = DraftRecord::default();
                guard.field_errors.clear();
                guard.general_error = None;
                guard.success_message = Some(
                    created
                        .message()
                        .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
                        .to_string(),
                );
                let record = created.into_record();
                info!(record_id = record.id.0, username = %record.username, "record created");
                let _ = self.events.send(FormEvent::RecordCreated(record.clone()));
                SubmitOutcome::Created(record)
            }
            Err(failure) => {
                if let Some(details) = failure.non_empty_field_details() {
                    guard.field_errors = details.clone();
                    guard.general_error = None;
                } else {
                    guard.field_errors.clear();
                    guard.general_error = Some(
                        failure
                            .message
                            .clone()
                            .filter(|message| !message.is_empty())
                            .unwrap_or_else(|| DEFAULT_SUBMIT_FAILURE_MESSAGE.to_string()),
                    );
                }
                guard.success_message = None;
                warn!(
                    kind = %failure.kind,
                    http_status = ?failure.http_status,
                    message = ?failure.message,
                    details = ?failure.field_details,
                    "record submission rejected"
                );
                SubmitOutcome::Rejected(failure)
            }
        }
    }

    /// Settles a submission whose draft was reset while it was in flight. The
    /// current draft is left alone; a created record is still announced.
    fn settle_discarded(&self, result: OperationResult<CreateRecordResponse>) -> SubmitOutcome {
        match result {
            Ok(created) => {
                let record = created.into_record();
                info!(record_id = record.id.0, "record created from a discarded draft");
                let _ = self.events.send(FormEvent::RecordCreated(record.clone()));
                SubmitOutcome::Created(record)
            }
            Err(failure) => {
                debug!(kind = %failure.kind, "submission for a discarded draft failed");
                SubmitOutcome::Rejected(failure)
            }
        }
    }
}

fn apply_field_change(state: &mut FormState, field: &str, error: Option<ValidationError>) {
    state.success_message = None;
    match error {
        Some(err) => {
            state.field_errors.insert(field.to_string(), err.to_string());
        }
        None => {
            state.field_errors.remove(field);
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
