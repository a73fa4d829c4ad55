//! Fakes shared by the controller tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{NewRecord, PageResult, Pagination, QueryParams, Record, RecordId},
    error::{Failure, OperationResult},
    protocol::CreateRecordResponse,
};
use tokio::sync::{oneshot, Mutex};

use crate::{
    diagnostics::{DiagnosticEvent, DiagnosticSink},
    store::RecordStore,
};

#[derive(Default)]
pub struct RecordingDiagnostics {
    events: StdMutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn record_event(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

pub fn record(id: i64, username: &str, age: i64) -> Record {
    Record {
        id: RecordId(id),
        username: username.to_string(),
        age,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp"),
    }
}

/// In-memory record store that filters and pages like the remote one.
///
/// List answers are computed when the call arrives; a held call then waits for
/// its release before returning, which lets tests resolve calls out of order.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<Record>>,
    list_calls: Mutex<Vec<QueryParams>>,
    create_calls: Mutex<Vec<NewRecord>>,
    list_failure: Mutex<Option<Failure>>,
    create_failure: Mutex<Option<Failure>>,
    held_lists: Mutex<VecDeque<oneshot::Receiver<()>>>,
    held_creates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl InMemoryStore {
    pub fn with_records(records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Self::default()
        })
    }

    pub fn with_usernames(count: usize) -> Arc<Self> {
        Self::with_records(
            (1..=count)
                .map(|i| record(i as i64, &format!("user_{i:02}"), 20 + i as i64))
                .collect(),
        )
    }

    pub async fn push_record(&self, record: Record) {
        self.records.lock().await.push(record);
    }

    pub async fn list_calls(&self) -> Vec<QueryParams> {
        self.list_calls.lock().await.clone()
    }

    pub async fn create_calls(&self) -> Vec<NewRecord> {
        self.create_calls.lock().await.clone()
    }

    pub async fn fail_lists_with(&self, failure: Option<Failure>) {
        *self.list_failure.lock().await = failure;
    }

    pub async fn fail_creates_with(&self, failure: Option<Failure>) {
        *self.create_failure.lock().await = failure;
    }

    /// Holds the next list call until the returned sender fires.
    pub async fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_lists.lock().await.push_back(rx);
        tx
    }

    /// Holds the next create call until the returned sender fires.
    pub async fn hold_next_create(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_creates.lock().await.push_back(rx);
        tx
    }

    pub async fn wait_for_list_calls(&self, count: usize) {
        wait_until(|| async move { self.list_calls.lock().await.len() >= count }).await;
    }

    pub async fn wait_for_create_calls(&self, count: usize) {
        wait_until(|| async move { self.create_calls.lock().await.len() >= count }).await;
    }

    async fn page_for(&self, params: &QueryParams) -> PageResult {
        let records = self.records.lock().await;
        let matching: Vec<Record> = records
            .iter()
            .filter(|record| {
                params
                    .keyword
                    .as_deref()
                    .map_or(true, |keyword| record.username.contains(keyword))
            })
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let page: Vec<Record> = matching
            .into_iter()
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .collect();
        PageResult {
            records: page,
            pagination: Pagination {
                total,
                has_next: params.offset + u64::from(params.limit) < total,
                has_prev: params.offset > 0,
            },
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn create_record(&self, new_record: NewRecord) -> OperationResult<CreateRecordResponse> {
        let held = self.held_creates.lock().await.pop_front();
        self.create_calls.lock().await.push(new_record.clone());
        if let Some(release) = held {
            let _ = release.await;
        }
        if let Some(failure) = self.create_failure.lock().await.clone() {
            return Err(failure);
        }

        let mut records = self.records.lock().await;
        let created = record(
            records.len() as i64 + 1,
            &new_record.username,
            new_record.age,
        );
        records.push(created.clone());
        Ok(CreateRecordResponse::Wrapped {
            message: Some("user created".to_string()),
            user: created,
        })
    }

    async fn list_records(&self, params: QueryParams) -> OperationResult<PageResult> {
        let held = self.held_lists.lock().await.pop_front();
        self.list_calls.lock().await.push(params.clone());
        let failure = self.list_failure.lock().await.clone();
        let answer = match failure {
            Some(failure) => Err(failure),
            None => Ok(self.page_for(&params).await),
        };
        if let Some(release) = held {
            let _ = release.await;
        }
        answer
    }

    async fn get_record(&self, id: RecordId) -> OperationResult<Record> {
        self.records
            .lock()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| Failure {
                kind: shared::error::FailureKind::ServerError,
                message: Some("user not found".to_string()),
                field_details: None,
                http_status: Some(404),
            })
    }
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn wait_until<F, Fut>(condition: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
