use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{NewRecord, PageResult, QueryParams, Record, RecordId},
    error::OperationResult,
    protocol::{CreateRecordResponse, GetRecordResponse, ListRecordsResponse},
};

use crate::{
    config::ClientSettings,
    diagnostics::DiagnosticSink,
    transport::{RequestDescriptor, ResultNormalizer},
};

const USERS_PATH: &str = "users";

/// The remote record store as seen by the controllers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_record(&self, record: NewRecord) -> OperationResult<CreateRecordResponse>;
    async fn list_records(&self, params: QueryParams) -> OperationResult<PageResult>;
    async fn get_record(&self, id: RecordId) -> OperationResult<Record>;
}

/// [`RecordStore`] over the store's HTTP API.
pub struct HttpRecordStore {
    normalizer: ResultNormalizer,
}

impl HttpRecordStore {
    pub fn new(
        settings: &ClientSettings,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            normalizer: ResultNormalizer::new(settings, diagnostics)?,
        })
    }

    pub fn normalizer(&self) -> &ResultNormalizer {
        &self.normalizer
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn create_record(&self, record: NewRecord) -> OperationResult<CreateRecordResponse> {
        self.normalizer
            .call_with_json(RequestDescriptor::post(USERS_PATH), &record)
            .await
    }

    async fn list_records(&self, params: QueryParams) -> OperationResult<PageResult> {
        let descriptor = RequestDescriptor::get(USERS_PATH).with_query(params.query_pairs());
        let body: ListRecordsResponse = self.normalizer.call(descriptor).await?;
        Ok(body.into())
    }

    async fn get_record(&self, id: RecordId) -> OperationResult<Record> {
        let descriptor = RequestDescriptor::get(format!("{USERS_PATH}/{}", id.0));
        let body: GetRecordResponse = self.normalizer.call(descriptor).await?;
        Ok(body.user)
    }
}
