//! Result normalization for every call made to the record store.
//!
//! Transport failures, error responses and locally malformed requests all come
//! back as a [`Failure`]; nothing is retried here.

use std::sync::Arc;

use anyhow::Context;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::{ErrorBody, Failure, FailureKind, OperationResult};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    diagnostics::{DiagnosticEvent, DiagnosticSink},
};

pub const NETWORK_FAILURE_MESSAGE: &str =
    "network connection failed; check that the record store is running";
pub const TIMEOUT_FAILURE_MESSAGE: &str = "the record store did not answer in time";

/// One request against the record store, relative to the configured base address.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_json<T: Serialize>(mut self, body: &T) -> OperationResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|err| Failure::request_config(format!("request body is not valid JSON: {err}")))?;
        self.body = Some(value);
        Ok(self)
    }

    fn operation(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

pub struct ResultNormalizer {
    http: Client,
    base_address: Url,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ResultNormalizer {
    pub fn new(
        settings: &ClientSettings,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("failed to build record store http client")?;
        Ok(Self {
            http,
            base_address: settings.base_address.clone(),
            diagnostics,
        })
    }

    pub fn base_address(&self) -> &Url {
        &self.base_address
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> OperationResult<T> {
        let operation = descriptor.operation();

        let url = match self.resolve(&descriptor.path) {
            Ok(url) => url,
            Err(detail) => {
                return Err(self.fail(&operation, Failure::request_config(detail.clone()), detail))
            }
        };

        let mut request = self.http.request(descriptor.method, url);
        if !descriptor.query.is_empty() {
            request = request.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        debug!(operation = %operation, "calling record store");
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let failure = classify_send_error(&err);
                return Err(self.fail(&operation, failure, err.to_string()));
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let mut failure = classify_send_error(&err);
                failure.http_status = Some(status.as_u16());
                return Err(self.fail(&operation, failure, err.to_string()));
            }
        };

        if !status.is_success() {
            let body = serde_json::from_slice::<ErrorBody>(&bytes).unwrap_or_default();
            let failure = Failure::from_error_body(status.as_u16(), body);
            let detail = String::from_utf8_lossy(&bytes).into_owned();
            return Err(self.fail(&operation, failure, detail));
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            let failure = Failure {
                kind: FailureKind::ServerError,
                message: Some(format!("malformed response from record store: {err}")),
                field_details: None,
                http_status: Some(status.as_u16()),
            };
            self.fail(&operation, failure, String::from_utf8_lossy(&bytes).into_owned())
        })
    }

    /// Attaches `body` as JSON and calls the store. A body that cannot be
    /// serialized is reported like any other request-config failure.
    pub async fn call_with_json<B: Serialize, T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
        body: &B,
    ) -> OperationResult<T> {
        let operation = descriptor.operation();
        let descriptor = descriptor.with_json(body).map_err(|failure| {
            let detail = failure.display_message();
            self.fail(&operation, failure, detail)
        })?;
        self.call(descriptor).await
    }

    fn resolve(&self, path: &str) -> Result<Url, String> {
        if path.contains("://") {
            return Err(format!(
                "request path '{path}' must be relative to the record store base address"
            ));
        }
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err("request path must not be empty".to_string());
        }
        self.base_address
            .join(path)
            .map_err(|err| format!("invalid request path '{path}': {err}"))
    }

    fn fail(&self, operation: &str, failure: Failure, detail: String) -> Failure {
        self.diagnostics.record_event(DiagnosticEvent {
            operation: operation.to_string(),
            kind: failure.kind,
            http_status: failure.http_status,
            detail,
        });
        failure
    }
}

fn classify_send_error(err: &reqwest::Error) -> Failure {
    if err.is_builder() {
        Failure::request_config(err.to_string())
    } else if err.is_timeout() {
        Failure::network(TIMEOUT_FAILURE_MESSAGE)
    } else {
        Failure::network(NETWORK_FAILURE_MESSAGE)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
