//! Side channel for raw failure details. Recording an event never changes what
//! the caller receives.

use shared::error::FailureKind;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub operation: String,
    pub kind: FailureKind,
    pub http_status: Option<u16>,
    pub detail: String,
}

pub trait DiagnosticSink: Send + Sync {
    fn record_event(&self, event: DiagnosticEvent);
}

/// Forwards diagnostic events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn record_event(&self, event: DiagnosticEvent) {
        warn!(
            operation = %event.operation,
            kind = %event.kind,
            http_status = ?event.http_status,
            detail = %event.detail,
            "record store call failed"
        );
    }
}
