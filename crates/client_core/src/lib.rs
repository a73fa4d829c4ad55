//! Client-side state for the directory: registration form, searchable listing
//! and the coordinator that ties them together, all backed by a remote record
//! store reached through a single normalizing transport.

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod diagnostics;
pub mod directory;
pub mod form;
pub mod store;
pub mod transport;
pub mod validation;

pub use config::{load_settings, ClientSettings};
pub use coordinator::{View, ViewCoordinator};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, TracingDiagnostics};
pub use directory::{DirectoryController, DirectoryState, SEARCH_DEBOUNCE};
pub use form::{FormController, FormEvent, FormState, SubmitOutcome};
pub use store::{HttpRecordStore, RecordStore};
pub use transport::{RequestDescriptor, ResultNormalizer};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
