// jamfpro-core: Reconciliation layer between jamfpro-api and consumers (CLI, plugins).

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod mapping;
pub mod provider;
pub mod reconcile;
pub mod resources;
pub mod retry;
pub mod schema;
pub mod value;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use config::{AuthCredentials, OperationTimeouts, ProviderConfig, TlsVerification};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::CoreError;
pub use provider::{FailureKind, LookupQuery, Operation, OperationReport, Provider};
pub use reconcile::{Outcome, ResourceId};
pub use retry::{GiveUp, Idempotency, RetryError, RetryPolicy, Retryable};
pub use schema::{DefaultValue, Field, FieldKind, Presence, ResourceSchema};
pub use value::{AttrValue, Attributes};
