// ── Not-found reconciliation ──
//
// A tracked object can vanish from the server between runs (deleted in
// the web console, for example). Reads treat that as drift: the object is
// dropped from tracked state with a warning so the next plan recreates
// it. Every other read failure stays a failure.

use std::fmt;

use jamfpro_api::ErrorClass;
use serde::Serialize;
use tracing::warn;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::retry::Retryable;

/// Server-assigned identifier of a tracked object. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of one resource operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// Completed; state reflects the server.
    Success,
    /// The object is gone from the server; its ID has been cleared.
    Drift,
    /// At least one error diagnostic was recorded.
    Failure,
}

impl Outcome {
    /// `Failure` iff `diags` holds an error, otherwise `Success`.
    pub fn from_diagnostics(diags: &Diagnostics) -> Self {
        if diags.has_error() {
            Self::Failure
        } else {
            Self::Success
        }
    }
}

/// Turn a failed read into drift or failure.
///
/// NotFound records exactly one warning naming the ID and yields `Drift`;
/// the caller must clear the tracked ID. Anything else records one error
/// and yields `Failure`.
pub fn reconcile_read_failure<E>(
    kind: &str,
    id: &ResourceId,
    error: &E,
    diags: &mut Diagnostics,
) -> Outcome
where
    E: Retryable + fmt::Display,
{
    if error.class() == ErrorClass::NotFound {
        warn!(kind, %id, "object not found on server, removing from state");
        diags.push(Diagnostic::warning(
            format!("{kind} not found"),
            format!(
                "{kind} with ID \"{id}\" was not found on the server and is being removed from tracked state"
            ),
        ));
        Outcome::Drift
    } else {
        diags.push(Diagnostic::error(
            format!("Failed to read {kind}"),
            format!("{kind} with ID \"{id}\" could not be read: {error}"),
        ));
        Outcome::Failure
    }
}
