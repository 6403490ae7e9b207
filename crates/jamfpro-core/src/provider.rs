// ── Resource operations ──
//
// Create, read, update, delete and lookup for any kind in the resource
// registry. Each operation moves through the same phases:
//
//   mapping → calling (with retry) → hydrating → reporting
//
// and returns an `OperationReport` instead of an error: every problem is
// a diagnostic, and the outcome is derived from them.

use jamfpro_api::{ErrorClass, JamfClient};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::config::{OperationTimeouts, ProviderConfig};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::CoreError;
use crate::mapping;
use crate::reconcile::{Outcome, ResourceId, reconcile_read_failure};
use crate::retry::{GiveUp, Idempotency, RetryError, with_retry};
use crate::schema::ResourceSchema;
use crate::value::{AttrValue, Attributes};

/// The operation a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Lookup,
}

/// How a data-source style lookup identifies its object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupQuery {
    ById(String),
    ByName(String),
}

/// Class of the backend failure that ended an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials or bearer token refused.
    Authentication,
    NotFound,
    /// The operation's deadline elapsed, or the last attempt timed out.
    Timeout,
    Connection { url: String },
    /// Any other rejection, with the Jamf Pro error code when one was sent.
    Rejected { code: Option<String> },
}

impl FailureKind {
    fn of(err: &RetryError<jamfpro_api::Error>) -> Self {
        use jamfpro_api::Error as ApiError;

        let timed_out = err.reason == GiveUp::DeadlineElapsed
            || matches!(&err.source, ApiError::Timeout { .. })
            || matches!(&err.source, ApiError::Transport(e) if e.is_timeout());
        match &err.source {
            ApiError::Authentication { .. } => Self::Authentication,
            ApiError::Transport(e) if e.is_connect() => Self::Connection {
                url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
            },
            _ if timed_out => Self::Timeout,
            source if source.class() == ErrorClass::NotFound => Self::NotFound,
            source => Self::Rejected {
                code: source.api_error_code().map(str::to_owned),
            },
        }
    }
}

/// Everything an operation produced.
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    pub kind: &'static str,
    pub operation: Operation,
    pub outcome: Outcome,
    /// Tracked identifier after the operation. Cleared on drift and delete.
    #[serde(serialize_with = "id_or_empty")]
    pub id: Option<ResourceId>,
    /// Hydrated attributes, when the server returned an object.
    pub state: Option<Attributes>,
    pub diagnostics: Diagnostics,
    /// Set when a backend call, rather than validation or hydration,
    /// caused the failure.
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

#[allow(clippy::ref_option)]
fn id_or_empty<S: Serializer>(id: &Option<ResourceId>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(id.as_ref().map_or("", ResourceId::as_str))
}

impl OperationReport {
    fn new(schema: &ResourceSchema, operation: Operation) -> Self {
        Self {
            kind: schema.kind,
            operation,
            outcome: Outcome::Success,
            id: None,
            state: None,
            diagnostics: Diagnostics::new(),
            failure: None,
        }
    }

    /// Tracked identifier, or `""` when none is held.
    pub fn id(&self) -> &str {
        self.id.as_ref().map_or("", ResourceId::as_str)
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }

    fn error(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record a failed backend call using the core rendering of its error.
    fn call_failed(&mut self, summary: String, err: RetryError<jamfpro_api::Error>) {
        self.failure = Some(FailureKind::of(&err));
        let RetryError {
            attempts,
            reason,
            source,
            ..
        } = err;
        let detail = format!("{} ({reason} after {attempts} attempt(s))", CoreError::from(source));
        self.error(Diagnostic::error(summary, detail));
    }

    fn finish(mut self) -> Self {
        if self.outcome != Outcome::Drift {
            self.outcome = Outcome::from_diagnostics(&self.diagnostics);
        }
        debug!(
            kind = self.kind,
            operation = %self.operation,
            outcome = %self.outcome,
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            "operation finished"
        );
        self
    }
}

fn missing_id(schema: &ResourceSchema, operation: Operation) -> Diagnostic {
    Diagnostic::error(
        "Missing resource identifier",
        format!("Cannot {operation} {} without an ID.", schema.kind),
    )
    .with_attribute("id")
}

// ── Provider ────────────────────────────────────────────────────────

/// Runs resource operations against one Jamf Pro backend.
pub struct Provider<B> {
    backend: B,
    timeouts: OperationTimeouts,
}

impl Provider<JamfClient> {
    /// Build a provider backed by a live Jamf Pro client.
    pub fn connect(config: ProviderConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let client = JamfClient::from_credentials(config.url.as_str(), config.auth.into(), &transport)?;
        debug!(url = %client.base_url(), "jamf pro client ready");
        Ok(Self::new(client, config.timeouts))
    }
}

impl<B: Backend> Provider<B> {
    pub fn new(backend: B, timeouts: OperationTimeouts) -> Self {
        Self { backend, timeouts }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn timeouts(&self) -> &OperationTimeouts {
        &self.timeouts
    }

    // ── Create ───────────────────────────────────────────────────────

    /// Validate, `POST`, then read the new object back into state.
    pub async fn create(&self, schema: &ResourceSchema, desired: &Value) -> OperationReport {
        let mut report = OperationReport::new(schema, Operation::Create);

        debug!(kind = schema.kind, "mapping desired configuration");
        let body = match mapping::validate(schema, desired) {
            Ok(attrs) => mapping::construct(schema, &attrs),
            Err(diags) => {
                report.diagnostics.append(diags);
                return report.finish();
            }
        };

        debug!(kind = schema.kind, endpoint = schema.endpoint, "creating object");
        let backend = &self.backend;
        let endpoint = schema.endpoint;
        let body = &body;
        let created = match with_retry(&self.timeouts.create, Idempotency::NonIdempotent, move || {
            backend.create(endpoint, body)
        })
        .await
        {
            Ok(created) => created,
            Err(err) => {
                report.call_failed(format!("Failed to create {}", schema.kind), err);
                return report.finish();
            }
        };

        let Some(id) = ResourceId::parse(&created.id) else {
            report.error(Diagnostic::error(
                "Missing identifier in response",
                format!("The server created a {} but returned no ID.", schema.kind),
            ));
            return report.finish();
        };
        info!(kind = schema.kind, %id, "created object");
        report.id = Some(id.clone());

        debug!(kind = schema.kind, %id, "reading back created object");
        match self.fetch(schema, &id).await {
            Ok(remote) => absorb(&mut report, schema, &id, &remote),
            Err(err) => report.call_failed(format!("Failed to read {} after create", schema.kind), err),
        }
        report.finish()
    }

    // ── Read ─────────────────────────────────────────────────────────

    /// Refresh tracked state. A vanished object is drift, not failure.
    pub async fn read(&self, schema: &ResourceSchema, id: &str) -> OperationReport {
        let mut report = OperationReport::new(schema, Operation::Read);
        let Some(id) = ResourceId::parse(id) else {
            report.error(missing_id(schema, Operation::Read));
            return report.finish();
        };
        report.id = Some(id.clone());

        debug!(kind = schema.kind, %id, "reading object");
        match self.fetch(schema, &id).await {
            Ok(remote) => absorb(&mut report, schema, &id, &remote),
            Err(err) => {
                if reconcile_read_failure(schema.kind, &id, &err, &mut report.diagnostics)
                    == Outcome::Drift
                {
                    report.id = None;
                    report.outcome = Outcome::Drift;
                } else {
                    report.failure = Some(FailureKind::of(&err));
                }
            }
        }
        report.finish()
    }

    // ── Update ───────────────────────────────────────────────────────

    /// Validate and `PUT` the full desired configuration.
    pub async fn update(&self, schema: &ResourceSchema, id: &str, desired: &Value) -> OperationReport {
        let mut report = OperationReport::new(schema, Operation::Update);
        let Some(id) = ResourceId::parse(id) else {
            report.error(missing_id(schema, Operation::Update));
            return report.finish();
        };
        report.id = Some(id.clone());

        debug!(kind = schema.kind, %id, "mapping desired configuration");
        let body = match mapping::validate(schema, desired) {
            Ok(attrs) => mapping::construct(schema, &attrs),
            Err(diags) => {
                report.diagnostics.append(diags);
                return report.finish();
            }
        };

        debug!(kind = schema.kind, %id, "updating object");
        let backend = &self.backend;
        let endpoint = schema.endpoint;
        let raw_id = id.as_str();
        let body = &body;
        match with_retry(&self.timeouts.update, Idempotency::Idempotent, move || {
            backend.update(endpoint, raw_id, body)
        })
        .await
        {
            Ok(remote) => {
                info!(kind = schema.kind, %id, "updated object");
                absorb(&mut report, schema, &id, &remote);
            }
            Err(err) => report.call_failed(format!("Failed to update {}", schema.kind), err),
        }
        report.finish()
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// `DELETE` the object. An object that is already gone counts as deleted.
    pub async fn delete(&self, schema: &ResourceSchema, id: &str) -> OperationReport {
        let mut report = OperationReport::new(schema, Operation::Delete);
        let Some(id) = ResourceId::parse(id) else {
            report.error(missing_id(schema, Operation::Delete));
            return report.finish();
        };
        report.id = Some(id.clone());

        debug!(kind = schema.kind, %id, "deleting object");
        let backend = &self.backend;
        let endpoint = schema.endpoint;
        let raw_id = id.as_str();
        match with_retry(&self.timeouts.delete, Idempotency::Idempotent, move || {
            backend.delete(endpoint, raw_id)
        })
        .await
        {
            Ok(()) => {
                info!(kind = schema.kind, %id, "deleted object");
                report.id = None;
            }
            Err(err) if err.source.class() == ErrorClass::NotFound => {
                report.diagnostics.push(Diagnostic::warning(
                    format!("{} already deleted", schema.kind),
                    format!("{} with ID \"{id}\" was not found on the server.", schema.kind),
                ));
                report.id = None;
            }
            Err(err) => report.call_failed(format!("Failed to delete {}", schema.kind), err),
        }
        report.finish()
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Find one existing object by ID or by name without tracking it.
    pub async fn lookup(&self, schema: &ResourceSchema, query: &LookupQuery) -> OperationReport {
        let mut report = OperationReport::new(schema, Operation::Lookup);

        match query {
            LookupQuery::ById(raw) => {
                let Some(id) = ResourceId::parse(raw) else {
                    report.error(missing_id(schema, Operation::Lookup));
                    return report.finish();
                };
                debug!(kind = schema.kind, %id, "looking up object by id");
                match self.fetch(schema, &id).await {
                    Ok(remote) => {
                        report.id = Some(id.clone());
                        absorb(&mut report, schema, &id, &remote);
                    }
                    Err(err) => report.call_failed(format!("Failed to look up {} {id}", schema.kind), err),
                }
            }
            LookupQuery::ByName(name) => {
                debug!(kind = schema.kind, name = %name, "looking up object by name");
                let backend = &self.backend;
                let endpoint = schema.endpoint;
                let objects = match with_retry(&self.timeouts.read, Idempotency::Idempotent, move || {
                    backend.list(endpoint)
                })
                .await
                {
                    Ok(objects) => objects,
                    Err(err) => {
                        report.call_failed(format!("Failed to list {}", schema.kind), err);
                        return report.finish();
                    }
                };

                let matches: Vec<&Value> = objects
                    .iter()
                    .filter(|obj| obj.get(schema.name_field).and_then(Value::as_str) == Some(name.as_str()))
                    .collect();

                match matches.as_slice() {
                    [remote] => {
                        let mut diags = Diagnostics::new();
                        let state = mapping::hydrate(schema, remote, &mut diags);
                        report.id = state
                            .get("id")
                            .and_then(AttrValue::as_str)
                            .and_then(ResourceId::parse);
                        if report.id.is_none() {
                            diags.push(Diagnostic::error(
                                "Missing identifier in response",
                                format!("The {} named {name:?} has no ID.", schema.kind),
                            ));
                        }
                        report.diagnostics.append(diags);
                        report.state = Some(state);
                    }
                    [] => report.error(Diagnostic::error(
                        format!("No {} found", schema.kind),
                        format!("No {} has {} = {name:?}.", schema.kind, schema.name_field),
                    )),
                    several => report.error(Diagnostic::error(
                        format!("Ambiguous {} lookup", schema.kind),
                        format!(
                            "{} objects of kind {} have {} = {name:?}.",
                            several.len(),
                            schema.kind,
                            schema.name_field
                        ),
                    )),
                }
            }
        }
        report.finish()
    }

    async fn fetch(
        &self,
        schema: &ResourceSchema,
        id: &ResourceId,
    ) -> Result<Value, RetryError<jamfpro_api::Error>> {
        let backend = &self.backend;
        let endpoint = schema.endpoint;
        let raw_id = id.as_str();
        with_retry(&self.timeouts.read, Idempotency::Idempotent, move || {
            backend.get(endpoint, raw_id)
        })
        .await
    }
}

/// Hydrate `remote` into the report's state, keeping the tracked ID.
fn absorb(report: &mut OperationReport, schema: &ResourceSchema, id: &ResourceId, remote: &Value) {
    let mut diags = Diagnostics::new();
    let mut state = mapping::hydrate(schema, remote, &mut diags);

    if let Some(reported) = state.get("id").and_then(AttrValue::as_str) {
        if reported != id.as_str() {
            diags.push(
                Diagnostic::error(
                    "Identifier changed",
                    format!(
                        "The server returned {} with ID \"{reported}\" for tracked ID \"{id}\"; keeping \"{id}\".",
                        schema.kind
                    ),
                )
                .with_attribute("id"),
            );
        }
    }
    state.insert("id".to_owned(), AttrValue::from(id.as_str()));

    report.diagnostics.append(diags);
    report.state = Some(state);
}
