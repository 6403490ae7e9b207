#![allow(clippy::unwrap_used)]
// End-to-end provider scenarios against an in-memory Jamf Pro backend.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use jamfpro_api::{CreatedRef, Error};
use jamfpro_core::resources::{BUILDING, SMART_COMPUTER_GROUP};
use jamfpro_core::{
    AttrValue, Backend, FailureKind, LookupQuery, OperationTimeouts, Outcome, Provider, Severity,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

// ── In-memory backend ───────────────────────────────────────────────

#[derive(Default)]
struct MemoryBackend {
    objects: Mutex<BTreeMap<(String, String), Value>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    failures: Mutex<VecDeque<Error>>,
    /// When set, `get` returns this body instead of the stored object.
    canned: Mutex<Option<Value>>,
}

impl MemoryBackend {
    fn starting_at(id: u64) -> Self {
        Self {
            next_id: AtomicU64::new(id),
            ..Self::default()
        }
    }

    fn insert(&self, endpoint: &str, id: &str, object: Value) {
        self.objects
            .lock()
            .unwrap()
            .insert((endpoint.to_owned(), id.to_owned()), object);
    }

    fn fail_next(&self, err: Error) {
        self.failures.lock().unwrap().push_back(err);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), Error> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn not_found() -> Error {
    Error::Api {
        status: 404,
        message: "Object not found".into(),
        code: Some("INVALID_ID".into()),
    }
}

fn unavailable() -> Error {
    Error::Api {
        status: 503,
        message: "Service Unavailable".into(),
        code: None,
    }
}

impl Backend for MemoryBackend {
    async fn get(&self, endpoint: &str, id: &str) -> Result<Value, Error> {
        self.record(format!("GET {endpoint}/{id}"))?;
        if let Some(canned) = self.canned.lock().unwrap().clone() {
            return Ok(canned);
        }
        self.objects
            .lock()
            .unwrap()
            .get(&(endpoint.to_owned(), id.to_owned()))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create(&self, endpoint: &str, body: &Value) -> Result<CreatedRef, Error> {
        self.record(format!("POST {endpoint}"))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let mut object = body.clone();
        object["id"] = json!(id);
        self.insert(endpoint, &id, object);
        Ok(CreatedRef {
            href: Some(format!("/api/{endpoint}/{id}")),
            id,
        })
    }

    async fn update(&self, endpoint: &str, id: &str, body: &Value) -> Result<Value, Error> {
        self.record(format!("PUT {endpoint}/{id}"))?;
        let key = (endpoint.to_owned(), id.to_owned());
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&key) {
            return Err(not_found());
        }
        let mut object = body.clone();
        object["id"] = json!(id);
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), Error> {
        self.record(format!("DELETE {endpoint}/{id}"))?;
        self.objects
            .lock()
            .unwrap()
            .remove(&(endpoint.to_owned(), id.to_owned()))
            .map(|_| ())
            .ok_or_else(not_found)
    }

    async fn list(&self, endpoint: &str) -> Result<Vec<Value>, Error> {
        self.record(format!("LIST {endpoint}"))?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((ep, _), _)| ep == endpoint)
            .map(|(_, v)| v.clone())
            .collect())
    }
}

fn provider(backend: MemoryBackend) -> Provider<MemoryBackend> {
    Provider::new(backend, OperationTimeouts::uniform(Duration::from_secs(30)))
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_building_tracks_server_id() {
    let provider = provider(MemoryBackend::starting_at(42));

    let report = provider.create(&BUILDING, &json!({ "name": "Finance" })).await;

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(report.id(), "42");
    assert!(report.diagnostics.is_empty());
    let state = report.state.unwrap();
    assert_eq!(state.get("name"), Some(&AttrValue::from("Finance")));
    assert_eq!(state.get("id"), Some(&AttrValue::from("42")));
    assert_eq!(
        provider.backend().calls(),
        vec!["POST v1/buildings", "GET v1/buildings/42"]
    );
}

#[tokio::test]
async fn invalid_configuration_fails_before_any_call() {
    let provider = provider(MemoryBackend::starting_at(1));

    let report = provider
        .create(&BUILDING, &json!({ "city": 7, "floors": 3 }))
        .await;

    assert_eq!(report.outcome, Outcome::Failure);
    assert_eq!(report.id(), "");
    // unknown `floors`, missing `name`, mistyped `city`
    assert_eq!(report.diagnostics.error_count(), 3);
    assert!(provider.backend().calls().is_empty());
}

#[tokio::test]
async fn create_is_not_retried_after_a_transient_failure() {
    let backend = MemoryBackend::starting_at(1);
    backend.fail_next(unavailable());
    let provider = provider(backend);

    let report = provider.create(&BUILDING, &json!({ "name": "HQ" })).await;

    assert_eq!(report.outcome, Outcome::Failure);
    assert_eq!(provider.backend().calls(), vec!["POST v1/buildings"]);
    let detail = &report.diagnostics.iter().next().unwrap().detail;
    assert!(detail.contains("Service Unavailable"), "{detail}");
}

#[tokio::test]
async fn nested_blocks_round_trip_through_create() {
    let provider = provider(MemoryBackend::starting_at(5));

    let report = provider
        .create(
            &SMART_COMPUTER_GROUP,
            &json!({
                "name": "Sonoma Macs",
                "criteria": [{ "name": "Operating System Version", "search_type": "like", "value": "14." }],
            }),
        )
        .await;

    assert_eq!(report.outcome, Outcome::Success, "{:?}", report.diagnostics);
    let state = report.state.unwrap();
    let Some(AttrValue::List(criteria)) = state.get("criteria") else {
        panic!("criteria missing from state");
    };
    let Some(AttrValue::Block(first)) = criteria.first() else {
        panic!("criterion missing");
    };
    assert_eq!(first.get("search_type"), Some(&AttrValue::from("like")));
    assert_eq!(first.get("and_or"), Some(&AttrValue::from("and")));
}

// ── Read ────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_of_vanished_object_is_drift() {
    let provider = provider(MemoryBackend::default());

    let report = provider.read(&BUILDING, "99").await;

    assert_eq!(report.outcome, Outcome::Drift);
    assert_eq!(report.id(), "");
    assert_eq!(report.diagnostics.len(), 1);
    let warning = report.diagnostics.iter().next().unwrap();
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.detail.contains("\"99\""));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["id"], json!(""));
    assert_eq!(json["outcome"], json!("drift"));
}

#[tokio::test]
async fn read_with_empty_id_makes_no_call() {
    let provider = provider(MemoryBackend::default());

    let report = provider.read(&BUILDING, "").await;

    assert_eq!(report.outcome, Outcome::Failure);
    assert_eq!(report.diagnostics.error_count(), 1);
    assert!(provider.backend().calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn read_retries_transient_failures() {
    let backend = MemoryBackend::default();
    backend.insert("v1/buildings", "3", json!({ "id": "3", "name": "Annex" }));
    backend.fail_next(unavailable());
    backend.fail_next(Error::RateLimited {
        retry_after_secs: Some(2),
    });
    let provider = provider(backend);

    let report = provider.read(&BUILDING, "3").await;

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(provider.backend().calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn read_that_never_recovers_fails_at_the_deadline() {
    let backend = MemoryBackend::default();
    backend.insert("v1/buildings", "3", json!({ "id": "3", "name": "Annex" }));
    for _ in 0..20 {
        backend.fail_next(unavailable());
    }
    let provider = provider(backend);

    let report = provider.read(&BUILDING, "3").await;

    // Backoff 0.5s doubling to 10s: attempts at 0, 0.5, 1.5, 3.5, 7.5, 15.5, 25.5.
    assert_eq!(report.outcome, Outcome::Failure);
    assert_eq!(report.id(), "3");
    assert_eq!(report.failure, Some(FailureKind::Timeout));
    assert_eq!(provider.backend().calls().len(), 7);
    let detail = &report.diagnostics.errors().next().unwrap().detail;
    assert!(detail.contains("after 7 attempt(s)"), "got: {detail}");
    assert!(detail.contains("HTTP 503"), "got: {detail}");
}

#[tokio::test]
async fn read_failure_other_than_not_found_keeps_id() {
    let backend = MemoryBackend::default();
    backend.fail_next(Error::Api {
        status: 403,
        message: "Forbidden".into(),
        code: None,
    });
    let provider = provider(backend);

    let report = provider.read(&BUILDING, "8").await;

    assert_eq!(report.outcome, Outcome::Failure);
    assert_eq!(report.id(), "8");
    assert_eq!(provider.backend().calls().len(), 1);
}

#[tokio::test]
async fn hydration_problems_are_all_reported() {
    let backend = MemoryBackend::default();
    *backend.canned.lock().unwrap() = Some(json!({
        "id": "4",
        "name": "Lab",
        "city": true,
        "country": ["US"],
    }));
    let provider = provider(backend);

    let report = provider.read(&BUILDING, "4").await;

    assert_eq!(report.outcome, Outcome::Failure);
    let attributes: Vec<_> = report
        .diagnostics
        .errors()
        .filter_map(|d| d.attribute.as_deref())
        .collect();
    assert_eq!(attributes, vec!["city", "country"]);
    assert_eq!(
        report.state.unwrap().get("name"),
        Some(&AttrValue::from("Lab"))
    );
}

#[tokio::test]
async fn changed_server_id_keeps_tracked_id() {
    let backend = MemoryBackend::default();
    *backend.canned.lock().unwrap() = Some(json!({ "id": "77", "name": "Lab" }));
    let provider = provider(backend);

    let report = provider.read(&BUILDING, "4").await;

    assert_eq!(report.outcome, Outcome::Failure);
    assert_eq!(report.id(), "4");
    assert_eq!(
        report.state.unwrap().get("id"),
        Some(&AttrValue::from("4"))
    );
}

// ── Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_the_object() {
    let backend = MemoryBackend::default();
    backend.insert("v1/buildings", "42", json!({ "id": "42", "name": "Finance" }));
    let provider = provider(backend);

    let report = provider
        .update(&BUILDING, "42", &json!({ "name": "Finance", "city": "Minneapolis" }))
        .await;

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(
        report.state.unwrap().get("city"),
        Some(&AttrValue::from("Minneapolis"))
    );
}

#[tokio::test]
async fn update_of_missing_object_is_a_failure() {
    let provider = provider(MemoryBackend::default());

    let report = provider.update(&BUILDING, "13", &json!({ "name": "Gone" })).await;

    assert_eq!(report.outcome, Outcome::Failure);
    assert_eq!(report.id(), "13");
    assert_eq!(report.failure, Some(FailureKind::NotFound));
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_clears_the_id() {
    let backend = MemoryBackend::default();
    backend.insert("v1/buildings", "42", json!({ "id": "42", "name": "Finance" }));
    let provider = provider(backend);

    let report = provider.delete(&BUILDING, "42").await;

    assert_eq!(report.outcome, Outcome::Success);
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.id(), "");
}

#[tokio::test]
async fn deleting_an_absent_object_succeeds_with_a_warning() {
    let provider = provider(MemoryBackend::default());

    let report = provider.delete(&BUILDING, "99").await;

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(report.id(), "");
    assert_eq!(report.diagnostics.warning_count(), 1);
}

// ── Lookup ──────────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_by_name_finds_a_single_match() {
    let backend = MemoryBackend::default();
    backend.insert("v1/buildings", "1", json!({ "id": "1", "name": "HQ" }));
    backend.insert("v1/buildings", "2", json!({ "id": "2", "name": "Annex" }));
    let provider = provider(backend);

    let report = provider
        .lookup(&BUILDING, &LookupQuery::ByName("Annex".into()))
        .await;

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(report.id(), "2");
}

#[tokio::test]
async fn lookup_by_name_rejects_zero_or_many_matches() {
    let backend = MemoryBackend::default();
    backend.insert("v1/buildings", "1", json!({ "id": "1", "name": "HQ" }));
    backend.insert("v1/buildings", "2", json!({ "id": "2", "name": "HQ" }));
    let provider = provider(backend);

    let missing = provider
        .lookup(&BUILDING, &LookupQuery::ByName("Annex".into()))
        .await;
    let ambiguous = provider
        .lookup(&BUILDING, &LookupQuery::ByName("HQ".into()))
        .await;

    assert_eq!(missing.outcome, Outcome::Failure);
    assert_eq!(ambiguous.outcome, Outcome::Failure);
    assert_eq!(ambiguous.id(), "");
}

#[tokio::test]
async fn lookup_by_id_does_not_treat_absence_as_drift() {
    let provider = provider(MemoryBackend::default());

    let report = provider
        .lookup(&BUILDING, &LookupQuery::ById("99".into()))
        .await;

    assert_eq!(report.outcome, Outcome::Failure);
}
