// ── Field mapping ──
//
// Three passes over a resource's field table:
//   validate  : desired configuration (JSON) → typed `Attributes`
//   construct : `Attributes` → backend request body
//   hydrate   : backend object → `Attributes` for tracked state
//
// validate and hydrate never stop at the first problem; each one becomes
// a diagnostic carrying the attribute path.

use serde_json::{Map, Value};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::{DefaultValue, Field, FieldKind, Presence, ResourceSchema};
use crate::value::{AttrValue, Attributes};

// ── Validation ──────────────────────────────────────────────────────

/// Check desired configuration against the field table.
///
/// Every unknown, mistyped, missing, or server-computed attribute is
/// reported. Defaults are filled in for unset optional attributes.
pub fn validate(schema: &ResourceSchema, raw: &Value) -> Result<Attributes, Diagnostics> {
    let mut diags = Diagnostics::new();
    let Some(object) = raw.as_object() else {
        diags.push(Diagnostic::error(
            "Invalid configuration",
            format!(
                "{} configuration must be an object, got {}",
                schema.kind,
                json_type(raw)
            ),
        ));
        return Err(diags);
    };

    let attrs = validate_block(schema.fields, object, "", &mut diags);
    if diags.has_error() { Err(diags) } else { Ok(attrs) }
}

fn validate_block(
    fields: &[Field],
    object: &Map<String, Value>,
    prefix: &str,
    diags: &mut Diagnostics,
) -> Attributes {
    for key in object.keys() {
        if !fields.iter().any(|f| f.name == key) {
            diags.push(
                Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named \"{key}\" is not expected here."),
                )
                .with_attribute(join_path(prefix, key)),
            );
        }
    }

    let mut attrs = Attributes::new();
    for field in fields {
        let path = join_path(prefix, field.name);
        let value = object.get(field.name).filter(|v| !v.is_null());

        match (value, field.presence) {
            (Some(_), Presence::Computed) => diags.push(
                Diagnostic::error(
                    "Value for unconfigurable attribute",
                    format!("\"{}\" is set by the server and cannot be configured.", field.name),
                )
                .with_attribute(path),
            ),
            (Some(value), _) => {
                if let Some(converted) = convert(&field.kind, value, &path, diags) {
                    attrs.insert(field.name.to_owned(), converted);
                }
            }
            (None, Presence::Required) => diags.push(
                Diagnostic::error(
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", field.name),
                )
                .with_attribute(path),
            ),
            (None, Presence::Optional) => {
                if let Some(default) = field.default {
                    attrs.insert(field.name.to_owned(), default_value(default));
                }
            }
            (None, Presence::Computed) => {}
        }
    }
    attrs
}

fn convert(kind: &FieldKind, value: &Value, path: &str, diags: &mut Diagnostics) -> Option<AttrValue> {
    let converted = match (kind, value) {
        (FieldKind::String, Value::String(s)) => Some(AttrValue::String(s.clone())),
        (FieldKind::Int, Value::Number(n)) => n.as_i64().map(AttrValue::Int),
        (FieldKind::Bool, Value::Bool(b)) => Some(AttrValue::Bool(*b)),
        (FieldKind::List(inner), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                if let Some(v) = convert(inner, item, &format!("{path}[{i}]"), diags) {
                    out.push(v);
                }
            }
            return Some(AttrValue::List(out));
        }
        (FieldKind::Block(fields), Value::Object(object)) => {
            return Some(AttrValue::Block(validate_block(fields, object, path, diags)));
        }
        (FieldKind::BlockList(fields), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                if let Value::Object(object) = item {
                    out.push(AttrValue::Block(validate_block(fields, object, &item_path, diags)));
                } else {
                    diags.push(type_mismatch(&FieldKind::Block(fields), item, item_path));
                }
            }
            return Some(AttrValue::List(out));
        }
        _ => None,
    };

    if converted.is_none() {
        diags.push(type_mismatch(kind, value, path.to_owned()));
    }
    converted
}

fn type_mismatch(kind: &FieldKind, value: &Value, path: String) -> Diagnostic {
    Diagnostic::error(
        "Incorrect attribute value type",
        format!("Expected {kind}, got {}.", json_type(value)),
    )
    .with_attribute(path)
}

fn default_value(default: DefaultValue) -> AttrValue {
    match default {
        DefaultValue::Str(s) => AttrValue::String(s.to_owned()),
        DefaultValue::Int(n) => AttrValue::Int(n),
        DefaultValue::Bool(b) => AttrValue::Bool(b),
    }
}

// ── Construction ────────────────────────────────────────────────────

/// Build the backend request body from validated attributes.
///
/// Attributes with no field entry, and computed fields, are left out.
pub fn construct(schema: &ResourceSchema, attrs: &Attributes) -> Value {
    Value::Object(construct_block(schema.fields, attrs))
}

fn construct_block(fields: &[Field], attrs: &Attributes) -> Map<String, Value> {
    let mut body = Map::new();
    for field in fields {
        if field.presence == Presence::Computed {
            continue;
        }
        if let Some(value) = attrs.get(field.name) {
            body.insert(field.remote.to_owned(), to_remote(&field.kind, value));
        }
    }
    body
}

fn to_remote(kind: &FieldKind, value: &AttrValue) -> Value {
    match (kind, value) {
        (FieldKind::Block(fields), AttrValue::Block(attrs)) => Value::Object(construct_block(fields, attrs)),
        (FieldKind::BlockList(fields), AttrValue::List(items)) => Value::Array(
            items
                .iter()
                .filter_map(|item| match item {
                    AttrValue::Block(attrs) => Some(Value::Object(construct_block(fields, attrs))),
                    _ => None,
                })
                .collect(),
        ),
        (FieldKind::List(inner), AttrValue::List(items)) => {
            Value::Array(items.iter().map(|item| to_remote(inner, item)).collect())
        }
        (_, AttrValue::String(s)) => Value::String(s.clone()),
        (_, AttrValue::Int(n)) => Value::from(*n),
        (_, AttrValue::Bool(b)) => Value::Bool(*b),
        (_, AttrValue::List(items)) => Value::Array(items.iter().map(|i| to_remote(&FieldKind::String, i)).collect()),
        (_, AttrValue::Block(attrs)) => Value::Object(
            attrs
                .iter()
                .map(|(k, v)| (k.clone(), to_remote(&FieldKind::String, v)))
                .collect(),
        ),
    }
}

// ── Hydration ───────────────────────────────────────────────────────

/// Map a backend object into tracked-state attributes.
///
/// Type mismatches are recorded as errors and skipped so the rest of the
/// object is still read. A required attribute missing from the response
/// is a warning.
pub fn hydrate(schema: &ResourceSchema, remote: &Value, diags: &mut Diagnostics) -> Attributes {
    let Some(object) = remote.as_object() else {
        diags.push(Diagnostic::error(
            "Unexpected response",
            format!(
                "Expected a {} object from the server, got {}.",
                schema.kind,
                json_type(remote)
            ),
        ));
        return Attributes::new();
    };
    hydrate_block(schema.fields, object, "", diags)
}

fn hydrate_block(
    fields: &[Field],
    object: &Map<String, Value>,
    prefix: &str,
    diags: &mut Diagnostics,
) -> Attributes {
    let mut attrs = Attributes::new();
    for field in fields {
        let path = join_path(prefix, field.name);
        match object.get(field.remote).filter(|v| !v.is_null()) {
            Some(value) => {
                if let Some(v) = read_remote(&field.kind, value, &path, diags) {
                    attrs.insert(field.name.to_owned(), v);
                }
            }
            None if field.presence == Presence::Required => diags.push(
                Diagnostic::warning(
                    "Attribute missing from response",
                    format!("The server did not return \"{}\".", field.remote),
                )
                .with_attribute(path),
            ),
            None => {}
        }
    }
    attrs
}

fn read_remote(kind: &FieldKind, value: &Value, path: &str, diags: &mut Diagnostics) -> Option<AttrValue> {
    let read = match (kind, value) {
        (FieldKind::String, Value::String(s)) => Some(AttrValue::String(s.clone())),
        // Jamf Pro serializes numeric identifiers either way.
        (FieldKind::String, Value::Number(n)) => Some(AttrValue::String(n.to_string())),
        (FieldKind::Int, Value::Number(n)) => n.as_i64().map(AttrValue::Int),
        (FieldKind::Int, Value::String(s)) => s.parse().ok().map(AttrValue::Int),
        (FieldKind::Bool, Value::Bool(b)) => Some(AttrValue::Bool(*b)),
        (FieldKind::List(inner), Value::Array(items)) => Some(AttrValue::List(
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| read_remote(inner, item, &format!("{path}[{i}]"), diags))
                .collect(),
        )),
        (FieldKind::Block(fields), Value::Object(object)) => {
            Some(AttrValue::Block(hydrate_block(fields, object, path, diags)))
        }
        (FieldKind::BlockList(fields), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                if let Value::Object(object) = item {
                    out.push(AttrValue::Block(hydrate_block(fields, object, &item_path, diags)));
                } else {
                    diags.push(response_mismatch(&FieldKind::Block(fields), item, item_path));
                }
            }
            Some(AttrValue::List(out))
        }
        _ => None,
    };

    if read.is_none() {
        diags.push(response_mismatch(kind, value, path.to_owned()));
    }
    read
}

fn response_mismatch(kind: &FieldKind, value: &Value, path: String) -> Diagnostic {
    Diagnostic::error(
        "Unexpected attribute type in response",
        format!("Expected {kind}, the server returned {}.", json_type(value)),
    )
    .with_attribute(path)
}

// ── Helpers ─────────────────────────────────────────────────────────

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::diagnostics::Severity;

    const CRITERION: &[Field] = &[
        Field::required("name", "name", FieldKind::String),
        Field::optional("and_or", "andOr", FieldKind::String).with_default(DefaultValue::Str("and")),
        Field::required("search_type", "searchType", FieldKind::String),
        Field::optional("value", "value", FieldKind::String),
    ];

    static GROUP: ResourceSchema = ResourceSchema {
        kind: "jamfpro_test_group",
        endpoint: "v1/test-groups",
        name_field: "name",
        description: "test",
        fields: &[
            Field::computed("id", "id", FieldKind::String),
            Field::required("name", "name", FieldKind::String),
            Field::optional("priority", "priority", FieldKind::Int).with_default(DefaultValue::Int(9)),
            Field::optional("enabled", "enabled", FieldKind::Bool),
            Field::optional("tags", "tagNames", FieldKind::List(&FieldKind::String)),
            Field::optional("criteria", "criteria", FieldKind::BlockList(CRITERION)),
        ],
    };

    fn attribute_paths(diags: &Diagnostics) -> Vec<&str> {
        diags.iter().filter_map(|d| d.attribute.as_deref()).collect()
    }

    #[test]
    fn validate_applies_defaults_in_nested_blocks() {
        let attrs = validate(
            &GROUP,
            &json!({ "name": "Finance", "criteria": [{ "name": "OS", "search_type": "is" }] }),
        )
        .unwrap_or_else(|d| panic!("unexpected diagnostics: {d:?}"));

        assert_eq!(attrs.get("priority"), Some(&AttrValue::Int(9)));
        let Some(AttrValue::List(criteria)) = attrs.get("criteria") else {
            panic!("criteria missing");
        };
        let Some(AttrValue::Block(first)) = criteria.first() else {
            panic!("criterion missing");
        };
        assert_eq!(first.get("and_or"), Some(&AttrValue::from("and")));
    }

    #[test]
    fn validate_reports_every_problem_with_paths() {
        let diags = validate(
            &GROUP,
            &json!({
                "id": "5",
                "priority": "high",
                "colour": "red",
                "tags": ["a", 1],
                "criteria": [
                    { "name": "OS", "search_type": "is" },
                    { "name": "Model", "search_type": 3 },
                ],
            }),
        )
        .err()
        .unwrap_or_else(|| panic!("expected diagnostics"));

        assert!(diags.iter().all(|d| d.severity == Severity::Error));
        let mut paths = attribute_paths(&diags);
        paths.sort_unstable();
        assert_eq!(
            paths,
            vec!["colour", "criteria[1].search_type", "id", "name", "priority", "tags[1]"]
        );
    }

    #[test]
    fn validate_rejects_non_objects() {
        let diags = validate(&GROUP, &json!(["Finance"])).err().unwrap_or_default();
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn null_counts_as_unset() {
        let attrs = validate(&GROUP, &json!({ "name": "Finance", "enabled": null }))
            .unwrap_or_else(|d| panic!("unexpected diagnostics: {d:?}"));
        assert!(!attrs.contains_key("enabled"));
    }

    #[test]
    fn construct_uses_remote_keys() {
        let attrs = validate(
            &GROUP,
            &json!({
                "name": "Finance",
                "tags": ["x"],
                "criteria": [{ "name": "OS", "search_type": "is", "value": "15" }],
            }),
        )
        .unwrap_or_else(|d| panic!("unexpected diagnostics: {d:?}"));

        assert_eq!(
            construct(&GROUP, &attrs),
            json!({
                "name": "Finance",
                "priority": 9,
                "tagNames": ["x"],
                "criteria": [{ "name": "OS", "andOr": "and", "searchType": "is", "value": "15" }],
            })
        );
    }

    #[test]
    fn hydrate_coerces_ids_and_aggregates_mismatches() {
        let mut diags = Diagnostics::new();
        let attrs = hydrate(
            &GROUP,
            &json!({
                "id": 42,
                "name": "Finance",
                "priority": "7",
                "enabled": "yes",
                "criteria": [{ "name": "OS", "andOr": "and", "searchType": false }],
                "unknownKey": true,
            }),
            &mut diags,
        );

        assert_eq!(attrs.get("id"), Some(&AttrValue::from("42")));
        assert_eq!(attrs.get("priority"), Some(&AttrValue::Int(7)));
        assert!(!attrs.contains_key("enabled"));
        assert_eq!(diags.error_count(), 2);
        assert_eq!(attribute_paths(&diags), vec!["enabled", "criteria[0].search_type"]);
    }

    #[test]
    fn hydrate_warns_on_missing_required() {
        let mut diags = Diagnostics::new();
        let attrs = hydrate(&GROUP, &json!({ "id": "1" }), &mut diags);

        assert_eq!(attrs.len(), 1);
        assert!(!diags.has_error());
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(attribute_paths(&diags), vec!["name"]);
    }

    #[test]
    fn hydrate_rejects_non_objects() {
        let mut diags = Diagnostics::new();
        let attrs = hydrate(&GROUP, &json!("nope"), &mut diags);
        assert!(attrs.is_empty());
        assert!(diags.has_error());
    }
}
