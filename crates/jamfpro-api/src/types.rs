// Wire types shared by the Jamf Pro API endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// One page of a paged collection (`?page=N&page-size=M`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: i64,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Response to a `POST` on a collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRef {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub errors: Vec<ApiErrorCause>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorCause {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ApiErrorBody {
    /// Flatten the cause list into one human-readable line.
    pub(crate) fn message(&self) -> Option<String> {
        let parts: Vec<String> = self
            .errors
            .iter()
            .filter_map(|cause| {
                let description = cause.description.as_deref().or(cause.code.as_deref())?;
                Some(match cause.field.as_deref() {
                    Some(field) => format!("{field}: {description}"),
                    None => description.to_owned(),
                })
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }

    pub(crate) fn code(&self) -> Option<String> {
        self.errors.iter().find_map(|cause| cause.code.clone())
    }
}

/// Jamf Pro returns ids as strings, but some endpoints emit bare numbers.
pub fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn created_ref_accepts_numeric_ids() {
        let created: CreatedRef = serde_json::from_value(json!({ "id": 42 })).unwrap();
        assert_eq!(created.id, "42");
        assert_eq!(created.href, None);

        let created: CreatedRef =
            serde_json::from_value(json!({ "id": "7", "href": "/api/v1/buildings/7" })).unwrap();
        assert_eq!(created.id, "7");
    }

    #[test]
    fn error_body_message_joins_causes() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "httpStatus": 400,
            "errors": [
                { "code": "INVALID_FIELD", "description": "must not be blank", "field": "name" },
                { "code": "DUPLICATE_FIELD" }
            ]
        }))
        .unwrap();
        assert_eq!(body.http_status, Some(400));
        assert_eq!(
            body.message().as_deref(),
            Some("name: must not be blank; DUPLICATE_FIELD")
        );
        assert_eq!(body.code().as_deref(), Some("INVALID_FIELD"));
    }
}
