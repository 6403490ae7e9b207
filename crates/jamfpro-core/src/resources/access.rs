// API access control: roles and the API clients bound to them.

use crate::schema::{DefaultValue, Field, FieldKind, ResourceSchema};

pub static API_ROLE: ResourceSchema = ResourceSchema {
    kind: "jamfpro_api_role",
    endpoint: "v1/api-roles",
    name_field: "displayName",
    description: "Named set of privileges that API clients can be granted.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("display_name", "displayName", FieldKind::String),
        Field::required("privileges", "privileges", FieldKind::List(&FieldKind::String)),
    ],
};

pub static API_INTEGRATION: ResourceSchema = ResourceSchema {
    kind: "jamfpro_api_integration",
    endpoint: "v1/api-integrations",
    name_field: "displayName",
    description: "API client that authenticates with client credentials.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("display_name", "displayName", FieldKind::String),
        Field::optional("enabled", "enabled", FieldKind::Bool).with_default(DefaultValue::Bool(true)),
        Field::optional("access_token_lifetime_seconds", "accessTokenLifetimeSeconds", FieldKind::Int)
            .with_default(DefaultValue::Int(1800)),
        Field::required("authorization_scopes", "authorizationScopes", FieldKind::List(&FieldKind::String)),
        Field::computed("client_id", "clientId", FieldKind::String),
        Field::computed("app_type", "appType", FieldKind::String),
    ],
};
