// ── Resource registry ──
//
// Each supported Jamf Pro object type contributes one static field
// table. Everything else (validation, request bodies, state hydration,
// CRUD sequencing) is shared and driven by these tables.

mod access;
mod computers;
mod inventory;
mod site;

use crate::error::CoreError;
use crate::schema::ResourceSchema;

pub use access::{API_INTEGRATION, API_ROLE};
pub use computers::{COMPUTER_EXTENSION_ATTRIBUTE, SMART_COMPUTER_GROUP};
pub use inventory::{CATEGORY, SCRIPT};
pub use site::{BUILDING, DEPARTMENT};

/// Every supported resource kind, in listing order.
pub static ALL: &[&ResourceSchema] = &[
    &BUILDING,
    &DEPARTMENT,
    &CATEGORY,
    &SCRIPT,
    &COMPUTER_EXTENSION_ATTRIBUTE,
    &SMART_COMPUTER_GROUP,
    &API_ROLE,
    &API_INTEGRATION,
];

/// Find a schema by full (`jamfpro_building`) or short (`building`) name.
pub fn lookup(kind: &str) -> Option<&'static ResourceSchema> {
    ALL.iter()
        .copied()
        .find(|schema| schema.kind == kind || schema.short_name() == kind)
}

/// Like [`lookup`], but unknown kinds are an error.
pub fn require(kind: &str) -> Result<&'static ResourceSchema, CoreError> {
    lookup(kind).ok_or_else(|| CoreError::UnknownResourceKind {
        kind: kind.to_owned(),
    })
}
