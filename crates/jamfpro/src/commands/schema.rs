//! Offline introspection of the resource registry.

use serde::Serialize;
use tabled::Tabled;

use jamfpro_core::resources;
use jamfpro_core::{Field, ResourceSchema};

use crate::cli::{GlobalOpts, SchemaArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct KindEntry {
    kind: &'static str,
    endpoint: &'static str,
    description: &'static str,
}

#[derive(Tabled)]
struct KindRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Description")]
    description: &'static str,
}

#[derive(Serialize)]
struct FieldEntry {
    attribute: String,
    remote: String,
    #[serde(rename = "type")]
    kind: String,
    presence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Presence")]
    presence: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Remote Key")]
    remote: String,
}

/// `jamfpro kinds`
pub fn kinds(global: &GlobalOpts) -> Result<(), CliError> {
    let entries: Vec<KindEntry> = resources::ALL
        .iter()
        .map(|schema| KindEntry {
            kind: schema.kind,
            endpoint: schema.endpoint,
            description: schema.description,
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |e| KindRow {
            kind: e.kind,
            endpoint: format!("/api/{}", e.endpoint),
            description: e.description,
        },
        |e| e.kind.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// `jamfpro schema <kind>`
pub fn show(args: &SchemaArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let schema = resources::require(&args.kind)?;
    let entries = field_entries(schema);

    let out = output::render_list(
        &global.output,
        &entries,
        |e| FieldRow {
            attribute: e.attribute.clone(),
            kind: e.kind.clone(),
            presence: e.presence.clone(),
            default: e.default.clone().unwrap_or_default(),
            remote: e.remote.clone(),
        },
        |e| e.attribute.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Flatten the field table; nested block attributes use dotted names.
fn field_entries(schema: &ResourceSchema) -> Vec<FieldEntry> {
    let mut entries = Vec::new();
    collect_fields(schema.fields, "", "", &mut entries);
    entries
}

fn collect_fields(fields: &[Field], prefix: &str, remote_prefix: &str, out: &mut Vec<FieldEntry>) {
    for field in fields {
        let attribute = format!("{prefix}{}", field.name);
        let remote = format!("{remote_prefix}{}", field.remote);
        out.push(FieldEntry {
            attribute: attribute.clone(),
            remote: remote.clone(),
            kind: field.kind.type_name(),
            presence: field.presence.to_string(),
            default: field.default.as_ref().map(ToString::to_string),
        });
        if let Some(nested) = field.kind.nested() {
            collect_fields(nested, &format!("{attribute}."), &format!("{remote}."), out);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn nested_block_fields_are_flattened() {
        let schema = resources::require("smart_computer_group").unwrap();
        let entries = field_entries(schema);

        let search_type = entries
            .iter()
            .find(|e| e.attribute == "criteria.search_type")
            .unwrap();
        assert_eq!(search_type.presence, "required");
        assert_eq!(search_type.remote, "criteria.searchType");

        let and_or = entries.iter().find(|e| e.attribute == "criteria.and_or").unwrap();
        assert_eq!(and_or.default.as_deref(), Some("\"and\""));
    }
}
