// Categories and the scripts filed under them.

use crate::schema::{DefaultValue, Field, FieldKind, ResourceSchema};

pub static CATEGORY: ResourceSchema = ResourceSchema {
    kind: "jamfpro_category",
    endpoint: "v1/categories",
    name_field: "name",
    description: "Category for organizing policies, scripts, and packages.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("name", "name", FieldKind::String),
        Field::optional("priority", "priority", FieldKind::Int).with_default(DefaultValue::Int(9)),
    ],
};

pub static SCRIPT: ResourceSchema = ResourceSchema {
    kind: "jamfpro_script",
    endpoint: "v1/scripts",
    name_field: "name",
    description: "Script that policies can run on managed computers.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("name", "name", FieldKind::String),
        Field::optional("category_id", "categoryId", FieldKind::String).with_default(DefaultValue::Str("-1")),
        Field::computed("category_name", "categoryName", FieldKind::String),
        Field::optional("info", "info", FieldKind::String),
        Field::optional("notes", "notes", FieldKind::String),
        // BEFORE, AFTER or AT_REBOOT
        Field::optional("priority", "priority", FieldKind::String).with_default(DefaultValue::Str("AFTER")),
        Field::optional("os_requirements", "osRequirements", FieldKind::String),
        Field::required("script_contents", "scriptContents", FieldKind::String),
        Field::optional("parameter4", "parameter4", FieldKind::String),
        Field::optional("parameter5", "parameter5", FieldKind::String),
        Field::optional("parameter6", "parameter6", FieldKind::String),
        Field::optional("parameter7", "parameter7", FieldKind::String),
        Field::optional("parameter8", "parameter8", FieldKind::String),
        Field::optional("parameter9", "parameter9", FieldKind::String),
        Field::optional("parameter10", "parameter10", FieldKind::String),
        Field::optional("parameter11", "parameter11", FieldKind::String),
    ],
};
