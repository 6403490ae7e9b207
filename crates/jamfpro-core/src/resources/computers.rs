// Computer inventory: extension attributes and smart groups.

use crate::schema::{DefaultValue, Field, FieldKind, ResourceSchema};

pub static COMPUTER_EXTENSION_ATTRIBUTE: ResourceSchema = ResourceSchema {
    kind: "jamfpro_computer_extension_attribute",
    endpoint: "v1/computer-extension-attributes",
    name_field: "name",
    description: "Custom inventory field collected from managed computers.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("name", "name", FieldKind::String),
        Field::optional("description", "description", FieldKind::String),
        // STRING, INTEGER or DATE
        Field::optional("data_type", "dataType", FieldKind::String).with_default(DefaultValue::Str("STRING")),
        Field::optional("enabled", "enabled", FieldKind::Bool).with_default(DefaultValue::Bool(true)),
        Field::optional("inventory_display_type", "inventoryDisplayType", FieldKind::String)
            .with_default(DefaultValue::Str("EXTENSION_ATTRIBUTES")),
        // SCRIPT, TEXT, POPUP or DIRECTORY_SERVICE_ATTRIBUTE_MAPPING
        Field::required("input_type", "inputType", FieldKind::String),
        Field::optional("script_contents", "scriptContents", FieldKind::String),
        Field::optional("popup_menu_choices", "popupMenuChoices", FieldKind::List(&FieldKind::String)),
        Field::optional("ldap_attribute_mapping", "ldapAttributeMapping", FieldKind::String),
    ],
};

const CRITERION: &[Field] = &[
    Field::required("name", "name", FieldKind::String),
    Field::optional("priority", "priority", FieldKind::Int).with_default(DefaultValue::Int(0)),
    Field::optional("and_or", "andOr", FieldKind::String).with_default(DefaultValue::Str("and")),
    Field::required("search_type", "searchType", FieldKind::String),
    Field::optional("value", "value", FieldKind::String).with_default(DefaultValue::Str("")),
    Field::optional("opening_paren", "openingParen", FieldKind::Bool).with_default(DefaultValue::Bool(false)),
    Field::optional("closing_paren", "closingParen", FieldKind::Bool).with_default(DefaultValue::Bool(false)),
];

pub static SMART_COMPUTER_GROUP: ResourceSchema = ResourceSchema {
    kind: "jamfpro_smart_computer_group",
    endpoint: "v2/computer-groups/smart-groups",
    name_field: "name",
    description: "Computer group whose membership is computed from inventory criteria.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("name", "name", FieldKind::String),
        Field::optional("description", "description", FieldKind::String),
        Field::optional("site_id", "siteId", FieldKind::String).with_default(DefaultValue::Str("-1")),
        Field::optional("criteria", "criteria", FieldKind::BlockList(CRITERION)),
    ],
};
