// Sites and organizational units: buildings and departments.

use crate::schema::{Field, FieldKind, ResourceSchema};

pub static BUILDING: ResourceSchema = ResourceSchema {
    kind: "jamfpro_building",
    endpoint: "v1/buildings",
    name_field: "name",
    description: "Physical building used to scope and report on devices.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("name", "name", FieldKind::String),
        Field::optional("street_address1", "streetAddress1", FieldKind::String),
        Field::optional("street_address2", "streetAddress2", FieldKind::String),
        Field::optional("city", "city", FieldKind::String),
        Field::optional("state_province", "stateProvince", FieldKind::String),
        Field::optional("zip_postal_code", "zipPostalCode", FieldKind::String),
        Field::optional("country", "country", FieldKind::String),
    ],
};

pub static DEPARTMENT: ResourceSchema = ResourceSchema {
    kind: "jamfpro_department",
    endpoint: "v1/departments",
    name_field: "name",
    description: "Department that users and devices can be assigned to.",
    fields: &[
        Field::computed("id", "id", FieldKind::String),
        Field::required("name", "name", FieldKind::String),
    ],
};
