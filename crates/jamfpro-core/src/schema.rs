// ── Resource field tables ──
//
// Every resource kind is described by a static table of fields. The
// mapping engine walks these tables to validate desired configuration,
// build request payloads, and read backend objects back into state.

use std::fmt;

use serde::Serialize;

/// The type of a configuration attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Bool,
    /// Homogeneous list of scalars.
    List(&'static FieldKind),
    /// Single nested block.
    Block(&'static [Field]),
    /// Repeated nested block.
    BlockList(&'static [Field]),
}

impl FieldKind {
    /// Short type name for diagnostics and schema listings.
    pub fn type_name(&self) -> String {
        match self {
            Self::String => "string".into(),
            Self::Int => "int".into(),
            Self::Bool => "bool".into(),
            Self::List(inner) => format!("list({})", inner.type_name()),
            Self::Block(_) => "block".into(),
            Self::BlockList(_) => "list(block)".into(),
        }
    }

    /// Nested fields for block kinds.
    pub fn nested(&self) -> Option<&'static [Field]> {
        match self {
            Self::Block(fields) | Self::BlockList(fields) => Some(fields),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Presence {
    /// Must be set in configuration.
    Required,
    /// May be set; falls back to the default or is omitted.
    Optional,
    /// Set by the server only; read back into state.
    Computed,
}

/// Default applied when an optional attribute is not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One attribute of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Configuration name (snake_case).
    pub name: &'static str,
    /// Key in the backend JSON object.
    pub remote: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub default: Option<DefaultValue>,
}

impl Field {
    pub const fn required(name: &'static str, remote: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            remote,
            kind,
            presence: Presence::Required,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, remote: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            remote,
            kind,
            presence: Presence::Optional,
            default: None,
        }
    }

    pub const fn computed(name: &'static str, remote: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            remote,
            kind,
            presence: Presence::Computed,
            default: None,
        }
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Static description of one resource kind.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Full resource type name, e.g. `jamfpro_building`.
    pub kind: &'static str,
    /// Collection endpoint relative to `/api/`, e.g. `v1/buildings`.
    pub endpoint: &'static str,
    /// Remote key used by name lookups.
    pub name_field: &'static str,
    pub description: &'static str,
    pub fields: &'static [Field],
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Kind without the `jamfpro_` prefix.
    pub fn short_name(&self) -> &'static str {
        self.kind.strip_prefix("jamfpro_").unwrap_or(self.kind)
    }
}
