//! Field metadata.
//!
//! Every declared field is classified into one of a closed set of kinds.
//! Column DDL, filter rendering, and foreign-key resolution all match on
//! [`FieldKind`] exhaustively, so adding a kind forces every branch point to
//! be revisited.

use serde::{Deserialize, Serialize};

/// The kind of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// A bounded string, stored as `varchar(length)`.
    Str {
        /// Maximum length in characters.
        length: u32,
    },
    /// An integer, stored as `int`.
    Int,
    /// A reference to another model, stored as an integer column holding
    /// the target's primary key value.
    ForeignKey {
        /// Table name of the referenced model.
        target: String,
        /// Whether the reference may be absent.
        nullable: bool,
    },
}

impl FieldKind {
    /// Whether this field references another model.
    #[must_use]
    pub fn is_foreign_key(&self) -> bool {
        matches!(self, FieldKind::ForeignKey { .. })
    }

    /// The referenced table name, for foreign-key fields.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldKind::ForeignKey { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// One named, typed attribute of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// The declared field name.
    pub name: String,
    /// The field's kind.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Create a field definition.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}
