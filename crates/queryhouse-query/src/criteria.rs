//! Filter criteria.
//!
//! A `Criteria` is an ordered list of equality terms rendered into a
//! `WHERE column = value AND column = value` clause. Values are rendered as
//! inline literals (strings quoted, everything else bare); the absence of
//! bound parameters is a documented non-goal of this design.

use queryhouse_core::{Error, ModelDescriptor, Result, Value};
use serde::{Deserialize, Serialize};

/// Ordered equality terms for a query.
///
/// # Example
///
/// ```
/// use queryhouse_core::ModelDecl;
/// use queryhouse_query::Criteria;
///
/// let user = ModelDecl::new("User")
///     .string_field("name", 64)
///     .int_field("age")
///     .compile()
///     .unwrap();
///
/// let clause = Criteria::new()
///     .eq("name", "Bob")
///     .eq("age", 42_i64)
///     .render(&user)
///     .unwrap();
/// assert_eq!(clause, "name = 'Bob' AND age = 42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    terms: Vec<(String, Value)>,
}

impl Criteria {
    /// Start an empty criteria list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single primary-key term.
    #[must_use]
    pub fn pk(key: i64) -> Self {
        Self::new().eq("pk", key)
    }

    /// Add an equality term on a field.
    ///
    /// `pk` (or the model's identity column name) addresses the primary
    /// key; anything else must be a declared field.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    /// Whether no terms were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Render the `WHERE` body for a model, validating every term's field
    /// name against the model's declared fields.
    pub fn render(&self, model: &ModelDescriptor) -> Result<String> {
        let mut parts = Vec::with_capacity(self.terms.len());
        for (field, value) in &self.terms {
            let column = model.column_for_criteria(field).ok_or_else(|| {
                Error::InvalidField {
                    model: model.table_name().to_string(),
                    field: field.clone(),
                }
            })?;
            parts.push(format!("{column} = {}", value.sql_literal()));
        }
        Ok(parts.join(" AND "))
    }
}
