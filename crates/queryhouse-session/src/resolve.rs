//! Lazy foreign-key resolution.
//!
//! Dereferencing a relation is an explicit call, not an attribute access.
//! A raw stored key is looked up through the relationship catalog — the
//! single source of truth for what the column actually references — and
//! the fetched instance is memoized in the field's cache cell, so each
//! field costs at most one query per instance per process lifetime.

use crate::orm::Orm;
use queryhouse_core::{Error, FkState, Instance, Result};
use queryhouse_query::{Criteria, QuerySet};
use std::sync::Arc;

impl Orm {
    /// Dereference `instance.field`, querying on first access.
    ///
    /// Returns `Ok(None)` for an unset (null) reference. A raw key is
    /// resolved via the catalog entry for the field's reference column —
    /// missing catalog entries fail with [`Error::UnknownRelation`] — and
    /// cached; subsequent reads serve the cached instance without touching
    /// the database.
    pub fn related<'a>(
        &self,
        instance: &'a mut Instance,
        field: &str,
    ) -> Result<Option<&'a Instance>> {
        let Some(accessor) = instance.descriptor().fk_accessor(field).cloned() else {
            return Err(if instance.descriptor().field(field).is_some() {
                Error::InvalidAssignment {
                    model: instance.table_name().to_string(),
                    field: field.to_string(),
                    detail: "not a foreign-key field".to_string(),
                }
            } else {
                Error::InvalidField {
                    model: instance.table_name().to_string(),
                    field: field.to_string(),
                }
            });
        };

        let pending_key = match instance.fk_state(field)? {
            FkState::Unset => return Ok(None),
            FkState::Resolved(_) => None,
            FkState::Raw(key) => Some(*key),
        };

        if let Some(key) = pending_key {
            let relation = self.catalog().lookup(instance.table_name(), &accessor.column)?;
            let target_model = self.registry().get(&relation.table)?;

            tracing::debug!(
                table = instance.table_name(),
                field,
                referenced = %relation.table,
                key,
                "resolving foreign key"
            );

            let mut query = QuerySet::new(
                self.handle().clone(),
                self.database().to_string(),
                Arc::clone(target_model),
            );
            let fetched = query.get(Criteria::new().eq(relation.column.as_str(), key))?;
            *instance.fk_state_mut(field)? = FkState::Resolved(Box::new(fetched));
        }

        Ok(instance.fk_state(field)?.as_resolved())
    }
}
