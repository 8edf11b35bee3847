//! The model registry.
//!
//! A `Registry` is an explicitly constructed value, owned by whoever wires
//! the engine together, so multiple isolated registries can coexist in one
//! process (notably under test).

use crate::error::{Error, Result};
use crate::model::ModelDescriptor;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps table names to compiled model descriptors.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    models: BTreeMap<String, Arc<ModelDescriptor>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compiled model under its table name.
    ///
    /// Registering the same model again is a no-op; registering a
    /// different model under an occupied table name fails with
    /// [`Error::DuplicateTable`]. Abstract base templates are rejected.
    pub fn register(&mut self, model: &Arc<ModelDescriptor>) -> Result<()> {
        if model.is_abstract() {
            return Err(Error::AbstractInstantiation {
                model: model.table_name().to_string(),
            });
        }

        match self.models.get(model.table_name()) {
            Some(existing) if Arc::ptr_eq(existing, model) || **existing == **model => Ok(()),
            Some(_) => Err(Error::DuplicateTable {
                table: model.table_name().to_string(),
            }),
            None => {
                tracing::debug!(table = model.table_name(), "registered model");
                self.models
                    .insert(model.table_name().to_string(), Arc::clone(model));
                Ok(())
            }
        }
    }

    /// Look up a model by table name.
    pub fn get(&self, table: &str) -> Result<&Arc<ModelDescriptor>> {
        self.models.get(table).ok_or_else(|| Error::UnknownModel {
            table: table.to_string(),
        })
    }

    /// Whether a model is registered for `table`.
    #[must_use]
    pub fn contains(&self, table: &str) -> bool {
        self.models.contains_key(table)
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate over the registered models, ordered by table name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>> {
        self.models.values()
    }
}
