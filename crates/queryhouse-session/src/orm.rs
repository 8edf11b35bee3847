//! The assembled mapping context.
//!
//! An `Orm` owns everything an operation needs: the shared connection
//! handle, the active database name, the model registry, and the
//! relationship catalog. It is an explicitly constructed value — build as
//! many isolated contexts in one process as you like — rather than
//! module-level global state.

use queryhouse_core::{DbHandle, Instance, Registry, Result, Value};
use queryhouse_query::QuerySet;
use queryhouse_schema::{MigrationReport, RelationshipCatalog, create_tables};
use serde::Serialize;
use std::sync::Arc;

/// The engine context: connection, database, registry, catalog.
#[derive(Debug)]
pub struct Orm {
    handle: DbHandle,
    database: String,
    registry: Registry,
    catalog: RelationshipCatalog,
}

impl Orm {
    /// Migrate the registered models into `database` and assemble the
    /// context.
    ///
    /// This is the whole startup sequence: ensure the database exists,
    /// create missing tables in dependency order, then build the
    /// relationship catalog from the now-consistent constraint metadata.
    /// Migration failure (including unresolvable dependencies) aborts
    /// startup.
    pub fn initialize(
        handle: DbHandle,
        database: impl Into<String>,
        registry: Registry,
    ) -> Result<(Self, MigrationReport)> {
        let database = database.into();
        let report = create_tables(&handle, &database, &registry)?;
        let catalog = RelationshipCatalog::refresh(&handle, &database)?;
        tracing::info!(
            database = %database,
            models = registry.len(),
            relationships = catalog.len(),
            "orm initialized"
        );
        Ok((
            Self {
                handle,
                database,
                registry,
                catalog,
            },
            report,
        ))
    }

    /// Assemble a context without migrating, for hosts whose schema is
    /// already in place. The catalog is still refreshed.
    pub fn connect(
        handle: DbHandle,
        database: impl Into<String>,
        registry: Registry,
    ) -> Result<Self> {
        let database = database.into();
        let catalog = RelationshipCatalog::refresh(&handle, &database)?;
        Ok(Self {
            handle,
            database,
            registry,
            catalog,
        })
    }

    /// A fresh query set over a registered model's table.
    pub fn objects(&self, table: &str) -> Result<QuerySet> {
        let model = self.registry.get(table)?;
        Ok(QuerySet::new(
            self.handle.clone(),
            self.database.clone(),
            Arc::clone(model),
        ))
    }

    /// Construct a new, unsaved instance of a registered model.
    pub fn new_instance(&self, table: &str, pairs: &[(&str, Value)]) -> Result<Instance> {
        Instance::new(self.registry.get(table)?, pairs)
    }

    /// Construct an instance from field values, save it, and return it
    /// with its assigned primary key.
    pub fn create(&self, table: &str, pairs: &[(&str, Value)]) -> Result<Instance> {
        let mut instance = self.new_instance(table, pairs)?;
        self.save(&mut instance)?;
        Ok(instance)
    }

    /// Re-read the relationship catalog, for hosts that add constraints
    /// after initialization.
    pub fn refresh_catalog(&mut self) -> Result<()> {
        self.catalog = RelationshipCatalog::refresh(&self.handle, &self.database)?;
        Ok(())
    }

    /// The shared connection handle.
    #[must_use]
    pub fn handle(&self) -> &DbHandle {
        &self.handle
    }

    /// The active database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The model registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The relationship catalog.
    #[must_use]
    pub fn catalog(&self) -> &RelationshipCatalog {
        &self.catalog
    }

    /// A serializable snapshot of the context's wiring, for diagnostics.
    #[must_use]
    pub fn debug_info(&self) -> OrmDebugInfo {
        OrmDebugInfo {
            database: self.database.clone(),
            models: self
                .registry
                .iter()
                .map(|m| m.table_name().to_string())
                .collect(),
            relationships: self.catalog.len(),
        }
    }
}

/// What [`Orm::debug_info`] reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrmDebugInfo {
    /// The active database.
    pub database: String,
    /// Registered models, ordered by table name.
    pub models: Vec<String>,
    /// Number of cataloged foreign-key relationships.
    pub relationships: usize,
}
