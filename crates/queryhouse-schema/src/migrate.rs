//! The schema migration engine.
//!
//! `create_tables` creates every registered model's table in an order that
//! satisfies foreign-key dependencies. Rather than building an explicit
//! dependency graph, it attempts the whole pending set repeatedly: a
//! `CREATE TABLE` that fails because its referenced table does not exist
//! yet is simply retried in a later pass. The loop terminates when the
//! pending set empties, or when a pass creates nothing — the fixed point
//! that signals a dependency cycle or a genuinely invalid schema.

use crate::ddl;
use crate::introspect;
use queryhouse_core::{DbHandle, Error, ModelDescriptor, Registry, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// What a migration run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Tables created by this run, in creation order.
    pub created: Vec<String>,
    /// Tables that already existed and were left untouched.
    pub existing: Vec<String>,
}

/// Ensure the database exists, select it, and create every missing table.
///
/// Tables that already exist are reported, never altered. A database error
/// other than the missing-referenced-table case is fatal and propagates
/// immediately; reaching a pass that makes no progress fails with
/// [`Error::UnresolvableDependency`] naming the still-pending tables.
pub fn create_tables(
    handle: &DbHandle,
    database: &str,
    registry: &Registry,
) -> Result<MigrationReport> {
    handle.execute(&ddl::create_database_sql(database))?;
    handle.execute(&ddl::use_database_sql(database))?;

    let existing_tables: HashSet<String> =
        introspect::list_base_tables(handle)?.into_iter().collect();

    let mut report = MigrationReport::default();
    let mut pending: Vec<Arc<ModelDescriptor>> = Vec::new();
    for model in registry.iter() {
        if existing_tables.contains(model.table_name()) {
            tracing::info!(database, table = model.table_name(), "table already exists");
            report.existing.push(model.table_name().to_string());
        } else {
            pending.push(Arc::clone(model));
        }
    }

    let mut pass = 0_u32;
    while !pending.is_empty() {
        pass += 1;
        let before = pending.len();
        let mut still_pending = Vec::new();

        for model in pending {
            match handle.execute(&ddl::create_table_sql(&model)) {
                Ok(_) => {
                    tracing::info!(database, table = model.table_name(), pass, "created table");
                    report.created.push(model.table_name().to_string());
                }
                Err(err) if err.is_missing_reference() => {
                    // The referenced table is itself pending; retry next pass.
                    tracing::debug!(
                        table = model.table_name(),
                        pass,
                        "deferred: referenced table not created yet"
                    );
                    still_pending.push(model);
                }
                Err(err) => return Err(err),
            }
        }

        pending = still_pending;
        if pending.len() == before {
            return Err(Error::UnresolvableDependency {
                tables: pending
                    .iter()
                    .map(|m| m.table_name().to_string())
                    .collect(),
            });
        }
    }

    tracing::info!(
        database,
        created = report.created.len(),
        existing = report.existing.len(),
        passes = pass,
        "migration complete"
    );
    Ok(report)
}
