//! Instance persistence.
//!
//! Writes are diff-based and commit immediately. An instance with a
//! primary key updates only its dirty columns; an instance without one
//! inserts every field and then recovers the database-assigned key with
//! `SELECT MAX(pk)` — a strategy that assumes no concurrent writer is
//! inserting into the same table, which this single-connection design
//! guarantees by construction. There is no rollback path: a failure
//! between the insert and the key recovery surfaces as an error and
//! leaves the instance without a primary key.

use crate::orm::Orm;
use queryhouse_core::{Error, FkState, Instance, Result, Value};

impl Orm {
    /// Save or update `instance` in the database.
    ///
    /// Foreign-key fields holding an unsaved related instance persist the
    /// related instance first (recursively) so its primary key can be
    /// stored in the reference column.
    pub fn save(&self, instance: &mut Instance) -> Result<()> {
        self.save_pending_relations(instance)?;
        if instance.pk().is_some() {
            self.update(instance)
        } else {
            self.insert(instance)
        }
    }

    /// Delete `instance`'s row and clear its in-memory primary key.
    ///
    /// The detached instance can no longer be mistaken for a persisted
    /// row; saving it again inserts a fresh one. Deleting an instance that
    /// was never saved fails with [`Error::DeleteUnsaved`].
    pub fn delete(&self, instance: &mut Instance) -> Result<()> {
        let Some(pk) = instance.pk() else {
            return Err(Error::DeleteUnsaved {
                table: instance.table_name().to_string(),
            });
        };

        let sql = format!(
            "DELETE FROM {} WHERE {} = {pk}",
            instance.table_name(),
            instance.descriptor().pk_column(),
        );
        self.handle().execute(&sql)?;
        self.handle().commit()?;
        instance.set_pk(None);
        tracing::debug!(table = instance.table_name(), pk, "deleted row");
        Ok(())
    }

    fn save_pending_relations(&self, instance: &mut Instance) -> Result<()> {
        let fields: Vec<String> = instance
            .descriptor()
            .fk_accessors()
            .iter()
            .map(|a| a.field.clone())
            .collect();
        for field in fields {
            if let FkState::Resolved(related) = instance.fk_state_mut(&field)? {
                if related.pk().is_none() {
                    tracing::debug!(
                        table = related.table_name(),
                        field = %field,
                        "saving related instance first"
                    );
                    self.save(related)?;
                }
            }
        }
        Ok(())
    }

    fn update(&self, instance: &mut Instance) -> Result<()> {
        let diff = instance.dirty();
        if diff.is_empty() {
            tracing::debug!(table = instance.table_name(), "nothing dirty, skipping update");
            return Ok(());
        }

        let assignments: Vec<String> = diff
            .iter()
            .map(|(column, value)| format!("{column} = {}", value.sql_literal()))
            .collect();
        let pk = instance.pk().unwrap_or_default();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {pk}",
            instance.table_name(),
            assignments.join(", "),
            instance.descriptor().pk_column(),
        );

        self.handle().execute(&sql)?;
        self.handle().commit()?;
        instance.mark_clean();
        tracing::debug!(
            table = instance.table_name(),
            pk,
            columns = diff.len(),
            "updated row"
        );
        Ok(())
    }

    fn insert(&self, instance: &mut Instance) -> Result<()> {
        let pairs = instance.all_columns();
        let columns: Vec<&str> = pairs.iter().map(|(c, _)| c.as_str()).collect();
        let values: Vec<String> = pairs.iter().map(|(_, v)| v.sql_literal()).collect();

        let table = instance.table_name().to_string();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            values.join(", ")
        );
        self.handle().execute(&sql)?;
        self.handle().commit()?;

        // Recover the key the database just assigned. Safe only because
        // this connection is the table's sole writer.
        let pk_column = instance.descriptor().pk_column();
        let rows = self
            .handle()
            .query(&format!("SELECT MAX({pk_column}) FROM {table}"))?;
        let pk = rows
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_int)
            .ok_or(Error::PkRecovery { table })?;

        instance.set_pk(Some(pk));
        instance.mark_clean();
        tracing::debug!(table = instance.table_name(), pk, "inserted row");
        Ok(())
    }
}
