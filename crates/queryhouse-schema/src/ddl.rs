//! MySQL DDL generation.

use queryhouse_core::{FieldKind, ModelDescriptor};

/// Render the `CREATE TABLE` statement for a model.
///
/// Column order is fixed: the auto-incrementing identity column first, then
/// one column per declared field, then the `PRIMARY KEY` clause, then one
/// `FOREIGN KEY … REFERENCES` clause per foreign-key field pointing at the
/// target's identity column.
#[must_use]
pub fn create_table_sql(model: &ModelDescriptor) -> String {
    let pk = model.pk_column();

    let mut parts = vec![format!("{pk} int NOT NULL AUTO_INCREMENT")];

    for field in model.fields() {
        parts.push(match &field.kind {
            FieldKind::Str { length } => format!("{} varchar({length})", field.name),
            FieldKind::Int => format!("{} int", field.name),
            // The reference column is named after the target's identity
            // column and stores its value.
            FieldKind::ForeignKey { target, .. } => format!("{target}ID int"),
        });
    }

    parts.push(format!("PRIMARY KEY ({pk})"));

    for accessor in model.fk_accessors() {
        parts.push(format!(
            "FOREIGN KEY ({column}) REFERENCES {target}({column})",
            column = accessor.column,
            target = accessor.target,
        ));
    }

    let sql = format!("CREATE TABLE {} ({})", model.table_name(), parts.join(", "));
    tracing::trace!(table = model.table_name(), sql = %sql, "generated DDL");
    sql
}

/// Render the statement that ensures the target database exists.
#[must_use]
pub fn create_database_sql(database: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {database}")
}

/// Render the statement that selects the active database.
#[must_use]
pub fn use_database_sql(database: &str) -> String {
    format!("USE {database}")
}
