//! Schema introspection.
//!
//! These queries are the engine's only window into what actually exists in
//! the database. Ports to another engine must supply equivalents of the
//! three: base-table listing, column listing with primary-key detection,
//! and the foreign-key constraint query in [`crate::catalog`].

use queryhouse_core::{DbHandle, Error, Result, Value};
use regex::Regex;
use std::sync::OnceLock;

/// How a column participates in the table's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// The table's primary key (`PRI`).
    Primary,
    /// A constrained/indexed reference column (`MUL`).
    Foreign,
    /// An ordinary column.
    None,
}

/// The declared SQL type of an introspected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// `varchar(N)`.
    VarChar(u32),
    /// `int`, with or without a display width.
    Int,
    /// Anything this engine does not map.
    Other(String),
}

impl ColumnType {
    /// Classify a type string as reported by `SHOW COLUMNS`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        static VARCHAR: OnceLock<Regex> = OnceLock::new();
        static INT: OnceLock<Regex> = OnceLock::new();

        let varchar = VARCHAR.get_or_init(|| Regex::new(r"(?i)^varchar\((\d+)\)$").expect("varchar pattern"));
        let int = INT.get_or_init(|| Regex::new(r"(?i)^int(\(\d+\))?$").expect("int pattern"));

        if let Some(captures) = varchar.captures(raw.trim()) {
            if let Ok(length) = captures[1].parse() {
                return ColumnType::VarChar(length);
            }
        }
        if int.is_match(raw.trim()) {
            return ColumnType::Int;
        }
        ColumnType::Other(raw.trim().to_string())
    }
}

/// One column as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Classified column type.
    pub column_type: ColumnType,
    /// Whether the column may hold `NULL`.
    pub nullable: bool,
    /// Key participation.
    pub key: KeyKind,
}

/// List the active database's base tables, excluding views.
pub fn list_base_tables(handle: &DbHandle) -> Result<Vec<String>> {
    let rows = handle.query("SHOW FULL TABLES WHERE Table_type = 'BASE TABLE'")?;
    let mut tables = Vec::with_capacity(rows.len());
    for row in rows {
        match row.get(0) {
            Some(Value::Str(name)) => tables.push(name.clone()),
            other => {
                return Err(Error::driver(format!(
                    "unexpected table listing column: {other:?}"
                )));
            }
        }
    }
    tracing::debug!(count = tables.len(), "listed base tables");
    Ok(tables)
}

/// List a table's columns, including which column is the primary key.
pub fn list_columns(handle: &DbHandle, database: &str, table: &str) -> Result<Vec<ColumnInfo>> {
    let rows = handle.query(&format!("SHOW COLUMNS FROM {database}.{table}"))?;
    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        // SHOW COLUMNS yields (Field, Type, Null, Key, Default, Extra).
        let name = row
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::driver(format!("column listing for '{table}' lacks a name")))?
            .to_string();
        let column_type = row
            .get(1)
            .and_then(Value::as_str)
            .map(ColumnType::parse)
            .ok_or_else(|| Error::driver(format!("column '{table}.{name}' lacks a type")))?;
        let nullable = row.get(2).and_then(Value::as_str) == Some("YES");
        let key = match row.get(3).and_then(Value::as_str) {
            Some("PRI") => KeyKind::Primary,
            Some("MUL") => KeyKind::Foreign,
            _ => KeyKind::None,
        };
        columns.push(ColumnInfo {
            name,
            column_type,
            nullable,
            key,
        });
    }
    Ok(columns)
}

/// The primary-key column among introspected columns, if one exists.
#[must_use]
pub fn primary_key_column(columns: &[ColumnInfo]) -> Option<&str> {
    columns
        .iter()
        .find(|c| c.key == KeyKind::Primary)
        .map(|c| c.name.as_str())
}
