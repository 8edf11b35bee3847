//! The relationship catalog.
//!
//! The catalog maps `(owning table, reference column)` to the table and
//! column it points at. It is populated strictly from the database's own
//! constraint metadata after tables exist — never from declarations — and
//! is the resolver's single source of truth for turning a stored integer
//! back into a related row.

use queryhouse_core::{DbHandle, Error, Result, Value};
use std::collections::HashMap;

/// Where a constrained column points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTarget {
    /// The referenced table.
    pub table: String,
    /// The referenced column (the target's primary key).
    pub column: String,
}

/// All foreign-key relationships of one database, keyed by owning table and
/// local column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipCatalog {
    relations: HashMap<String, HashMap<String, RelationTarget>>,
}

impl RelationshipCatalog {
    /// Build a catalog by introspecting the database's constraint metadata.
    ///
    /// Must be re-run whenever new foreign-key constraints are added, i.e.
    /// after migration.
    pub fn refresh(handle: &DbHandle, database: &str) -> Result<Self> {
        let sql = format!(
            "SELECT \
                TABLE_NAME, \
                COLUMN_NAME, \
                CONSTRAINT_NAME, \
                REFERENCED_TABLE_NAME, \
                REFERENCED_COLUMN_NAME \
            FROM \
                INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
            WHERE \
                REFERENCED_TABLE_SCHEMA = '{database}'"
        );

        let mut relations: HashMap<String, HashMap<String, RelationTarget>> = HashMap::new();
        for row in handle.query(&sql)? {
            let text = |index: usize| -> Result<String> {
                match row.get(index) {
                    Some(Value::Str(s)) => Ok(s.clone()),
                    other => Err(Error::driver(format!(
                        "unexpected constraint metadata column {index}: {other:?}"
                    ))),
                }
            };
            let table = text(0)?;
            let column = text(1)?;
            let _constraint = text(2)?;
            let referenced_table = text(3)?;
            let referenced_column = text(4)?;

            relations.entry(table).or_default().insert(
                column,
                RelationTarget {
                    table: referenced_table,
                    column: referenced_column,
                },
            );
        }

        let count: usize = relations.values().map(HashMap::len).sum();
        tracing::debug!(database, relationships = count, "refreshed relationship catalog");
        Ok(Self { relations })
    }

    /// Look up where `table.column` points.
    ///
    /// Fails with [`Error::UnknownRelation`] when the database holds no
    /// constraint for the column — resolution has nothing else to fall
    /// back on.
    pub fn lookup(&self, table: &str, column: &str) -> Result<&RelationTarget> {
        self.relations
            .get(table)
            .and_then(|columns| columns.get(column))
            .ok_or_else(|| Error::UnknownRelation {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    /// Number of cataloged relationships.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.values().map(HashMap::len).sum()
    }

    /// Whether the catalog holds no relationships.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
