//! Error types for QueryHouse.
//!
//! Every failure is raised synchronously at the point of detection and
//! carries enough context (table, field, or criteria) to diagnose without
//! inspecting engine internals. Nothing here is retried internally; the one
//! exception is the migration engine's pass loop, which inspects
//! [`Error::is_missing_reference`] to decide whether a `CREATE TABLE`
//! failure means "referenced table not created yet" and is worth another
//! pass.

use std::fmt;

/// Convenience alias used across all QueryHouse crates.
pub type Result<T> = std::result::Result<T, Error>;

/// MySQL error code for "Cannot add foreign key constraint".
const ER_CANNOT_ADD_FOREIGN: u16 = 1215;
/// MySQL error code for "Failed to open the referenced table".
const ER_FK_CANNOT_OPEN_PARENT: u16 = 1824;

/// All errors surfaced by the mapping, migration, query, and lifecycle
/// layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An abstract base declaration was instantiated or registered.
    AbstractInstantiation {
        /// The abstract model's name.
        model: String,
    },

    /// An unknown field name was supplied to a constructor or filter.
    InvalidField {
        /// The model whose fields were consulted.
        model: String,
        /// The offending field name.
        field: String,
    },

    /// A value of the wrong shape was assigned to a field.
    InvalidAssignment {
        /// The model owning the field.
        model: String,
        /// The field the assignment targeted.
        field: String,
        /// What went wrong.
        detail: String,
    },

    /// A filter clause could not be built.
    InvalidCriteria {
        /// The table being queried.
        table: String,
        /// What went wrong.
        detail: String,
    },

    /// A different model is already registered under this table name.
    DuplicateTable {
        /// The contested table name.
        table: String,
    },

    /// No model is registered under this table name.
    UnknownModel {
        /// The looked-up table name.
        table: String,
    },

    /// A `get` matched no rows.
    NotFound {
        /// The queried table.
        table: String,
        /// The rendered filter criteria.
        criteria: String,
    },

    /// A `get` matched more than one row.
    MultipleResultsFound {
        /// The queried table.
        table: String,
        /// The rendered filter criteria.
        criteria: String,
        /// How many rows matched.
        count: usize,
    },

    /// The relationship catalog has no entry for a column.
    UnknownRelation {
        /// The owning table.
        table: String,
        /// The unconstrained column.
        column: String,
    },

    /// Migration reached a fixed point with tables still pending.
    UnresolvableDependency {
        /// The tables that could not be created.
        tables: Vec<String>,
    },

    /// `delete` was called on an instance that was never saved.
    DeleteUnsaved {
        /// The instance's table.
        table: String,
    },

    /// A row's shape did not match the model's declared fields.
    RowShape {
        /// The model's table.
        table: String,
        /// What went wrong.
        detail: String,
    },

    /// The newly assigned primary key could not be read back after insert.
    PkRecovery {
        /// The inserted-into table.
        table: String,
    },

    /// The database driver reported an error.
    Database {
        /// Driver-specific error code, when one was reported.
        code: Option<u16>,
        /// Driver-supplied message.
        message: String,
    },
}

impl Error {
    /// Construct a driver error with a code.
    #[must_use]
    pub fn database(code: u16, message: impl Into<String>) -> Self {
        Error::Database {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Construct a driver error without a code.
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Error::Database {
            code: None,
            message: message.into(),
        }
    }

    /// Whether this error means a `CREATE TABLE` referenced a table that
    /// does not exist yet.
    ///
    /// The migration engine treats exactly this case as retryable within a
    /// run; every other database error is fatal.
    #[must_use]
    pub fn is_missing_reference(&self) -> bool {
        matches!(
            self,
            Error::Database {
                code: Some(ER_CANNOT_ADD_FOREIGN | ER_FK_CANNOT_OPEN_PARENT),
                ..
            }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AbstractInstantiation { model } => {
                write!(
                    f,
                    "'{model}' is an abstract base declaration and cannot be instantiated or registered"
                )
            }
            Error::InvalidField { model, field } => {
                write!(f, "'{field}' is not a valid field for model '{model}'")
            }
            Error::InvalidAssignment {
                model,
                field,
                detail,
            } => {
                write!(f, "invalid assignment to '{model}.{field}': {detail}")
            }
            Error::InvalidCriteria { table, detail } => {
                write!(f, "invalid criteria for '{table}': {detail}")
            }
            Error::DuplicateTable { table } => {
                write!(
                    f,
                    "a different model is already registered for table '{table}'"
                )
            }
            Error::UnknownModel { table } => {
                write!(f, "no model is registered for table '{table}'")
            }
            Error::NotFound { table, criteria } => {
                write!(f, "no '{table}' row matches {criteria}")
            }
            Error::MultipleResultsFound {
                table,
                criteria,
                count,
            } => {
                write!(
                    f,
                    "expected exactly one '{table}' row matching {criteria}, found {count}"
                )
            }
            Error::UnknownRelation { table, column } => {
                write!(
                    f,
                    "no foreign-key relationship is cataloged for {table}.{column}"
                )
            }
            Error::UnresolvableDependency { tables } => {
                write!(
                    f,
                    "could not create tables {} after exhausting dependency passes",
                    tables.join(", ")
                )
            }
            Error::DeleteUnsaved { table } => {
                write!(f, "cannot delete a '{table}' instance before it is saved")
            }
            Error::RowShape { table, detail } => {
                write!(f, "malformed row for '{table}': {detail}")
            }
            Error::PkRecovery { table } => {
                write!(
                    f,
                    "row inserted into '{table}' but its primary key could not be read back"
                )
            }
            Error::Database { code, message } => match code {
                Some(code) => write!(f, "database error {code}: {message}"),
                None => write!(f, "database error: {message}"),
            },
        }
    }
}

impl std::error::Error for Error {}
