//! QueryHouse: a minimal Django-style relational mapper.
//!
//! Models are declared at runtime, compiled into table descriptors,
//! migrated into a MySQL-dialect database in dependency order, queried
//! through lazily-evaluated query sets, and synchronized back to rows with
//! foreign-key awareness.
//!
//! # Example
//!
//! ```no_run
//! use queryhouse::prelude::*;
//! # fn connect() -> queryhouse::DbHandle { unimplemented!() }
//!
//! # fn main() -> queryhouse::Result<()> {
//! let mut registry = Registry::new();
//! registry.register(&ModelDecl::new("Group").string_field("name", 64).compile()?)?;
//! registry.register(
//!     &ModelDecl::new("User")
//!         .string_field("name", 64)
//!         .int_field("age")
//!         .foreign_key("group", "Group")
//!         .compile()?,
//! )?;
//!
//! // The host supplies the connection; QueryHouse never dials out itself.
//! let handle: DbHandle = connect();
//! let (orm, report) = Orm::initialize(handle, "myqueryhouse", registry)?;
//! println!("created {} tables", report.created.len());
//!
//! let mut user = orm.new_instance("User", &[("name", Value::from("Bob"))])?;
//! orm.save(&mut user)?;
//!
//! let mut fetched = orm.objects("User")?.get(Criteria::new().eq("name", "Bob"))?;
//! let group = orm.related(&mut fetched, "group")?;
//! # let _ = group;
//! # Ok(())
//! # }
//! ```
//!
//! The implementation lives in focused sub-crates — `queryhouse-core`,
//! `queryhouse-schema`, `queryhouse-query`, `queryhouse-session` — and this
//! facade re-exports their public surface.

pub use queryhouse_core::{
    ConnectConfig, Connection, DbHandle, Error, FieldDef, FieldKind, FkAccessor, FkState,
    Instance, ModelDecl, ModelDescriptor, Registry, Result, Row, Value,
};
pub use queryhouse_query::{Criteria, QuerySet};
pub use queryhouse_schema::{
    ColumnInfo, ColumnType, KeyKind, MigrationReport, RelationTarget, RelationshipCatalog,
    create_table_sql, create_tables, list_base_tables, list_columns, primary_key_column,
};
pub use queryhouse_session::{Orm, OrmDebugInfo};

/// The commonly-needed imports in one place.
pub mod prelude {
    pub use crate::{
        Criteria, DbHandle, Error, FieldKind, FkState, Instance, ModelDecl, Orm, Registry,
        Result, Value,
    };
}
