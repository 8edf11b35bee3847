//! Schema migration and introspection for QueryHouse.
//!
//! # Role In The Architecture
//!
//! - **DDL generation**: [`ddl`] renders `CREATE TABLE` statements from
//!   compiled model descriptors.
//! - **Migration**: [`migrate::create_tables`] creates missing tables with
//!   dependency-ordered retry passes; existing tables are reported, never
//!   altered.
//! - **Introspection**: [`introspect`] wraps the three metadata queries the
//!   engine relies on (base tables, columns, and — via [`catalog`] —
//!   foreign-key constraints).
//! - **Relationship catalog**: [`catalog::RelationshipCatalog`] is built
//!   from live constraint metadata and feeds the lazy resolver.
//!
//! The SQL issued here is MySQL dialect; porting to another engine means
//! supplying equivalents of these statements, nothing more.

pub mod catalog;
pub mod ddl;
pub mod introspect;
pub mod migrate;

pub use catalog::{RelationTarget, RelationshipCatalog};
pub use ddl::create_table_sql;
pub use introspect::{ColumnInfo, ColumnType, KeyKind, list_base_tables, list_columns, primary_key_column};
pub use migrate::{MigrationReport, create_tables};
