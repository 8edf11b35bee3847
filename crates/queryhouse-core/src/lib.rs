//! Core types and traits for QueryHouse.
//!
//! `queryhouse-core` is the foundation layer for the engine. It defines the
//! data model and the seams every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: [`Connection`] is the capability a host database
//!   driver implements; [`DbHandle`] is the process's single shared handle
//!   to it.
//! - **Data model**: [`Value`] and [`Row`] represent what flows across the
//!   connection; [`FieldKind`], [`ModelDecl`], and [`ModelDescriptor`]
//!   describe models; [`Instance`] is a live row with dirty tracking and a
//!   per-field foreign-key cache.
//! - **Registry**: [`Registry`] maps table names to compiled descriptors
//!   and is passed explicitly into the migration and query layers.
//!
//! # Who Uses This Crate
//!
//! - `queryhouse-schema` consumes descriptors to generate DDL and builds
//!   the relationship catalog over the connection seam.
//! - `queryhouse-query` renders criteria against descriptors and
//!   materializes `Instance`s from rows.
//! - `queryhouse-session` drives persistence and lazy resolution.
//!
//! Most applications should use the `queryhouse` facade; reach for
//! `queryhouse-core` directly when implementing a driver.

pub mod connection;
pub mod error;
pub mod field;
pub mod instance;
pub mod model;
pub mod registry;
pub mod row;
pub mod value;

pub use connection::{ConnectConfig, Connection, DbHandle};
pub use error::{Error, Result};
pub use field::{FieldDef, FieldKind};
pub use instance::{FkState, Instance};
pub use model::{FkAccessor, ModelDecl, ModelDescriptor};
pub use registry::Registry;
pub use row::Row;
pub use value::Value;
