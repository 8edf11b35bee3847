//! Instance lifecycle and lazy foreign-key resolution for QueryHouse.
//!
//! # Role In The Architecture
//!
//! - [`Orm`] assembles the engine: it owns the shared connection handle,
//!   the active database name, the model registry, and the relationship
//!   catalog, and is the explicit context every operation takes. Build it
//!   with [`Orm::initialize`] (migrate, then catalog) or [`Orm::connect`]
//!   (catalog only).
//! - Persistence ([`Orm::save`], [`Orm::delete`]) synchronizes instance
//!   state back to rows: dirty-column updates, full-field inserts with
//!   primary-key recovery, and recursive saving of unsaved related
//!   instances.
//! - Resolution ([`Orm::related`]) dereferences foreign-key fields lazily
//!   through the catalog, memoizing one query per field per instance.

pub mod orm;
mod persist;
mod resolve;

pub use orm::{Orm, OrmDebugInfo};
