//! Lazily-evaluated query sets for QueryHouse.
//!
//! # Role In The Architecture
//!
//! - [`Criteria`] validates filter terms against a model's declared fields
//!   and renders the `WHERE` body.
//! - [`QuerySet`] owns query execution: it buffers whole result sets,
//!   materializes instances, caches them, and enforces the exactly-one
//!   contract of `get`.
//!
//! The session layer hands out query sets; nothing here mutates the
//! database.

pub mod criteria;
pub mod queryset;

pub use criteria::Criteria;
pub use queryset::QuerySet;
