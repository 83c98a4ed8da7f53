//! The schema-derivation engine.
//!
//! Produces, from the table/column model, every fact more than one generator
//! must agree on: primary-key shape and the identifier contract it implies
//! ([`KeyShape`], [`IdBinding`]), per-table validation facts and the reverse
//! dependency graph ([`TableSpec`]), and transitive foreign-key target
//! resolution through the read-only [`SchemaIndex`].
//!
//! For a fixed input schema every derivation is deterministic and stable
//! with respect to declaration order.

mod keys;
mod spec;

pub use keys::{IdBinding, KeyShape};
pub use spec::{derive_specs, ChildRef, ForeignKeyRef, SchemaIndex, TableSpec};
