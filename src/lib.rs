//! # crudgen
//!
//! **crudgen** is a schema-driven source generator. Given a static, in-memory
//! catalog of database tables and columns, it emits a full vertical slice of
//! CRUD application code for each table:
//!
//! - versioned database changelogs (create-table and constraints changesets
//!   plus a master manifest),
//! - JPA persistence entities with a shared identity/audit supertype,
//! - Spring Data repository contracts,
//! - service interfaces and implementations with derived precondition checks
//!   and delete guards,
//! - REST controllers, DTOs and MapStruct mappers,
//! - error scaffolding (exception types, error codes, a constraint catalog
//!   and a global handler),
//! - a Postman-style API call collection with an environment file.
//!
//! ## Architecture
//!
//! The interesting part is not any single artifact but keeping them in
//! agreement: a composite-key table must produce matching identifier types in
//! its changelog, entity, repository, service and controller simultaneously.
//! Every decision more than one artifact depends on is computed once by the
//! derivation engine in [`derive`] and passed by reference into each
//! generator:
//!
//! ```text
//! table catalog → derive (key shapes, table specs, child refs)
//!              → generators::* (one module per artifact kind)
//!              → render (document trees + pretty-printers)
//!              → output files
//! ```
//!
//! Generators never interpolate strings straight into output files; each
//! artifact format has a structured document tree in [`render`] with a
//! dedicated pretty-printer, so the derivation logic is testable without
//! string diffing.
//!
//! The generator is a one-shot, deterministic batch tool: for a fixed input
//! catalog every run produces byte-identical output. Failures abort the run;
//! file writes are not transactional.

pub mod catalog;
pub mod config;
pub mod derive;
pub mod generators;
pub mod naming;
pub mod render;
pub mod schema;

pub use config::GeneratorConfig;
pub use schema::{Column, ForeignKey, Table};
