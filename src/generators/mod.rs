//! Per-artifact generators and the orchestrator that sequences them.
//!
//! Each module consumes the derivation engine's output plus the naming/type
//! mapping and renders one artifact kind. The orchestrator computes the
//! shared derived state once (the [`SchemaIndex`]) and passes it by
//! reference, so decisions are made in exactly one place.
//!
//! The run is single-threaded and deterministic; a failure aborts the whole
//! run and may leave a partially regenerated output tree.

pub mod collection;
pub mod controllers;
pub mod dtos;
pub mod entities;
pub mod errors;
pub mod mappers;
pub mod migrations;
pub mod repositories;
pub mod services;

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::derive::SchemaIndex;
use crate::schema::Table;

/// Run every generator over `tables` in dependency order.
pub fn generate_all(config: &GeneratorConfig, tables: &[Table]) -> anyhow::Result<()> {
    let includes = migrations::write_versioned_files(&config.changelog_dir, tables, &config.author)?;
    migrations::write_master(&config.master_file, &config.changelog_dir, &includes)?;
    info!(
        changesets = includes.len(),
        master = %config.master_file.display(),
        "wrote changelog"
    );

    // Computed once, read-only afterwards; every generator below borrows it.
    let index = SchemaIndex::new(tables);

    errors::generate(config, tables)?;
    entities::generate(config, tables)?;
    repositories::generate(config, tables, &index)?;
    services::generate(config, tables, &index)?;
    dtos::generate(config, tables)?;
    mappers::generate(config, tables, &index)?;
    controllers::generate(config, tables)?;
    info!(out_dir = %config.out_dir.display(), tables = tables.len(), "wrote source artifacts");

    collection::generate(config, tables)?;
    info!(collection = %config.collection_out.display(), "wrote call collection");
    Ok(())
}

/// Write a generated file, creating parent directories as needed.
pub(crate) fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {parent:?}"))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {path:?}"))?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Write a generated file only when it does not exist yet.
///
/// Used for base classes a project may have customized; table-specific
/// artifacts are always overwritten.
pub(crate) fn write_file_if_absent(path: &Path, contents: &str) -> anyhow::Result<()> {
    if path.exists() {
        debug!(path = %path.display(), "kept existing file");
        return Ok(());
    }
    write_file(path, contents)
}
