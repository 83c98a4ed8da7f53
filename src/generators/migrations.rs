//! Changelog generation: one create-table changeset and one constraints
//! changeset per table, a preamble enabling the required database extension,
//! and a master manifest referencing every file in creation-then-constraints
//! order.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;

use crate::naming::{
    foreign_key_constraint_name, index_name, primary_key_name, unique_constraint_name,
};
use crate::render::changelog::{
    changeset_document, master_document, Change, ChangeSet, ColumnDdl, DdlConstraints,
};
use crate::schema::{normalize, Table};
use crate::generators::write_file;

/// Computed-expression forms recognized by [`is_computed_default`], compared
/// as uppercase prefixes (function names without their parentheses).
const COMPUTED_DEFAULT_PREFIXES: [&str; 5] = [
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "NOW",
    "GEN_RANDOM_UUID",
    "UUID_GENERATE_V4",
];

/// Classify a default expression as computed (function call, cast or other
/// expression) versus a plain literal.
///
/// This is a lexical heuristic over an enumerated allow-list plus two
/// structural hints (a trailing parenthesis, a `::` cast). Vendor-specific
/// functions outside the list are misclassified as literals; that limitation
/// is inherited from the schema dialect and deliberately not widened here.
pub fn is_computed_default(value: &str) -> bool {
    let v = value.trim();
    let upper = v.to_uppercase();
    COMPUTED_DEFAULT_PREFIXES.iter().any(|p| upper.starts_with(p))
        || v.ends_with(')')
        || v.contains("::")
}

/// Build the create-table changeset for one table, after baseline
/// normalization.
pub fn table_changeset(table: &Table, author: &str, seq: usize) -> ChangeSet {
    let table = normalize::with_system_columns(table);
    let columns = table
        .columns
        .iter()
        .map(|col| {
            let constraints = if col.nullable.is_some() || col.primary_key || col.unique == Some(true)
            {
                Some(DdlConstraints {
                    nullable: col.nullable,
                    primary_key: col.primary_key,
                    primary_key_name: col.primary_key.then(|| primary_key_name(&table.name)),
                    unique: col.unique == Some(true) && !col.primary_key,
                })
            } else {
                None
            };
            ColumnDdl {
                name: col.name.clone(),
                sql_type: col.sql_type.clone(),
                default: col
                    .default_value
                    .as_ref()
                    .map(|v| (v.clone(), is_computed_default(v))),
                constraints,
            }
        })
        .collect();

    ChangeSet {
        id: format!("{seq:03}-{}-table", table.name),
        author: author.to_string(),
        changes: vec![Change::CreateTable {
            table: table.name.clone(),
            schema: table.schema_name.clone(),
            remarks: table.remarks.clone(),
            columns,
        }],
    }
}

/// Build the constraints changeset for one table: auto-increment for the
/// surrogate key, unique constraints, the external-identifier unique index,
/// foreign keys, and non-unique indexes with name de-duplication.
pub fn constraints_changeset(table: &Table, author: &str, seq: usize) -> ChangeSet {
    let table = normalize::with_system_columns(table);
    let mut changes = Vec::new();

    // Auto-increment applies when `id` is the whole primary key (declared or
    // injected by normalization).
    let id_is_sole_pk = table.columns.iter().any(|c| c.name == "id" && c.primary_key)
        && !table.columns.iter().any(|c| c.primary_key && c.name != "id");
    if id_is_sole_pk {
        changes.push(Change::AddAutoIncrement {
            table: table.name.clone(),
            column: "id".to_string(),
            column_type: "BIGINT".to_string(),
        });
    }

    let mut created_indexes: HashSet<String> = HashSet::new();

    // Unique constraints. The external identifier is skipped here; it gets a
    // named unique index below which covers uniqueness and lookup at once.
    for col in &table.columns {
        if col.unique == Some(true) && !col.primary_key && !col.name.eq_ignore_ascii_case("uuid") {
            changes.push(Change::AddUniqueConstraint {
                table: table.name.clone(),
                column: col.name.clone(),
                name: unique_constraint_name(&table.name, &col.name),
            });
        }
    }

    if table.columns.iter().any(|c| c.name.eq_ignore_ascii_case("uuid")) {
        let name = index_name(&table.name, "uuid");
        changes.push(Change::CreateIndex {
            table: table.name.clone(),
            name: name.clone(),
            unique: true,
            columns: vec!["uuid".to_string()],
        });
        created_indexes.insert(name);
    }

    // Foreign keys, each with a supporting non-unique index (the target
    // database does not auto-index FK columns).
    for col in &table.columns {
        if let Some(fk) = &col.foreign_key {
            changes.push(Change::AddForeignKey {
                name: foreign_key_constraint_name(&table.name, &col.name, &fk.table),
                base_table: table.name.clone(),
                base_column: col.name.clone(),
                ref_table: fk.table.clone(),
                ref_column: fk.column.clone(),
            });
            let name = index_name(&table.name, &col.name);
            if created_indexes.insert(name.clone()) {
                changes.push(Change::CreateIndex {
                    table: table.name.clone(),
                    name,
                    unique: false,
                    columns: vec![col.name.clone()],
                });
            }
        }
    }

    // Explicitly requested indexes; primary-key and unique columns are
    // already covered, and a name seen above must not be emitted twice.
    for col in &table.columns {
        if col.is_index && !col.primary_key && col.unique != Some(true) {
            let name = index_name(&table.name, &col.name);
            if created_indexes.insert(name.clone()) {
                changes.push(Change::CreateIndex {
                    table: table.name.clone(),
                    name,
                    unique: false,
                    columns: vec![col.name.clone()],
                });
            }
        }
    }

    ChangeSet {
        id: format!("{seq:03}-{}-constraints", table.name),
        author: author.to_string(),
        changes,
    }
}

/// Preamble changeset enabling the extension that provides
/// `gen_random_uuid()`.
pub fn extensions_changeset(author: &str) -> ChangeSet {
    ChangeSet {
        id: "000-postgres-extensions".to_string(),
        author: author.to_string(),
        changes: vec![Change::Sql(
            "CREATE EXTENSION IF NOT EXISTS pgcrypto;".to_string(),
        )],
    }
}

/// Write the versioned changelog files and return their names in manifest
/// order: preamble, every table's create changeset, then every constraints
/// changeset, so all tables exist before any cross-table foreign key.
pub fn write_versioned_files(
    dir: &Path,
    tables: &[Table],
    author: &str,
) -> anyhow::Result<Vec<String>> {
    let ext_name = "000-postgres-extensions.xml".to_string();
    write_file(
        &dir.join(&ext_name),
        &changeset_document(&extensions_changeset(author)),
    )?;

    let mut table_files = Vec::new();
    let mut constraint_files = Vec::new();
    for (i, table) in tables.iter().enumerate() {
        let seq = i + 1;
        let table_name = format!("{seq:03}-{}-table.xml", table.name);
        let cons_name = format!("{seq:03}-{}-constraints.xml", table.name);
        write_file(
            &dir.join(&table_name),
            &changeset_document(&table_changeset(table, author, seq)),
        )?;
        write_file(
            &dir.join(&cons_name),
            &changeset_document(&constraints_changeset(table, author, seq)),
        )?;
        table_files.push(table_name);
        constraint_files.push(cons_name);
    }

    let mut includes = vec![ext_name];
    includes.extend(table_files);
    includes.extend(constraint_files);
    Ok(includes)
}

/// Write the master manifest; include paths are relative to the manifest's
/// own directory.
pub fn write_master(
    master_file: &Path,
    changelog_dir: &Path,
    includes: &[String],
) -> anyhow::Result<()> {
    let master_parent = master_file
        .parent()
        .with_context(|| format!("master file {master_file:?} has no parent directory"))?;
    let relative_dir = changelog_dir
        .strip_prefix(master_parent)
        .with_context(|| {
            format!("changelog dir {changelog_dir:?} is not under the master directory {master_parent:?}")
        })?;
    let prefix = relative_dir.to_string_lossy().replace('\\', "/");
    let entries: Vec<String> = includes
        .iter()
        .map(|name| {
            if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            }
        })
        .collect();
    write_file(master_file, &master_document(&entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn classify_default_allow_list() {
        assert!(is_computed_default("CURRENT_TIMESTAMP"));
        assert!(is_computed_default("now()"));
        assert!(is_computed_default("gen_random_uuid()"));
        assert!(is_computed_default("uuid_generate_v4()"));
        assert!(is_computed_default("'{}'::jsonb"));
        assert!(!is_computed_default("0.00"));
        assert!(!is_computed_default("'draft'"));
        assert!(!is_computed_default("false"));
        // Vendor functions outside the allow-list without structural hints
        // are (knowingly) treated as literals.
        assert!(!is_computed_default("sysdate"));
    }

    #[test]
    fn fk_and_explicit_index_requests_are_deduplicated() {
        let table = Table::new("sale").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("client_id", "BIGINT")
                .references("client", "id")
                .nullable(false)
                .indexed(),
        ]);
        let cs = constraints_changeset(&table, "tester", 1);
        let index_names: Vec<&str> = cs
            .changes
            .iter()
            .filter_map(|c| match c {
                Change::CreateIndex { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        let fk_index_count = index_names
            .iter()
            .filter(|n| **n == "idx_sale_client_id")
            .count();
        assert_eq!(fk_index_count, 1, "the same logical index must not be emitted twice");
        assert!(index_names.contains(&"idx_sale_uuid"));
    }

    #[test]
    fn sole_id_key_gets_auto_increment() {
        let keyed = Table::new("client").columns(vec![Column::new("id", "BIGINT").primary_key()]);
        let cs = constraints_changeset(&keyed, "tester", 1);
        assert!(cs
            .changes
            .iter()
            .any(|c| matches!(c, Change::AddAutoIncrement { .. })));

        let composite = Table::new("stock_level").columns(vec![
            Column::new("product_id", "BIGINT").primary_key(),
            Column::new("warehouse_id", "BIGINT").primary_key(),
        ]);
        let cs = constraints_changeset(&composite, "tester", 1);
        assert!(!cs
            .changes
            .iter()
            .any(|c| matches!(c, Change::AddAutoIncrement { .. })));
    }

    #[test]
    fn create_changeset_normalizes_and_names_primary_key() {
        let table = Table::new("client").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("fullname", "VARCHAR(255)").nullable(false),
        ]);
        let doc = changeset_document(&table_changeset(&table, "tester", 3));
        assert!(doc.contains("<changeSet id=\"003-client-table\" author=\"tester\">"));
        assert!(doc.contains("primaryKeyName=\"pk_client\""));
        // Normalization injected the external identifier with its computed
        // default.
        assert!(doc.contains("defaultValueComputed=\"gen_random_uuid()\""));
    }
}
