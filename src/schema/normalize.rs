//! Baseline normalization: fill in the implied system columns every table
//! carries (surrogate identity, opaque external identifier, audit timestamps,
//! optimistic-lock counter, soft-delete flag and timestamp).
//!
//! Existing declarations are respected: only genuinely unset nullability or
//! default attributes are backfilled, so applying the pass to an already
//! normalized table is a no-op.

use super::{Column, Table};

/// System columns in their fixed output position, ahead of the declared
/// business columns.
const SYSTEM_ORDER: [&str; 7] = [
    "id",
    "uuid",
    "created_at",
    "updated_at",
    "version",
    "deleted",
    "deleted_at",
];

/// Returns a copy of `table` augmented with the implied system columns.
///
/// A surrogate `id BIGINT` primary key is injected only when the table
/// declares no primary key at all. Declared columns with system names keep
/// their explicit attributes and are moved to the system slot.
pub fn with_system_columns(table: &Table) -> Table {
    let mut work: Vec<Column> = table.columns.clone();
    let has_pk = work.iter().any(|c| c.primary_key);

    if !has_pk && !work.iter().any(|c| c.name == "id") {
        work.push(Column::new("id", "BIGINT").primary_key());
    }

    match work.iter_mut().find(|c| c.name == "uuid") {
        Some(c) => {
            if c.unique.is_none() {
                c.unique = Some(true);
            }
            if c.nullable.is_none() {
                c.nullable = Some(false);
            }
            if c.default_value.is_none() {
                c.default_value = Some("gen_random_uuid()".to_string());
            }
        }
        None => work.push(
            Column::new("uuid", "UUID")
                .default_value("gen_random_uuid()")
                .unique()
                .nullable(false),
        ),
    }

    for name in ["created_at", "updated_at"] {
        match work.iter_mut().find(|c| c.name == name) {
            Some(c) => {
                if c.nullable.is_none() {
                    c.nullable = Some(false);
                }
            }
            None => work.push(
                Column::new(name, "TIMESTAMPTZ")
                    .default_value("CURRENT_TIMESTAMP")
                    .nullable(false),
            ),
        }
    }

    match work.iter_mut().find(|c| c.name == "version") {
        Some(c) => {
            if c.nullable.is_none() {
                c.nullable = Some(false);
            }
            if c.default_value.is_none() {
                c.default_value = Some("0".to_string());
            }
        }
        None => work.push(
            Column::new("version", "BIGINT")
                .default_value("0")
                .nullable(false),
        ),
    }

    match work.iter_mut().find(|c| c.name == "deleted") {
        Some(c) => {
            if c.nullable.is_none() {
                c.nullable = Some(false);
            }
            if c.default_value.is_none() {
                c.default_value = Some("false".to_string());
            }
        }
        None => work.push(
            Column::new("deleted", "BOOLEAN")
                .default_value("false")
                .nullable(false),
        ),
    }

    if !work.iter().any(|c| c.name == "deleted_at") {
        work.push(Column::new("deleted_at", "TIMESTAMPTZ").nullable(true));
    }

    // System columns first in fixed order, then business columns in
    // declaration order.
    let mut ordered = Vec::with_capacity(work.len());
    for name in SYSTEM_ORDER {
        if let Some(pos) = work.iter().position(|c| c.name == name) {
            ordered.push(work.remove(pos));
        }
    }
    ordered.append(&mut work);

    Table {
        name: table.name.clone(),
        schema_name: table.schema_name.clone(),
        remarks: table.remarks.clone(),
        columns: ordered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business_table() -> Table {
        Table::new("product").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("sku", "VARCHAR(64)").nullable(false).unique(),
            Column::new("name", "VARCHAR(255)").nullable(false),
        ])
    }

    #[test]
    fn injects_system_columns_in_fixed_order() {
        let normalized = with_system_columns(&business_table());
        let names: Vec<_> = normalized.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "id",
                "uuid",
                "created_at",
                "updated_at",
                "version",
                "deleted",
                "deleted_at",
                "sku",
                "name"
            ]
        );
    }

    #[test]
    fn surrogate_id_only_without_declared_primary_key() {
        let table = Table::new("audit_log").columns(vec![Column::new("message", "TEXT")]);
        let normalized = with_system_columns(&table);
        let id = normalized.column("id").expect("surrogate id injected");
        assert!(id.primary_key);

        let keyed = with_system_columns(&business_table());
        assert_eq!(keyed.primary_key_columns().count(), 1);
    }

    #[test]
    fn respects_explicit_declarations() {
        let table = Table::new("event").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("uuid", "UUID").default_value("uuid_generate_v4()"),
            Column::new("created_at", "TIMESTAMPTZ").nullable(true),
        ]);
        let normalized = with_system_columns(&table);
        assert_eq!(
            normalized.column("uuid").and_then(|c| c.default_value.as_deref()),
            Some("uuid_generate_v4()")
        );
        // Unset attributes are backfilled, explicit ones kept.
        assert_eq!(normalized.column("uuid").and_then(|c| c.unique), Some(true));
        assert_eq!(
            normalized.column("created_at").and_then(|c| c.nullable),
            Some(true)
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = with_system_columns(&business_table());
        let twice = with_system_columns(&once);
        assert_eq!(once, twice);
    }
}
