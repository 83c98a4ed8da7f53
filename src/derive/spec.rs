//! Per-table derived facts and the read-only schema index.
//!
//! Everything more than one generator must agree on is computed here, once,
//! and handed to the generators by reference. The engine performs no schema
//! validation: a foreign key pointing at an unknown table resolves to the
//! conservative single-numeric-key default instead of raising, and the
//! resulting artifacts surface the problem downstream.

use std::collections::BTreeMap;

use super::IdBinding;
use crate::schema::Table;

/// A declared foreign key, flattened for generator consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    /// Column holding the reference
    pub column: String,
    /// Referenced table
    pub ref_table: String,
    /// Referenced column
    pub ref_column: String,
}

/// Reverse dependency edge: another table points a foreign key at this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    /// Referencing table
    pub child_table: String,
    /// Foreign-key column inside the referencing table
    pub child_fk: String,
}

/// Validation facts derived for one table, driving precondition and guard
/// generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSpec {
    /// Columns a caller must supply: non-nullable, not part of the primary
    /// key, and without a database default
    pub required_fields: Vec<String>,
    /// Columns with a declared uniqueness constraint
    pub unique_fields: Vec<String>,
    /// Declared foreign keys, in column order
    pub foreign_keys: Vec<ForeignKeyRef>,
    /// Tables referencing this one; empty when nothing does, never absent
    pub child_refs: Vec<ChildRef>,
}

/// Derive the validation spec for every table.
///
/// The child-reference edges are collected in a single full-schema scan; the
/// result is a total function over the input tables.
pub fn derive_specs(tables: &[Table]) -> BTreeMap<String, TableSpec> {
    let mut children: BTreeMap<&str, Vec<ChildRef>> = BTreeMap::new();
    for table in tables {
        for column in &table.columns {
            if let Some(fk) = &column.foreign_key {
                children.entry(fk.table.as_str()).or_default().push(ChildRef {
                    child_table: table.name.clone(),
                    child_fk: column.name.clone(),
                });
            }
        }
    }

    let mut specs = BTreeMap::new();
    for table in tables {
        let mut spec = TableSpec::default();
        for column in &table.columns {
            // A database default satisfies the non-null constraint without
            // caller input, so defaulted columns are never "required".
            if column.nullable == Some(false)
                && !column.primary_key
                && column.default_value.is_none()
            {
                spec.required_fields.push(column.name.clone());
            }
            if column.unique == Some(true) {
                spec.unique_fields.push(column.name.clone());
            }
            if let Some(fk) = &column.foreign_key {
                spec.foreign_keys.push(ForeignKeyRef {
                    column: column.name.clone(),
                    ref_table: fk.table.clone(),
                    ref_column: fk.column.clone(),
                });
            }
        }
        spec.child_refs = children.get(table.name.as_str()).cloned().unwrap_or_default();
        specs.insert(table.name.clone(), spec);
    }
    specs
}

/// Read-only lookup structure computed once from the full schema and passed
/// by reference into every generator.
pub struct SchemaIndex<'a> {
    by_name: BTreeMap<&'a str, &'a Table>,
    specs: BTreeMap<String, TableSpec>,
}

impl<'a> SchemaIndex<'a> {
    pub fn new(tables: &'a [Table]) -> Self {
        Self {
            by_name: tables.iter().map(|t| (t.name.as_str(), t)).collect(),
            specs: derive_specs(tables),
        }
    }

    pub fn table(&self, name: &str) -> Option<&'a Table> {
        self.by_name.get(name).copied()
    }

    /// Derived spec for a table. Total for every table the index was built
    /// from; an unknown name yields an empty spec.
    pub fn spec(&self, name: &str) -> TableSpec {
        self.specs.get(name).cloned().unwrap_or_default()
    }

    /// Identifier contract of a referenced table, resolved transitively.
    ///
    /// An unresolved reference falls back to the implied single numeric
    /// identifier rather than raising.
    pub fn parent_id(&self, name: &str) -> IdBinding {
        match self.table(name) {
            Some(table) => IdBinding::of(table),
            None => IdBinding::implied_default(),
        }
    }

    /// True when the referenced table has (or is assumed to have) a
    /// single-column key, i.e. a scalar identifier exists to query by.
    pub fn parent_is_single(&self, name: &str) -> bool {
        !self.parent_id(name).composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn schema() -> Vec<Table> {
        vec![
            Table::new("category").columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("name", "VARCHAR(255)").nullable(false).unique(),
            ]),
            Table::new("product").columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("sku", "VARCHAR(64)").nullable(false).unique(),
                Column::new("name", "VARCHAR(255)").nullable(false),
                Column::new("price", "NUMERIC(12,2)").default_value("0.00"),
                Column::new("category_id", "BIGINT")
                    .references("category", "id")
                    .nullable(true),
            ]),
            Table::new("stock_level").columns(vec![
                Column::new("product_id", "BIGINT")
                    .primary_key()
                    .references("product", "id")
                    .nullable(false),
                Column::new("warehouse_id", "BIGINT").primary_key().nullable(false),
                Column::new("current_qty", "NUMERIC(14,3)").default_value("0"),
            ]),
        ]
    }

    #[test]
    fn required_iff_non_nullable_non_pk_without_default() {
        let specs = derive_specs(&schema());
        let product = &specs["product"];
        // `price` has a default, `category_id` is nullable, `id` is the key.
        assert_eq!(product.required_fields, ["sku", "name"]);
    }

    #[test]
    fn required_excludes_primary_key_members() {
        let specs = derive_specs(&schema());
        assert!(specs["stock_level"].required_fields.is_empty());
    }

    #[test]
    fn unique_fields_follow_declaration() {
        let specs = derive_specs(&schema());
        assert_eq!(specs["product"].unique_fields, ["sku"]);
    }

    #[test]
    fn child_refs_are_total_over_all_tables() {
        let specs = derive_specs(&schema());
        assert_eq!(
            specs["product"].child_refs,
            [ChildRef {
                child_table: "stock_level".to_string(),
                child_fk: "product_id".to_string(),
            }]
        );
        // Tables with no children get an empty set, never an absent one.
        assert!(specs["stock_level"].child_refs.is_empty());
        assert_eq!(
            specs["category"].child_refs,
            [ChildRef {
                child_table: "product".to_string(),
                child_fk: "category_id".to_string(),
            }]
        );
    }

    #[test]
    fn unresolved_parent_falls_back_to_numeric_single_key() {
        let tables = schema();
        let index = SchemaIndex::new(&tables);
        let parent = index.parent_id("nonexistent");
        assert!(parent.implied);
        assert!(!parent.composite);
        assert_eq!(parent.java_type, "Long");
        assert!(index.parent_is_single("nonexistent"));
    }

    #[test]
    fn composite_parent_is_not_single() {
        let tables = schema();
        let index = SchemaIndex::new(&tables);
        assert!(!index.parent_is_single("stock_level"));
        assert_eq!(index.parent_id("stock_level").java_type, "StockLevelId");
        assert!(index.parent_is_single("category"));
    }
}
