//! The statically declared table catalog the CLI generates from.
//!
//! Schema is code-as-data: there is no file format to parse. Declaration
//! order is load-bearing: it drives changeset sequence numbers and field
//! order in every generated artifact.

use crate::schema::{Column, Table};

/// Inventory-domain catalog: warehouses and their stock, a product tree, and
/// the purchase side that references both.
pub fn tables() -> Vec<Table> {
    vec![
        Table::new("enterprise")
            .remarks("Business entities that own warehouses")
            .columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("name", "VARCHAR(255)").nullable(false).unique().indexed(),
                Column::new("location", "VARCHAR(255)"),
            ]),
        Table::new("warehouse")
            .remarks("Warehouse locations belonging to enterprises")
            .columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("name", "VARCHAR(255)").nullable(false),
                Column::new("code", "VARCHAR(32)").nullable(false).unique().indexed(),
                Column::new("enterprise_id", "BIGINT")
                    .references("enterprise", "id")
                    .nullable(false)
                    .indexed(),
            ]),
        Table::new("category")
            .remarks("Product categorization with hierarchical support")
            .columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("name", "VARCHAR(255)").nullable(false).unique().indexed(),
                Column::new("parent_id", "BIGINT")
                    .references("category", "id")
                    .nullable(true)
                    .indexed(),
            ]),
        Table::new("product")
            .remarks("Product catalog with pricing and categorization")
            .columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("sku", "VARCHAR(64)").nullable(false).unique().indexed(),
                Column::new("name", "VARCHAR(255)").nullable(false),
                Column::new("price", "NUMERIC(12,2)").default_value("0.00"),
                Column::new("tax_rate", "NUMERIC(5,2)").default_value("0.00"),
                Column::new("category_id", "BIGINT")
                    .references("category", "id")
                    .nullable(true)
                    .indexed(),
                Column::new("unit_of_measure", "VARCHAR(32)").default_value("'unit'"),
                Column::new("is_active", "BOOLEAN").default_value("true"),
            ]),
        Table::new("supplier")
            .remarks("Product suppliers with banking information")
            .columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("fullname", "VARCHAR(255)").nullable(false),
                Column::new("email", "VARCHAR(255)").unique().indexed(),
                Column::new("iban", "VARCHAR(34)").nullable(true).unique(),
                Column::new("warehouse_id", "BIGINT")
                    .references("warehouse", "id")
                    .nullable(false)
                    .indexed(),
                Column::new("is_active", "BOOLEAN").default_value("true"),
            ]),
        Table::new("purchase_order")
            .remarks("Purchase orders from suppliers")
            .columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("order_date", "TIMESTAMPTZ").default_value("NOW()"),
                Column::new("total_amount", "NUMERIC(12,2)").default_value("0.00"),
                Column::new("status", "VARCHAR(32)").default_value("'draft'"),
                Column::new("supplier_id", "BIGINT")
                    .references("supplier", "id")
                    .nullable(false)
                    .indexed(),
                Column::new("warehouse_id", "BIGINT")
                    .references("warehouse", "id")
                    .nullable(false)
                    .indexed(),
            ]),
        Table::new("purchase_order_line")
            .remarks("Line items in purchase orders")
            .columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("purchase_order_id", "BIGINT")
                    .references("purchase_order", "id")
                    .nullable(false)
                    .indexed(),
                Column::new("product_id", "BIGINT")
                    .references("product", "id")
                    .nullable(false)
                    .indexed(),
                Column::new("quantity", "NUMERIC(14,3)").nullable(false).default_value("0"),
                Column::new("unit_price", "NUMERIC(12,2)").nullable(false).default_value("0.00"),
            ]),
        Table::new("stock_level")
            .remarks("Stock quantities by product and warehouse")
            .columns(vec![
                Column::new("product_id", "BIGINT")
                    .primary_key()
                    .references("product", "id")
                    .nullable(false),
                Column::new("warehouse_id", "BIGINT")
                    .primary_key()
                    .references("warehouse", "id")
                    .nullable(false),
                Column::new("current_qty", "NUMERIC(14,3)").default_value("0"),
                Column::new("reserved_qty", "NUMERIC(14,3)").default_value("0"),
                Column::new("alert_qty", "NUMERIC(14,3)").default_value("0"),
            ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_unique() {
        let tables = tables();
        let mut names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), tables.len());
    }

    #[test]
    fn every_foreign_key_targets_a_declared_table() {
        let tables = tables();
        for table in &tables {
            for col in &table.columns {
                if let Some(fk) = &col.foreign_key {
                    assert!(
                        tables.iter().any(|t| t.name == fk.table),
                        "{}.{} references unknown table {}",
                        table.name,
                        col.name,
                        fk.table
                    );
                }
            }
        }
    }

    #[test]
    fn catalog_includes_a_composite_key_table() {
        let tables = tables();
        assert!(tables
            .iter()
            .any(|t| t.primary_key_columns().count() > 1));
    }
}
