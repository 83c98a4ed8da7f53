//! Primary-key shape resolution.
//!
//! The cardinality of a table's primary-key column set is the pivotal branch
//! every generator must honor identically: zero columns fall back to an
//! implied surrogate identifier, one column uses that column's mapped scalar
//! type, and more than one synthesizes an `<Entity>Id` aggregate.

use crate::naming::{java_type, to_camel_case};
use crate::schema::{Column, Table};

/// Shape of a table's primary key.
///
/// `ImpliedDefault` is an explicit, named policy rather than a silent
/// fallback so callers (and tests) can distinguish "author declared no
/// primary key" from "engine guessed a surrogate identifier".
#[derive(Debug, Clone, PartialEq)]
pub enum KeyShape<'a> {
    /// No column is marked as primary key; a surrogate numeric identifier is
    /// assumed downstream.
    ImpliedDefault,
    /// Exactly one primary-key column.
    Single(&'a Column),
    /// More than one primary-key column, in declaration order.
    Composite(Vec<&'a Column>),
}

impl<'a> KeyShape<'a> {
    pub fn of(table: &'a Table) -> Self {
        let pk: Vec<&Column> = table.primary_key_columns().collect();
        match pk.len() {
            0 => KeyShape::ImpliedDefault,
            1 => KeyShape::Single(pk[0]),
            _ => KeyShape::Composite(pk),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, KeyShape::Composite(_))
    }
}

/// The identifier contract all generators for one table agree on.
///
/// Changelog identity clause, entity identity field, repository identifier
/// type, service identifier parameter and controller path shape all read
/// from this one struct; no generator may re-derive the key shape on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdBinding {
    /// Java identifier type: the mapped scalar, the synthesized
    /// `<Entity>Id` aggregate, or the `Long` fallback
    pub java_type: String,
    /// Setter used to force an identifier onto an instance
    pub setter: String,
    /// Getter used to read an instance's identifier
    pub getter: String,
    /// True when the identifier is a synthesized aggregate
    pub composite: bool,
    /// True when the engine guessed the identifier (no declared key)
    pub implied: bool,
}

impl IdBinding {
    /// Conservative default used when a referenced table cannot be resolved:
    /// assume a single numeric identifier rather than raising.
    pub fn implied_default() -> Self {
        Self {
            java_type: "Long".to_string(),
            setter: "setId".to_string(),
            getter: "getId".to_string(),
            composite: false,
            implied: true,
        }
    }

    pub fn of(table: &Table) -> Self {
        match KeyShape::of(table) {
            KeyShape::ImpliedDefault => Self::implied_default(),
            KeyShape::Single(pk) => {
                let camel = to_camel_case(&pk.name);
                Self {
                    java_type: java_type(&pk.sql_type).to_string(),
                    setter: format!("set{camel}"),
                    getter: format!("get{camel}"),
                    composite: false,
                    implied: false,
                }
            }
            KeyShape::Composite(_) => Self {
                java_type: format!("{}Id", to_camel_case(&table.name)),
                setter: "setId".to_string(),
                getter: "getId".to_string(),
                composite: true,
                implied: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_declared_key_is_implied_default() {
        let table = Table::new("audit_log").columns(vec![Column::new("message", "TEXT")]);
        assert_eq!(KeyShape::of(&table), KeyShape::ImpliedDefault);
        let id = IdBinding::of(&table);
        assert!(id.implied);
        assert_eq!(id.java_type, "Long");
        assert_eq!(id.setter, "setId");
    }

    #[test]
    fn single_key_uses_mapped_scalar_type() {
        let table = Table::new("product").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("sku", "VARCHAR(64)"),
        ]);
        let id = IdBinding::of(&table);
        assert!(!id.composite);
        assert!(!id.implied);
        assert_eq!(id.java_type, "Long");
        assert_eq!(id.setter, "setId");
        assert_eq!(id.getter, "getId");
    }

    #[test]
    fn single_key_setter_follows_column_name() {
        let table = Table::new("tenant")
            .columns(vec![Column::new("tenant_code", "VARCHAR(16)").primary_key()]);
        let id = IdBinding::of(&table);
        assert_eq!(id.java_type, "String");
        assert_eq!(id.setter, "setTenantCode");
    }

    #[test]
    fn composite_key_synthesizes_aggregate() {
        let table = Table::new("stock_level").columns(vec![
            Column::new("product_id", "BIGINT").primary_key(),
            Column::new("warehouse_id", "BIGINT").primary_key(),
        ]);
        let shape = KeyShape::of(&table);
        assert!(shape.is_composite());
        let id = IdBinding::of(&table);
        assert!(id.composite);
        assert_eq!(id.java_type, "StockLevelId");
        assert_eq!(id.setter, "setId");
    }
}
