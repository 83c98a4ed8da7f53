/// Reference from a column to another table's column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Name of the referenced table
    pub table: String,
    /// Name of the referenced column
    pub column: String,
}

/// One table attribute.
///
/// Columns are constructed once as static input and never mutated by the
/// generators; the baseline-normalization pass works on a copy. The tri-state
/// `nullable`/`unique` attributes distinguish an explicit declaration from an
/// unspecified one, which matters both for DDL emission (no constraint block
/// when unspecified) and for backfilling during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Source SQL type, e.g. `VARCHAR(128)` or `NUMERIC(12,2)`
    pub sql_type: String,
    /// Literal or computed default expression
    pub default_value: Option<String>,
    /// True if the column is part of the table's primary key
    pub primary_key: bool,
    /// Reference to another table's column, if this is a foreign key
    pub foreign_key: Option<ForeignKey>,
    /// Hint that a non-unique index should be created
    pub is_index: bool,
    /// Tri-state nullability: declared true/false, or unspecified
    pub nullable: Option<bool>,
    /// Tri-state uniqueness: declared true/false, or unspecified
    pub unique: Option<bool>,
}

impl Column {
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            default_value: None,
            primary_key: false,
            foreign_key: None,
            is_index: false,
            nullable: None,
            unique: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Declare this column as a foreign key. A half-set reference (table
    /// without column) is a caller error and is not representable here.
    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
        });
        self
    }

    pub fn indexed(mut self) -> Self {
        self.is_index = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }
}

/// One entity/relation.
///
/// Column declaration order is semantically meaningful: generated field order
/// follows it everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name, unique across the schema
    pub name: String,
    /// Optional namespace, defaults to `public`
    pub schema_name: Option<String>,
    /// Optional human description, propagated into DDL and entities
    pub remarks: Option<String>,
    /// Ordered column declarations
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema_name: Some("public".to_string()),
            remarks: None,
            columns: Vec::new(),
        }
    }

    pub fn remarks(mut self, remarks: &str) -> Self {
        self.remarks = Some(remarks.to_string());
        self
    }

    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Columns flagged as primary key, in declaration order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_attributes() {
        let col = Column::new("warehouse_id", "BIGINT")
            .references("warehouse", "id")
            .nullable(false)
            .indexed();
        assert_eq!(col.name, "warehouse_id");
        assert_eq!(
            col.foreign_key,
            Some(ForeignKey {
                table: "warehouse".to_string(),
                column: "id".to_string()
            })
        );
        assert_eq!(col.nullable, Some(false));
        assert!(col.is_index);
        assert_eq!(col.unique, None);
    }

    #[test]
    fn table_defaults_to_public_schema() {
        let table = Table::new("product");
        assert_eq!(table.schema_name.as_deref(), Some("public"));
    }

    #[test]
    fn primary_key_columns_keep_declaration_order() {
        let table = Table::new("stock_level").columns(vec![
            Column::new("product_id", "BIGINT").primary_key(),
            Column::new("warehouse_id", "BIGINT").primary_key(),
            Column::new("current_qty", "NUMERIC(14,3)"),
        ]);
        let names: Vec<_> = table.primary_key_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["product_id", "warehouse_id"]);
    }
}
