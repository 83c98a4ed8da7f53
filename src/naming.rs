//! Naming conventions and type mapping shared by every generator.
//!
//! These are deliberately simple, deterministic transforms: snake_case table
//! and column names on the schema side, PascalCase/lowerCamelCase identifiers
//! and kebab-case URL segments on the generated side, and a fixed SQL-type to
//! Java-type table.

use once_cell::sync::Lazy;
use regex::Regex;

/// Convert a snake_case (or kebab/space separated) name to PascalCase.
///
/// ```
/// assert_eq!(crudgen::naming::to_camel_case("purchase_order"), "PurchaseOrder");
/// ```
pub fn to_camel_case(s: &str) -> String {
    s.split(['_', '-', ' '])
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a snake_case name to lowerCamelCase.
pub fn to_lower_camel(s: &str) -> String {
    let camel = to_camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => camel,
    }
}

/// Lowercase the first character of an already-cased identifier.
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// URL path segment for a table name: `purchase_order` → `purchase-order`.
pub fn path_segment(table_name: &str) -> String {
    table_name.replace('_', "-")
}

/// Base association name of a foreign-key column: `product_id` → `product`.
pub fn fk_base(column_name: &str) -> &str {
    column_name.strip_suffix("_id").unwrap_or(column_name)
}

/// Relationship field name of a foreign-key column: `product_id` → `product`.
pub fn fk_field_name(column_name: &str) -> String {
    to_lower_camel(fk_base(column_name))
}

/// Map a source SQL type to the target Java type.
///
/// Unknown types fall back to `String`, matching the conservative behavior
/// expected of the downstream artifacts.
pub fn java_type(sql_type: &str) -> &'static str {
    let t = sql_type.trim().to_uppercase();
    if t.starts_with("BIGINT") {
        return "Long";
    }
    if t.starts_with("INT") || t.starts_with("INTEGER") || t.starts_with("SMALLINT") {
        return "Integer";
    }
    if t.starts_with("FLOAT") || t.starts_with("DOUBLE PRECISION") {
        return "Double";
    }
    if t.starts_with("NUMERIC") || t.starts_with("DECIMAL") || t.starts_with("REAL") {
        return "java.math.BigDecimal";
    }
    if t.starts_with("BOOLEAN") || t.starts_with("BOOL") {
        return "Boolean";
    }
    if t.starts_with("DATE") {
        return "java.time.LocalDate";
    }
    if t.contains("TIMESTAMP") {
        return if t.contains("TZ") {
            "java.time.OffsetDateTime"
        } else {
            "java.time.LocalDateTime"
        };
    }
    if t.starts_with("TIME") {
        return "java.time.LocalTime";
    }
    if t.starts_with("UUID") {
        return "java.util.UUID";
    }
    if t.starts_with("BYTEA") || t.starts_with("BLOB") {
        return "byte[]";
    }
    "String"
}

/// True when the mapped Java type is textual (drives `IgnoreCase` finders).
pub fn is_textual(sql_type: &str) -> bool {
    java_type(sql_type) == "String"
}

/// Length/precision/scale extracted from a parameterized SQL type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeAttrs {
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

static CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:VARCHAR|CHAR)\((\d+)\)$").expect("char type regex"));
static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:NUMERIC|DECIMAL)\((\d+)(?:,\s*(\d+))?\)$").expect("numeric type regex"));

/// Extract precision/scale/length attributes from a SQL type string.
pub fn sql_type_attrs(sql_type: &str) -> TypeAttrs {
    let s = sql_type.trim().to_uppercase();
    if let Some(caps) = CHAR_RE.captures(&s) {
        return TypeAttrs {
            length: caps[1].parse().ok(),
            ..TypeAttrs::default()
        };
    }
    if let Some(caps) = NUMERIC_RE.captures(&s) {
        return TypeAttrs {
            precision: caps[1].parse().ok(),
            scale: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            ..TypeAttrs::default()
        };
    }
    TypeAttrs::default()
}

/// Escape double quotes for embedding in a Java string or annotation literal.
pub fn escape_java(s: &str) -> String {
    s.replace('"', "\\\"")
}

// Constraint and index names are shared between the changelog generator and
// the error catalog; both must produce the same strings for the name-based
// violation lookup to resolve.

pub fn unique_constraint_name(table: &str, column: &str) -> String {
    format!("uq_{table}_{column}")
}

pub fn foreign_key_constraint_name(table: &str, column: &str, parent: &str) -> String {
    format!("fk_{table}_{column}_{parent}")
}

pub fn not_null_constraint_name(table: &str, column: &str) -> String {
    format!("nn_{table}_{column}")
}

pub fn index_name(table: &str, column: &str) -> String {
    format!("idx_{table}_{column}")
}

pub fn primary_key_name(table: &str) -> String {
    format!("pk_{table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("purchase_order"), "PurchaseOrder");
        assert_eq!(to_camel_case("product"), "Product");
        assert_eq!(to_camel_case("stock-level"), "StockLevel");
    }

    #[test]
    fn test_to_lower_camel() {
        assert_eq!(to_lower_camel("warehouse_id"), "warehouseId");
        assert_eq!(to_lower_camel("sku"), "sku");
    }

    #[test]
    fn test_fk_field_name() {
        assert_eq!(fk_field_name("product_id"), "product");
        assert_eq!(fk_field_name("parent_id"), "parent");
        assert_eq!(fk_field_name("owner"), "owner");
    }

    #[test]
    fn test_java_type() {
        assert_eq!(java_type("BIGINT"), "Long");
        assert_eq!(java_type("VARCHAR(128)"), "String");
        assert_eq!(java_type("NUMERIC(12,2)"), "java.math.BigDecimal");
        assert_eq!(java_type("TIMESTAMPTZ"), "java.time.OffsetDateTime");
        assert_eq!(java_type("TIMESTAMP"), "java.time.LocalDateTime");
        assert_eq!(java_type("UUID"), "java.util.UUID");
        assert_eq!(java_type("BOOLEAN"), "Boolean");
        assert_eq!(java_type("SOMETHING_ODD"), "String");
    }

    #[test]
    fn test_sql_type_attrs() {
        assert_eq!(
            sql_type_attrs("VARCHAR(128)"),
            TypeAttrs {
                length: Some(128),
                ..TypeAttrs::default()
            }
        );
        assert_eq!(
            sql_type_attrs("NUMERIC(12,2)"),
            TypeAttrs {
                precision: Some(12),
                scale: Some(2),
                ..TypeAttrs::default()
            }
        );
        assert_eq!(
            sql_type_attrs("DECIMAL(8)"),
            TypeAttrs {
                precision: Some(8),
                ..TypeAttrs::default()
            }
        );
        assert_eq!(sql_type_attrs("BIGINT"), TypeAttrs::default());
    }

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment("purchase_order_line"), "purchase-order-line");
    }
}
