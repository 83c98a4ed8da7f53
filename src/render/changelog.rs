//! Changelog document model.
//!
//! The migration generator builds [`ChangeSet`] values from derived schema
//! facts; lowering to XML happens here, against the element tree in
//! [`super::xml`]. The XML dialect is the Liquibase changelog format the
//! generated application's migration runner consumes.

use super::xml::XmlElement;

const CHANGELOG_NS: &str = "http://www.liquibase.org/xml/ns/dbchangelog";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.liquibase.org/xml/ns/dbchangelog http://www.liquibase.org/xml/ns/dbchangelog/dbchangelog-4.31.xsd";

/// One changeset: an identified, authored unit of schema change.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub id: String,
    pub author: String,
    pub changes: Vec<Change>,
}

/// A single schema-change operation.
#[derive(Debug, Clone)]
pub enum Change {
    CreateTable {
        table: String,
        schema: Option<String>,
        remarks: Option<String>,
        columns: Vec<ColumnDdl>,
    },
    AddAutoIncrement {
        table: String,
        column: String,
        column_type: String,
    },
    AddUniqueConstraint {
        table: String,
        column: String,
        name: String,
    },
    CreateIndex {
        table: String,
        name: String,
        unique: bool,
        columns: Vec<String>,
    },
    AddForeignKey {
        name: String,
        base_table: String,
        base_column: String,
        ref_table: String,
        ref_column: String,
    },
    Sql(String),
}

/// Column definition inside a `CreateTable` change.
#[derive(Debug, Clone)]
pub struct ColumnDdl {
    pub name: String,
    pub sql_type: String,
    /// Default expression plus whether it is computed (function/expression)
    /// or a plain literal; the distinction selects the DDL attribute.
    pub default: Option<(String, bool)>,
    pub constraints: Option<DdlConstraints>,
}

/// Constraint block of a column definition.
#[derive(Debug, Clone, Default)]
pub struct DdlConstraints {
    pub nullable: Option<bool>,
    pub primary_key: bool,
    pub primary_key_name: Option<String>,
    pub unique: bool,
}

fn changelog_root() -> XmlElement {
    XmlElement::new("databaseChangeLog")
        .attr("xmlns", CHANGELOG_NS)
        .attr("xmlns:xsi", XSI_NS)
        .attr("xsi:schemaLocation", SCHEMA_LOCATION)
}

/// Render one changeset as a standalone changelog document.
pub fn changeset_document(changeset: &ChangeSet) -> String {
    let mut cs = XmlElement::new("changeSet")
        .attr("id", &changeset.id)
        .attr("author", &changeset.author);
    for change in &changeset.changes {
        cs.push(change_element(change));
    }
    changelog_root().child(cs).to_document()
}

/// Render the master manifest referencing `includes`, in order.
pub fn master_document(includes: &[String]) -> String {
    let mut root = changelog_root();
    for file in includes {
        root.push(
            XmlElement::new("include")
                .attr("file", file)
                .attr("relativeToChangelogFile", "true"),
        );
    }
    root.to_document()
}

fn change_element(change: &Change) -> XmlElement {
    match change {
        Change::CreateTable {
            table,
            schema,
            remarks,
            columns,
        } => {
            let mut el = XmlElement::new("createTable").attr("tableName", table);
            if let Some(schema) = schema {
                el = el.attr("schemaName", schema);
            }
            if let Some(remarks) = remarks {
                el = el.attr("remarks", remarks);
            }
            for column in columns {
                el.push(column_element(column));
            }
            el
        }
        Change::AddAutoIncrement {
            table,
            column,
            column_type,
        } => XmlElement::new("addAutoIncrement")
            .attr("tableName", table)
            .attr("columnName", column)
            .attr("columnDataType", column_type)
            .attr("incrementBy", "1")
            .attr("startWith", "1"),
        Change::AddUniqueConstraint {
            table,
            column,
            name,
        } => XmlElement::new("addUniqueConstraint")
            .attr("tableName", table)
            .attr("columnNames", column)
            .attr("constraintName", name),
        Change::CreateIndex {
            table,
            name,
            unique,
            columns,
        } => {
            let mut el = XmlElement::new("createIndex")
                .attr("tableName", table)
                .attr("indexName", name);
            if *unique {
                el = el.attr("unique", "true");
            }
            for column in columns {
                el.push(XmlElement::new("column").attr("name", column));
            }
            el
        }
        Change::AddForeignKey {
            name,
            base_table,
            base_column,
            ref_table,
            ref_column,
        } => XmlElement::new("addForeignKeyConstraint")
            .attr("constraintName", name)
            .attr("baseTableName", base_table)
            .attr("baseColumnNames", base_column)
            .attr("referencedTableName", ref_table)
            .attr("referencedColumnNames", ref_column),
        Change::Sql(sql) => XmlElement::new("sql").text(sql),
    }
}

fn column_element(column: &ColumnDdl) -> XmlElement {
    let mut el = XmlElement::new("column")
        .attr("name", &column.name)
        .attr("type", &column.sql_type);
    if let Some((value, computed)) = &column.default {
        if *computed {
            el = el.attr("defaultValueComputed", value);
        } else {
            el = el.attr("defaultValue", value);
        }
    }
    if let Some(constraints) = &column.constraints {
        let mut cons = XmlElement::new("constraints");
        if let Some(nullable) = constraints.nullable {
            cons = cons.attr("nullable", if nullable { "true" } else { "false" });
        }
        if constraints.primary_key {
            cons = cons.attr("primaryKey", "true");
            if let Some(pk_name) = &constraints.primary_key_name {
                cons = cons.attr("primaryKeyName", pk_name);
            }
        }
        if constraints.unique {
            cons = cons.attr("unique", "true");
        }
        el.push(cons);
    }
    el
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changeset_document_wraps_changes() {
        let doc = changeset_document(&ChangeSet {
            id: "001-product-table".to_string(),
            author: "crudgen".to_string(),
            changes: vec![Change::CreateTable {
                table: "product".to_string(),
                schema: Some("public".to_string()),
                remarks: None,
                columns: vec![ColumnDdl {
                    name: "id".to_string(),
                    sql_type: "BIGINT".to_string(),
                    default: None,
                    constraints: Some(DdlConstraints {
                        primary_key: true,
                        primary_key_name: Some("pk_product".to_string()),
                        ..DdlConstraints::default()
                    }),
                }],
            }],
        });
        assert!(doc.contains("<changeSet id=\"001-product-table\" author=\"crudgen\">"));
        assert!(doc.contains("<createTable tableName=\"product\" schemaName=\"public\">"));
        assert!(doc.contains("primaryKey=\"true\" primaryKeyName=\"pk_product\""));
    }

    #[test]
    fn computed_defaults_use_their_own_attribute() {
        let column = ColumnDdl {
            name: "uuid".to_string(),
            sql_type: "UUID".to_string(),
            default: Some(("gen_random_uuid()".to_string(), true)),
            constraints: None,
        };
        let doc = changeset_document(&ChangeSet {
            id: "x".to_string(),
            author: "a".to_string(),
            changes: vec![Change::CreateTable {
                table: "t".to_string(),
                schema: None,
                remarks: None,
                columns: vec![column],
            }],
        });
        assert!(doc.contains("defaultValueComputed=\"gen_random_uuid()\""));
        assert!(!doc.contains("defaultValue=\"gen_random_uuid()\""));
    }

    #[test]
    fn master_document_preserves_include_order() {
        let doc = master_document(&[
            "v_1_0_0/000-postgres-extensions.xml".to_string(),
            "v_1_0_0/001-product-table.xml".to_string(),
        ]);
        let ext = doc.find("000-postgres-extensions").expect("extensions include");
        let table = doc.find("001-product-table").expect("table include");
        assert!(ext < table);
    }
}
