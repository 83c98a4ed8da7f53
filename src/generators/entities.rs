//! Persistence-entity generation: one shared identity/audit supertype, one
//! embedded identifier aggregate per composite-key table, and one entity per
//! table with relationship fields for foreign keys.

use anyhow::Result;

use crate::config::GeneratorConfig;
use crate::derive::KeyShape;
use crate::naming::{
    escape_java, fk_field_name, java_type, sql_type_attrs, to_camel_case, to_lower_camel,
};
use crate::render::java::{Field, JavaFile, Member, Method, TypeDecl, TypeKind};
use crate::schema::{Column, Table};
use crate::generators::{write_file, write_file_if_absent};

/// Columns carried by the audit supertype and therefore skipped on concrete
/// entities.
pub(crate) const BASE_AUDIT_COLUMNS: [&str; 4] = ["uuid", "created_at", "updated_at", "version"];

pub fn generate(config: &GeneratorConfig, tables: &[Table]) -> Result<()> {
    let dir = config.package_dir("entity");
    write_file_if_absent(&dir.join("BaseEntity.java"), &base_entity(&config.package).render())?;
    for table in tables {
        if let KeyShape::Composite(pk_cols) = KeyShape::of(table) {
            let id_file = embedded_id(&config.package, table, &pk_cols);
            write_file(&dir.join(format!("{}.java", id_file.decl.name)), &id_file.render())?;
        }
        let entity_file = entity(&config.package, table);
        write_file(
            &dir.join(format!("{}.java", entity_file.decl.name)),
            &entity_file.render(),
        )?;
    }
    Ok(())
}

/// `@Column` annotation with nullability, uniqueness and size attributes
/// taken from the declaration.
fn column_annotation(col: &Column) -> String {
    let attrs = sql_type_attrs(&col.sql_type);
    let mut parts = vec![format!("name = \"{}\"", col.name)];
    if let Some(nullable) = col.nullable {
        parts.push(format!("nullable = {nullable}"));
    }
    if let Some(unique) = col.unique {
        parts.push(format!("unique = {unique}"));
    }
    if let Some(length) = attrs.length {
        parts.push(format!("length = {length}"));
    }
    if let Some(precision) = attrs.precision {
        parts.push(format!("precision = {precision}"));
    }
    if let Some(scale) = attrs.scale {
        parts.push(format!("scale = {scale}"));
    }
    format!("@Column({})", parts.join(", "))
}

/// Identity generation strategy for numeric single keys.
fn generation_strategy(java_ty: &str) -> Option<String> {
    matches!(java_ty, "Long" | "Integer" | "Short")
        .then(|| "@GeneratedValue(strategy = GenerationType.IDENTITY)".to_string())
}

fn base_entity(package: &str) -> JavaFile {
    let field = |annotations: Vec<String>, ty: &str, name: &str, init: Option<&str>| {
        Member::Field(Field {
            annotations,
            modifiers: "private".to_string(),
            ty: ty.to_string(),
            name: name.to_string(),
            init: init.map(str::to_string),
        })
    };
    JavaFile {
        package: format!("{package}.entity"),
        imports: vec![
            "jakarta.persistence.*".to_string(),
            "lombok.Getter".to_string(),
            "lombok.Setter".to_string(),
            "org.hibernate.annotations.NaturalId".to_string(),
            "org.hibernate.annotations.CreationTimestamp".to_string(),
            "org.hibernate.annotations.UpdateTimestamp".to_string(),
            "java.time.OffsetDateTime".to_string(),
            "java.util.UUID".to_string(),
            "java.util.Objects".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "@MappedSuperclass".to_string(),
                "@Getter".to_string(),
                "@Setter".to_string(),
            ],
            kind: TypeKind::AbstractClass,
            name: "BaseEntity".to_string(),
            extends: None,
            implements: vec!["java.io.Serializable".to_string()],
            members: vec![
                field(
                    vec![
                        "@NaturalId".to_string(),
                        "@Column(name = \"uuid\", nullable = false, updatable = false, unique = true, columnDefinition = \"UUID\")".to_string(),
                    ],
                    "UUID",
                    "uuid",
                    None,
                ),
                field(
                    vec![
                        "@CreationTimestamp".to_string(),
                        "@Column(name = \"created_at\", nullable = false, updatable = false)".to_string(),
                    ],
                    "OffsetDateTime",
                    "createdAt",
                    None,
                ),
                field(
                    vec![
                        "@UpdateTimestamp".to_string(),
                        "@Column(name = \"updated_at\", nullable = false)".to_string(),
                    ],
                    "OffsetDateTime",
                    "updatedAt",
                    None,
                ),
                field(
                    vec![
                        "@Version".to_string(),
                        "@Column(name = \"version\", nullable = false)".to_string(),
                    ],
                    "Long",
                    "version",
                    None,
                ),
                field(
                    vec!["@Column(name = \"deleted\", nullable = false)".to_string()],
                    "boolean",
                    "deleted",
                    Some("false"),
                ),
                field(
                    vec!["@Column(name = \"deleted_at\")".to_string()],
                    "OffsetDateTime",
                    "deletedAt",
                    None,
                ),
                Member::Method(Method {
                    annotations: vec!["@PrePersist".to_string()],
                    modifiers: "protected".to_string(),
                    ret: "void".to_string(),
                    name: "onPrePersist".to_string(),
                    params: String::new(),
                    body: Some(vec!["if (this.uuid == null) this.uuid = UUID.randomUUID();".to_string()]),
                }),
                Member::Method(Method {
                    annotations: vec![],
                    modifiers: "public".to_string(),
                    ret: "void".to_string(),
                    name: "softDelete".to_string(),
                    params: String::new(),
                    body: Some(vec![
                        "this.deleted = true;".to_string(),
                        "this.deletedAt = OffsetDateTime.now();".to_string(),
                    ]),
                }),
                Member::Method(Method {
                    annotations: vec!["@Override".to_string()],
                    modifiers: "public".to_string(),
                    ret: "boolean".to_string(),
                    name: "equals".to_string(),
                    params: "Object o".to_string(),
                    body: Some(vec![
                        "if (this == o) return true;".to_string(),
                        "if (!(o instanceof BaseEntity that)) return false;".to_string(),
                        "return uuid != null && uuid.equals(that.getUuid());".to_string(),
                    ]),
                }),
                Member::Method(Method {
                    annotations: vec!["@Override".to_string()],
                    modifiers: "public".to_string(),
                    ret: "int".to_string(),
                    name: "hashCode".to_string(),
                    params: String::new(),
                    body: Some(vec!["return Objects.hash(uuid);".to_string()]),
                }),
            ],
        },
    }
}

/// Embedded identifier aggregate for a composite-key table, containing
/// exactly the primary-key columns in declaration order.
fn embedded_id(package: &str, table: &Table, pk_cols: &[&Column]) -> JavaFile {
    let members = pk_cols
        .iter()
        .map(|&col| {
            Member::Field(Field {
                annotations: vec![column_annotation(col)],
                modifiers: "private".to_string(),
                ty: java_type(&col.sql_type).to_string(),
                name: to_lower_camel(&col.name),
                init: None,
            })
        })
        .collect();
    JavaFile {
        package: format!("{package}.entity"),
        imports: vec!["jakarta.persistence.*".to_string(), "lombok.*".to_string()],
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "@Embeddable".to_string(),
                "@Getter".to_string(),
                "@Setter".to_string(),
                "@NoArgsConstructor".to_string(),
                "@AllArgsConstructor".to_string(),
                "@Builder".to_string(),
                "@EqualsAndHashCode".to_string(),
            ],
            kind: TypeKind::Class,
            name: format!("{}Id", to_camel_case(&table.name)),
            extends: None,
            implements: vec!["java.io.Serializable".to_string()],
            members,
        },
    }
}

fn table_annotation(table: &Table) -> String {
    let mut indexes = vec![format!(
        "        @Index(name = \"idx_{}_uuid\", columnList = \"uuid\")",
        table.name
    )];
    for col in &table.columns {
        if col.is_index {
            indexes.push(format!(
                "        @Index(name = \"idx_{}_{}\", columnList = \"{}\")",
                table.name, col.name, col.name
            ));
        }
    }
    let schema = table
        .schema_name
        .as_ref()
        .map(|s| format!(",\n    schema = \"{s}\""))
        .unwrap_or_default();
    format!(
        "@Table(\n    name = \"{name}\"{schema},\n    uniqueConstraints = {{\n        @UniqueConstraint(name = \"uk_{name}_uuid\", columnNames = {{\"uuid\"}})\n    }},\n    indexes = {{\n{indexes}\n    }}\n)",
        name = table.name,
        schema = schema,
        indexes = indexes.join(",\n"),
    )
}

fn entity(package: &str, table: &Table) -> JavaFile {
    let entity_name = to_camel_case(&table.name);
    let shape = KeyShape::of(table);
    let composite = shape.is_composite();
    let mut members = Vec::new();

    if composite {
        members.push(Member::Field(Field {
            annotations: vec!["@EmbeddedId".to_string()],
            modifiers: "private".to_string(),
            ty: format!("{entity_name}Id"),
            name: "id".to_string(),
            init: None,
        }));
    }

    for col in &table.columns {
        if BASE_AUDIT_COLUMNS.contains(&col.name.as_str()) {
            continue;
        }

        if let Some(fk) = &col.foreign_key {
            // Relationship reference instead of a raw scalar; when the FK is
            // part of the composite key it shares identity with that key part.
            let mut annotations = Vec::new();
            if col.primary_key {
                annotations.push(format!("@MapsId(\"{}\")", to_lower_camel(&col.name)));
            }
            annotations.push("@ManyToOne(fetch = FetchType.LAZY)".to_string());
            annotations.push(format!(
                "@JoinColumn(name = \"{}\", nullable = {})",
                col.name,
                col.nullable.unwrap_or(true)
            ));
            members.push(Member::Field(Field {
                annotations,
                modifiers: "private".to_string(),
                ty: to_camel_case(&fk.table),
                name: fk_field_name(&col.name),
                init: None,
            }));
            continue;
        }

        if col.primary_key && composite {
            // Plain key parts live inside the embedded id.
            continue;
        }

        let java_ty = java_type(&col.sql_type);
        let mut annotations = Vec::new();
        if col.primary_key {
            annotations.push("@Id".to_string());
            if let Some(generated) = generation_strategy(java_ty) {
                annotations.push(generated);
            }
        }
        annotations.push(column_annotation(col));
        members.push(Member::Field(Field {
            annotations,
            modifiers: "private".to_string(),
            ty: java_ty.to_string(),
            name: to_lower_camel(&col.name),
            init: None,
        }));
    }

    let mut annotations = vec![
        "@Getter".to_string(),
        "@Setter".to_string(),
        "@NoArgsConstructor".to_string(),
        "@AllArgsConstructor".to_string(),
        "@Builder".to_string(),
        "@Entity".to_string(),
        format!(
            "@SQLDelete(sql = \"UPDATE {} SET deleted = true, deleted_at = now() WHERE uuid = ?\")",
            table.name
        ),
        "@Where(clause = \"deleted = false\")".to_string(),
        table_annotation(table),
    ];
    if let Some(remarks) = &table.remarks {
        annotations.insert(0, format!("@Comment(\"{}\")", escape_java(remarks)));
    }

    JavaFile {
        package: format!("{package}.entity"),
        imports: vec![
            "jakarta.persistence.*".to_string(),
            "jakarta.persistence.Index".to_string(),
            "lombok.*".to_string(),
            "org.hibernate.annotations.Comment".to_string(),
            "org.hibernate.annotations.SQLDelete".to_string(),
            "org.hibernate.annotations.Where".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations,
            kind: TypeKind::Class,
            name: entity_name,
            extends: Some("BaseEntity".to_string()),
            implements: vec![],
            members,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Table {
        Table::new("product").remarks("Product catalog").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("sku", "VARCHAR(64)").nullable(false).unique(),
            Column::new("category_id", "BIGINT")
                .references("category", "id")
                .nullable(true)
                .indexed(),
        ])
    }

    fn stock_level() -> Table {
        Table::new("stock_level").columns(vec![
            Column::new("product_id", "BIGINT")
                .primary_key()
                .references("product", "id")
                .nullable(false),
            Column::new("warehouse_id", "BIGINT")
                .primary_key()
                .references("warehouse", "id")
                .nullable(false),
            Column::new("current_qty", "NUMERIC(14,3)").default_value("0"),
        ])
    }

    #[test]
    fn single_key_entity_has_identity_field() {
        let source = entity("com.example.app", &product()).render();
        assert!(source.contains("public class Product extends BaseEntity {"));
        assert!(source.contains("@Id"));
        assert!(source.contains("@GeneratedValue(strategy = GenerationType.IDENTITY)"));
        assert!(source.contains("@Column(name = \"sku\", nullable = false, unique = true, length = 64)"));
        assert!(source.contains("@SQLDelete(sql = \"UPDATE product SET deleted = true"));
    }

    #[test]
    fn foreign_key_becomes_lazy_relation() {
        let source = entity("com.example.app", &product()).render();
        assert!(source.contains("@ManyToOne(fetch = FetchType.LAZY)"));
        assert!(source.contains("@JoinColumn(name = \"category_id\", nullable = true)"));
        assert!(source.contains("private Category category;"));
        assert!(!source.contains("private Long categoryId;"));
    }

    #[test]
    fn composite_key_uses_embedded_aggregate() {
        let table = stock_level();
        let source = entity("com.example.app", &table).render();
        assert!(source.contains("@EmbeddedId"));
        assert!(source.contains("private StockLevelId id;"));
        assert!(source.contains("@MapsId(\"productId\")"));
        assert!(source.contains("@MapsId(\"warehouseId\")"));

        let pk_cols: Vec<&Column> = table.primary_key_columns().collect();
        let id_source = embedded_id("com.example.app", &table, &pk_cols).render();
        assert!(id_source.contains("@Embeddable"));
        assert!(id_source.contains("public class StockLevelId implements java.io.Serializable {"));
        assert!(id_source.contains("private Long productId;"));
        assert!(id_source.contains("private Long warehouseId;"));
    }

    #[test]
    fn base_entity_soft_delete_sets_flag_and_timestamp_together() {
        let source = base_entity("com.example.app").render();
        assert!(source.contains("public void softDelete() {"));
        assert!(source.contains("this.deleted = true;"));
        assert!(source.contains("this.deletedAt = OffsetDateTime.now();"));
    }
}
