//! Transfer-object generation: a shared audit DTO, one DTO per table with
//! bean-validation annotations derived from column metadata, and an
//! object-shaped identifier DTO for composite-key tables.

use anyhow::Result;

use crate::config::GeneratorConfig;
use crate::derive::KeyShape;
use crate::naming::{java_type, sql_type_attrs, to_camel_case, to_lower_camel};
use crate::render::java::{Field, JavaFile, Member, TypeDecl, TypeKind};
use crate::schema::{Column, Table};
use crate::generators::{write_file, write_file_if_absent};

use super::entities::BASE_AUDIT_COLUMNS;

pub fn generate(config: &GeneratorConfig, tables: &[Table]) -> Result<()> {
    let dir = config.package_dir("dto");
    write_file_if_absent(&dir.join("BaseDto.java"), &base_dto(&config.package).render())?;
    for table in tables {
        if let KeyShape::Composite(pk_cols) = KeyShape::of(table) {
            let id_file = id_dto(&config.package, table, &pk_cols);
            write_file(&dir.join(format!("{}.java", id_file.decl.name)), &id_file.render())?;
        }
        let file = dto(&config.package, table);
        write_file(&dir.join(format!("{}.java", file.decl.name)), &file.render())?;
    }
    Ok(())
}

fn looks_like_email(field_name: &str) -> bool {
    field_name.to_lowercase().contains("email")
}

fn looks_non_negative(field_name: &str) -> bool {
    let n = field_name.to_lowercase();
    ["qty", "quantity", "price", "total", "amount", "tax", "stock"]
        .iter()
        .any(|k| n.contains(k))
}

/// Bean-validation annotations derived from the column declaration plus two
/// name heuristics (email fields, non-negative quantity-like fields).
fn validation_annotations(col: &Column, field_name: &str) -> Vec<String> {
    let mut annotations = Vec::new();
    if col.nullable == Some(false) {
        annotations.push("@NotNull".to_string());
    }
    let attrs = sql_type_attrs(&col.sql_type);
    if let Some(length) = attrs.length {
        annotations.push(format!("@Size(max = {length})"));
    }
    if let Some(precision) = attrs.precision {
        let scale = attrs.scale.unwrap_or(0);
        let integer = precision.saturating_sub(scale);
        annotations.push(format!("@Digits(integer = {integer}, fraction = {scale})"));
        if looks_non_negative(field_name) {
            annotations.push("@PositiveOrZero".to_string());
        }
    }
    if looks_like_email(field_name) {
        annotations.push("@Email".to_string());
    }
    annotations
}

fn base_dto(package: &str) -> JavaFile {
    let field = |ty: &str, name: &str| {
        Member::Field(Field {
            annotations: vec![],
            modifiers: "private".to_string(),
            ty: ty.to_string(),
            name: name.to_string(),
            init: None,
        })
    };
    JavaFile {
        package: format!("{package}.dto"),
        imports: vec![
            "lombok.*".to_string(),
            "lombok.experimental.SuperBuilder".to_string(),
            "com.fasterxml.jackson.annotation.JsonInclude".to_string(),
            "com.fasterxml.jackson.annotation.JsonInclude.Include".to_string(),
            "java.util.UUID".to_string(),
            "java.time.OffsetDateTime".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "@Data".to_string(),
                "@NoArgsConstructor".to_string(),
                "@AllArgsConstructor".to_string(),
                "@SuperBuilder(toBuilder = true)".to_string(),
                "@JsonInclude(Include.NON_NULL)".to_string(),
            ],
            kind: TypeKind::Class,
            name: "BaseDto".to_string(),
            extends: None,
            implements: vec![],
            members: vec![
                field("UUID", "uuid"),
                field("OffsetDateTime", "createdAt"),
                field("OffsetDateTime", "updatedAt"),
                field("Long", "version"),
            ],
        },
    }
}

/// Object-shaped identifier DTO for a composite-key table.
fn id_dto(package: &str, table: &Table, pk_cols: &[&Column]) -> JavaFile {
    let members = pk_cols
        .iter()
        .map(|&col| {
            let name = to_lower_camel(&col.name);
            Member::Field(Field {
                annotations: validation_annotations(col, &name),
                modifiers: "private".to_string(),
                ty: java_type(&col.sql_type).to_string(),
                name,
                init: None,
            })
        })
        .collect();
    JavaFile {
        package: format!("{package}.dto"),
        imports: vec![
            "lombok.*".to_string(),
            "jakarta.validation.constraints.*".to_string(),
            "java.io.Serializable".to_string(),
            "java.math.*".to_string(),
            "java.time.*".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "@Data".to_string(),
                "@NoArgsConstructor".to_string(),
                "@AllArgsConstructor".to_string(),
                "@Builder".to_string(),
            ],
            kind: TypeKind::Class,
            name: format!("{}IdDto", to_camel_case(&table.name)),
            extends: None,
            implements: vec!["Serializable".to_string()],
            members,
        },
    }
}

fn dto(package: &str, table: &Table) -> JavaFile {
    let name = to_camel_case(&table.name);
    let shape = KeyShape::of(table);
    let mut members = Vec::new();

    // Identifier first, then business columns in declaration order.
    match shape {
        KeyShape::Composite(_) => {
            members.push(Member::Field(Field {
                annotations: vec![],
                modifiers: "private".to_string(),
                ty: format!("{name}IdDto"),
                name: "id".to_string(),
                init: None,
            }));
        }
        KeyShape::Single(pk) => {
            let field_name = to_lower_camel(&pk.name);
            members.push(Member::Field(Field {
                annotations: validation_annotations(pk, &field_name),
                modifiers: "private".to_string(),
                ty: java_type(&pk.sql_type).to_string(),
                name: field_name,
                init: None,
            }));
        }
        KeyShape::ImpliedDefault => {}
    }

    for col in &table.columns {
        if col.primary_key || BASE_AUDIT_COLUMNS.contains(&col.name.as_str()) {
            continue;
        }
        let field_name = to_lower_camel(&col.name);
        members.push(Member::Field(Field {
            annotations: validation_annotations(col, &field_name),
            modifiers: "private".to_string(),
            ty: java_type(&col.sql_type).to_string(),
            name: field_name,
            init: None,
        }));
    }

    JavaFile {
        package: format!("{package}.dto"),
        imports: vec![
            "lombok.*".to_string(),
            "lombok.experimental.SuperBuilder".to_string(),
            "com.fasterxml.jackson.annotation.JsonInclude".to_string(),
            "com.fasterxml.jackson.annotation.JsonInclude.Include".to_string(),
            "jakarta.validation.constraints.*".to_string(),
            "java.math.*".to_string(),
            "java.time.*".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "@Data".to_string(),
                "@NoArgsConstructor".to_string(),
                "@AllArgsConstructor".to_string(),
                "@EqualsAndHashCode(callSuper = true)".to_string(),
                "@SuperBuilder(toBuilder = true)".to_string(),
                "@JsonInclude(Include.NON_NULL)".to_string(),
            ],
            kind: TypeKind::Class,
            name: format!("{name}Dto"),
            extends: Some("BaseDto".to_string()),
            implements: vec![],
            members,
        },
    }
}
