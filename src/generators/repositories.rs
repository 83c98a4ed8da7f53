//! Repository-contract generation: a shared base contract keyed by the
//! opaque external identifier plus one interface per table with the
//! uniqueness lookups and dependency counters the service layer relies on.

use anyhow::Result;

use crate::config::GeneratorConfig;
use crate::derive::{IdBinding, SchemaIndex};
use crate::naming::{fk_base, is_textual, java_type, to_camel_case, to_lower_camel};
use crate::render::java::{JavaFile, Member, Method, TypeDecl, TypeKind};
use crate::schema::Table;
use crate::generators::write_file;

pub fn generate(config: &GeneratorConfig, tables: &[Table], index: &SchemaIndex<'_>) -> Result<()> {
    let dir = config.package_dir("repository");
    // Overwritten every run so base helpers stay current.
    write_file(&dir.join("BaseRepository.java"), &base_repository(&config.package).render())?;
    for table in tables {
        let file = repository(&config.package, table, index);
        write_file(&dir.join(format!("{}.java", file.decl.name)), &file.render())?;
    }
    Ok(())
}

fn base_repository(package: &str) -> JavaFile {
    JavaFile {
        package: format!("{package}.repository"),
        imports: vec![
            "java.util.Optional".to_string(),
            "java.util.UUID".to_string(),
            "org.springframework.data.jpa.repository.JpaRepository".to_string(),
            "org.springframework.data.jpa.repository.JpaSpecificationExecutor".to_string(),
            "org.springframework.data.repository.NoRepositoryBean".to_string(),
            format!("{package}.entity.BaseEntity"),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec!["@NoRepositoryBean".to_string()],
            kind: TypeKind::Interface,
            name: "BaseRepository<T extends BaseEntity, ID>".to_string(),
            extends: Some("JpaRepository<T, ID>, JpaSpecificationExecutor<T>".to_string()),
            implements: vec![],
            members: vec![
                Member::Method(Method::abstract_sig("Optional<T>", "findByUuid", "UUID uuid")),
                Member::Method(Method::abstract_sig("boolean", "existsByUuid", "UUID uuid")),
                Member::Method(Method::abstract_sig(
                    "boolean",
                    "existsByUuidAndIdNot",
                    "UUID uuid, ID id",
                )),
                Member::Method(Method {
                    annotations: vec![],
                    modifiers: "default".to_string(),
                    ret: "T".to_string(),
                    name: "getRef".to_string(),
                    params: "ID id".to_string(),
                    body: Some(vec!["return getReferenceById(id);".to_string()]),
                }),
            ],
        },
    }
}

fn repository(package: &str, table: &Table, index: &SchemaIndex<'_>) -> JavaFile {
    let entity = to_camel_case(&table.name);
    let id = IdBinding::of(table);
    let spec = index.spec(&table.name);

    let mut imports = vec![format!("{package}.entity.{entity}")];
    if id.composite {
        imports.push(format!("{package}.entity.{}", id.java_type));
    }
    let mut members: Vec<Member> = Vec::new();

    for col_name in &spec.unique_fields {
        let fk = spec.foreign_keys.iter().find(|fk| &fk.column == col_name);
        match fk {
            Some(fk) => {
                // A reference to a composite-key parent has no scalar to
                // query by; the by-value methods are deliberately absent and
                // callers fall back to the parent's own composite lookup.
                if !index.parent_is_single(&fk.ref_table) {
                    continue;
                }
                let parent_id = index.parent_id(&fk.ref_table);
                let assoc = to_camel_case(fk_base(col_name));
                let param = to_lower_camel(&format!("{}_id", fk_base(col_name)));
                members.push(Member::Method(Method::abstract_sig(
                    "boolean",
                    &format!("existsBy{assoc}Id"),
                    &format!("{} {param}", parent_id.java_type),
                )));
                members.push(Member::Method(Method::abstract_sig(
                    "boolean",
                    &format!("existsBy{assoc}IdAndIdNot"),
                    &format!("{} {param}, {} id", parent_id.java_type, id.java_type),
                )));
                members.push(Member::Method(Method::abstract_sig(
                    &format!("java.util.Optional<{entity}>"),
                    &format!("findBy{assoc}Id"),
                    &format!("{} {param}", parent_id.java_type),
                )));
            }
            None => {
                let col = match table.column(col_name) {
                    Some(col) => col,
                    None => continue,
                };
                let field_ty = java_type(&col.sql_type);
                let camel = to_camel_case(col_name);
                let param = to_lower_camel(col_name);
                members.push(Member::Method(Method::abstract_sig(
                    "boolean",
                    &format!("existsBy{camel}"),
                    &format!("{field_ty} {param}"),
                )));
                members.push(Member::Method(Method::abstract_sig(
                    "boolean",
                    &format!("existsBy{camel}AndIdNot"),
                    &format!("{field_ty} {param}, {} id", id.java_type),
                )));
                let finder = if is_textual(&col.sql_type) {
                    format!("findBy{camel}IgnoreCase")
                } else {
                    format!("findBy{camel}")
                };
                members.push(Member::Method(Method::abstract_sig(
                    &format!("java.util.Optional<{entity}>"),
                    &finder,
                    &format!("{field_ty} {param}"),
                )));
            }
        }
    }

    // Dependency counters backing the service layer's delete guards.
    for fk in &spec.foreign_keys {
        let parent_id = index.parent_id(&fk.ref_table);
        if parent_id.composite {
            let import = format!("{package}.entity.{}", parent_id.java_type);
            if !imports.contains(&import) {
                imports.push(import);
            }
        }
        let assoc = to_camel_case(fk_base(&fk.column));
        let param = to_lower_camel(&format!("{}_id", fk_base(&fk.column)));
        members.push(Member::Method(Method::abstract_sig(
            "long",
            &format!("countBy{assoc}Id"),
            &format!("{} {param}", parent_id.java_type),
        )));
    }

    JavaFile {
        package: format!("{package}.repository"),
        imports,
        banner: id.implied.then(|| {
            format!(
                "No primary key declared for table '{}'; falling back to a Long identifier.",
                table.name
            )
        }),
        decl: TypeDecl {
            annotations: vec![],
            kind: TypeKind::Interface,
            name: format!("{entity}Repository"),
            extends: Some(format!("BaseRepository<{entity}, {}>", id.java_type)),
            implements: vec![],
            members,
        },
    }
}
