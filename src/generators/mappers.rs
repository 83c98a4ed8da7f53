//! Object-mapper generation: a shared mapper configuration and audit mapper,
//! plus one mapper per table translating between entities and DTOs.
//!
//! Relationship fields are mapped one-way: entity → DTO flattens the parent
//! reference into its scalar identifier, while DTO → entity ignores the
//! relationship (the service layer binds it through a lazy reference).

use anyhow::Result;

use crate::config::GeneratorConfig;
use crate::derive::{KeyShape, SchemaIndex};
use crate::naming::{fk_field_name, to_camel_case, to_lower_camel};
use crate::render::java::{JavaFile, Member, Method, TypeDecl, TypeKind};
use crate::schema::Table;
use crate::generators::write_file;

pub fn generate(config: &GeneratorConfig, tables: &[Table], index: &SchemaIndex<'_>) -> Result<()> {
    let dir = config.package_dir("mapper");
    write_file(
        &dir.join("BaseMapperConfig.java"),
        &base_mapper_config(&config.package).render(),
    )?;
    write_file(
        &dir.join("BaseAuditMapper.java"),
        &base_audit_mapper(&config.package).render(),
    )?;
    for table in tables {
        let file = mapper(&config.package, table, index);
        write_file(&dir.join(format!("{}.java", file.decl.name)), &file.render())?;
    }
    Ok(())
}

fn base_mapper_config(package: &str) -> JavaFile {
    JavaFile {
        package: format!("{package}.mapper"),
        imports: vec![
            "org.mapstruct.MapperConfig".to_string(),
            "org.mapstruct.NullValuePropertyMappingStrategy".to_string(),
            "org.mapstruct.ReportingPolicy".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "@MapperConfig(\n    componentModel = \"spring\",\n    unmappedTargetPolicy = ReportingPolicy.IGNORE,\n    nullValuePropertyMappingStrategy = NullValuePropertyMappingStrategy.IGNORE\n)".to_string(),
            ],
            kind: TypeKind::Interface,
            name: "BaseMapperConfig".to_string(),
            extends: None,
            implements: vec![],
            members: vec![],
        },
    }
}

fn audit_mappings() -> String {
    "@BeanMapping(ignoreByDefault = true)\n    @Mappings({\n        @Mapping(target = \"uuid\", source = \"uuid\"),\n        @Mapping(target = \"createdAt\", source = \"createdAt\"),\n        @Mapping(target = \"updatedAt\", source = \"updatedAt\"),\n        @Mapping(target = \"version\", source = \"version\")\n    })".to_string()
}

fn base_audit_mapper(package: &str) -> JavaFile {
    JavaFile {
        package: format!("{package}.mapper"),
        imports: vec![
            "org.mapstruct.*".to_string(),
            format!("{package}.entity.BaseEntity"),
            format!("{package}.dto.BaseDto"),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec!["@Mapper(config = BaseMapperConfig.class)".to_string()],
            kind: TypeKind::Interface,
            name: "BaseAuditMapper".to_string(),
            extends: None,
            implements: vec![],
            members: vec![
                Member::Method(Method::abstract_sig("BaseDto", "toDto", "BaseEntity entity")),
                Member::Method(Method {
                    annotations: vec![audit_mappings()],
                    modifiers: String::new(),
                    ret: "void".to_string(),
                    name: "copyAuditToDto".to_string(),
                    params: "BaseEntity entity, @MappingTarget BaseDto dto".to_string(),
                    body: None,
                }),
                Member::Method(Method {
                    annotations: vec![audit_mappings()],
                    modifiers: String::new(),
                    ret: "void".to_string(),
                    name: "updateAuditFromDto".to_string(),
                    params: "BaseDto dto, @MappingTarget BaseEntity entity".to_string(),
                    body: None,
                }),
            ],
        },
    }
}

fn mappings_annotation(entries: &[String]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    Some(format!(
        "@Mappings({{\n        {}\n    }})",
        entries.join(",\n        ")
    ))
}

fn mapper(package: &str, table: &Table, index: &SchemaIndex<'_>) -> JavaFile {
    let entity = to_camel_case(&table.name);
    let composite = KeyShape::of(table).is_composite();

    let mut to_dto: Vec<String> = Vec::new();
    let mut to_entity: Vec<String> = Vec::new();

    if composite {
        for col in table.primary_key_columns() {
            let part = to_lower_camel(&col.name);
            to_dto.push(format!("@Mapping(source = \"id.{part}\", target = \"id.{part}\")"));
            to_entity.push(format!("@Mapping(source = \"id.{part}\", target = \"id.{part}\")"));
        }
        for col in table.primary_key_columns() {
            if col.foreign_key.is_some() {
                // The relation shares identity with a key part; the service
                // binds it, the mapper must leave it alone.
                to_entity.push(format!(
                    "@Mapping(target = \"{}\", ignore = true)",
                    fk_field_name(&col.name)
                ));
            }
        }
    }

    for col in &table.columns {
        let fk = match &col.foreign_key {
            Some(fk) => fk,
            None => continue,
        };
        if composite && col.primary_key {
            continue;
        }
        let field_base = fk_field_name(&col.name);
        let target_single_pk = index
            .table(&fk.table)
            .and_then(|t| match KeyShape::of(t) {
                KeyShape::Single(pk) => Some(to_lower_camel(&pk.name)),
                _ => None,
            });
        match target_single_pk {
            Some(pk_field) => {
                to_dto.push(format!(
                    "@Mapping(source = \"{field_base}.{pk_field}\", target = \"{field_base}Id\")"
                ));
                to_entity.push(format!("@Mapping(target = \"{field_base}\", ignore = true)"));
            }
            None => {
                // Composite or unresolved target: no scalar identifier to
                // flatten into, ignore both directions.
                to_dto.push(format!("@Mapping(target = \"{field_base}Id\", ignore = true)"));
                to_entity.push(format!("@Mapping(target = \"{field_base}\", ignore = true)"));
            }
        }
    }

    let mut members = Vec::new();
    members.push(Member::Method(Method {
        annotations: mappings_annotation(&to_entity).into_iter().collect(),
        modifiers: String::new(),
        ret: entity.clone(),
        name: "toEntity".to_string(),
        params: format!("{entity}Dto dto"),
        body: None,
    }));
    members.push(Member::Method(Method {
        annotations: mappings_annotation(&to_dto).into_iter().collect(),
        modifiers: String::new(),
        ret: format!("{entity}Dto"),
        name: "toDto".to_string(),
        params: format!("{entity} entity"),
        body: None,
    }));
    members.push(Member::Method(Method::abstract_sig(
        &format!("List<{entity}Dto>"),
        "toDtoList",
        &format!("List<{entity}> entities"),
    )));
    members.push(Member::Method(Method {
        annotations: vec![
            "@BeanMapping(nullValuePropertyMappingStrategy = NullValuePropertyMappingStrategy.IGNORE)".to_string(),
        ],
        modifiers: String::new(),
        ret: "void".to_string(),
        name: "updateEntityFromDto".to_string(),
        params: format!("{entity}Dto dto, @MappingTarget {entity} entity"),
        body: None,
    }));

    JavaFile {
        package: format!("{package}.mapper"),
        imports: vec![
            "org.mapstruct.*".to_string(),
            "java.util.*".to_string(),
            format!("{package}.entity.{entity}"),
            format!("{package}.dto.{entity}Dto"),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec!["@Mapper(config = BaseMapperConfig.class)".to_string()],
            kind: TypeKind::Interface,
            name: format!("{entity}Mapper"),
            extends: Some("BaseAuditMapper".to_string()),
            implements: vec![],
            members,
        },
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
                Column::new("name", "VARCHAR(255)").nullable(false),
            ]),
            Table::new("product").columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("category_id", "BIGINT").references("category", "id"),
            ]),
            Table::new("stock_level").columns(vec![
                Column::new("product_id", "BIGINT")
                    .primary_key()
                    .references("product", "id"),
                Column::new("warehouse_id", "BIGINT").primary_key(),
            ]),
            Table::new("stock_audit").columns(vec![
                Column::new("id", "BIGINT").primary_key(),
                Column::new("stock_level_id", "BIGINT").references("stock_level", "id"),
            ]),
        ]
    }

    #[test]
    fn relation_flattens_to_scalar_id_on_the_way_out() {
        let tables = schema();
        let index = SchemaIndex::new(&tables);
        let source = mapper("com.example.app", &tables[1], &index).render();
        assert!(source.contains("@Mapping(source = \"category.id\", target = \"categoryId\")"));
        assert!(source.contains("@Mapping(target = \"category\", ignore = true)"));
    }

    #[test]
    fn composite_id_parts_map_both_ways() {
        let tables = schema();
        let index = SchemaIndex::new(&tables);
        let source = mapper("com.example.app", &tables[2], &index).render();
        assert!(source.contains("@Mapping(source = \"id.productId\", target = \"id.productId\")"));
        assert!(source.contains("@Mapping(source = \"id.warehouseId\", target = \"id.warehouseId\")"));
        assert!(source.contains("@Mapping(target = \"product\", ignore = true)"));
    }

    #[test]
    fn composite_target_is_ignored_in_both_directions() {
        let tables = schema();
        let index = SchemaIndex::new(&tables);
        let source = mapper("com.example.app", &tables[3], &index).render();
        assert!(source.contains("@Mapping(target = \"stockLevelId\", ignore = true)"));
        assert!(source.contains("@Mapping(target = \"stockLevel\", ignore = true)"));
    }

    #[test]
    fn patch_mapping_copies_only_non_null_properties() {
        let tables = schema();
        let index = SchemaIndex::new(&tables);
        let source = mapper("com.example.app", &tables[0], &index).render();
        assert!(source.contains(
            "@BeanMapping(nullValuePropertyMappingStrategy = NullValuePropertyMappingStrategy.IGNORE)"
        ));
        assert!(source.contains("void updateEntityFromDto(CategoryDto dto, @MappingTarget Category entity);"));
    }
}
