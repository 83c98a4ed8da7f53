//! Service-layer generation: per-table CRUD orchestration with derived
//! precondition checks, relationship binding and delete guards.
//!
//! The precondition block is generated one statement per derived fact, in a
//! stable order: required-field checks, then uniqueness, then foreign-key
//! existence. Foreign keys whose parent has a composite key get no existence
//! precondition and no binding line; existence for those surfaces at the
//! persistence layer.

use std::collections::HashSet;

use anyhow::Result;

use crate::config::GeneratorConfig;
use crate::derive::{IdBinding, SchemaIndex};
use crate::naming::{decapitalize, fk_base, to_camel_case};
use crate::render::java::{Field, JavaFile, Member, Method, TypeDecl, TypeKind};
use crate::schema::Table;
use crate::generators::write_file;

pub fn generate(config: &GeneratorConfig, tables: &[Table], index: &SchemaIndex<'_>) -> Result<()> {
    let iface_dir = config.package_dir("service");
    let impl_dir = iface_dir.join("impl");
    for table in tables {
        let iface = interface(&config.package, table);
        write_file(&iface_dir.join(format!("{}.java", iface.decl.name)), &iface.render())?;
        let implementation = implementation(&config.package, table, index);
        write_file(
            &impl_dir.join(format!("{}.java", implementation.decl.name)),
            &implementation.render(),
        )?;
    }
    Ok(())
}

fn getter(column_name: &str) -> String {
    format!("get{}", to_camel_case(column_name))
}

fn interface(package: &str, table: &Table) -> JavaFile {
    let entity = to_camel_case(&table.name);
    let id = IdBinding::of(table);
    let dto = format!("{entity}Dto");

    let mut imports = vec![
        "java.util.*".to_string(),
        "java.util.UUID".to_string(),
        "org.springframework.data.domain.Page".to_string(),
        "org.springframework.data.domain.Pageable".to_string(),
        "org.springframework.data.domain.Sort".to_string(),
        format!("{package}.dto.{dto}"),
    ];
    if id.composite {
        imports.push(format!("{package}.entity.{}", id.java_type));
    }

    let sig = |ret: &str, name: &str, params: &str| Member::Method(Method::abstract_sig(ret, name, params));
    JavaFile {
        package: format!("{package}.service"),
        imports,
        banner: None,
        decl: TypeDecl {
            annotations: vec![],
            kind: TypeKind::Interface,
            name: format!("{entity}Service"),
            extends: None,
            implements: vec![],
            members: vec![
                sig(&dto, "create", &format!("{dto} dto")),
                sig(&dto, "update", &format!("{} id, {dto} dto", id.java_type)),
                sig(&dto, "patch", &format!("{} id, {dto} dto", id.java_type)),
                sig(&format!("Optional<{dto}>"), "findById", &format!("{} id", id.java_type)),
                sig(&format!("Optional<{dto}>"), "findByUuid", "UUID uuid"),
                sig(&format!("List<{dto}>"), "findAll", ""),
                sig(&format!("Page<{dto}>"), "findAll", "Pageable pageable"),
                sig(&format!("List<{dto}>"), "findAll", "Sort sort"),
                sig("void", "deleteById", &format!("{} id", id.java_type)),
                sig("void", "deleteByUuid", "UUID uuid"),
            ],
        },
    }
}

/// Parent table referenced by one or more foreign keys, with the repository
/// field injected into the implementation.
struct ParentRepo {
    table: String,
    field: String,
    single: bool,
}

fn implementation(package: &str, table: &Table, index: &SchemaIndex<'_>) -> JavaFile {
    let entity = to_camel_case(&table.name);
    let entity_lower = decapitalize(&entity);
    let dto = format!("{entity}Dto");
    let id = IdBinding::of(table);
    let spec = index.spec(&table.name);
    let fk_columns: Vec<_> = table.columns.iter().filter(|c| c.foreign_key.is_some()).collect();

    // Parent repositories, deduplicated in encounter order.
    let mut parents: Vec<ParentRepo> = Vec::new();
    let mut parents_seen: HashSet<&str> = HashSet::new();
    for col in &fk_columns {
        let fk = col.foreign_key.as_ref().map(|f| f.table.as_str()).unwrap_or_default();
        if parents_seen.insert(fk) {
            let parent_entity = to_camel_case(fk);
            parents.push(ParentRepo {
                table: fk.to_string(),
                field: format!("{}Repository", decapitalize(&parent_entity)),
                single: index.parent_is_single(fk),
            });
        }
    }
    let parent = |name: &str| parents.iter().find(|p| p.table == name);

    // Child repositories for the delete guard, deduplicated in edge order.
    let mut child_fields: Vec<(String, String)> = Vec::new(); // (entity, field)
    let mut guard_lines: Vec<String> = Vec::new();
    for child in &spec.child_refs {
        let child_entity = to_camel_case(&child.child_table);
        let child_field = format!("{}Repository", decapitalize(&child_entity));
        if !child_fields.iter().any(|(_, f)| *f == child_field) {
            child_fields.push((child_entity.clone(), child_field.clone()));
        }
        let assoc = to_camel_case(fk_base(&child.child_fk));
        guard_lines.push(format!(
            "if ({child_field}.countBy{assoc}Id(id) > 0) {{ throw new ReferentialIntegrityException(\"{entity_lower} has dependent {child} records\"); }}",
            child = child.child_table,
        ));
    }

    // Precondition statements: required fields first, then uniqueness, then
    // foreign-key existence.
    let mut precheck_create: Vec<String> = Vec::new();
    let mut precheck_update: Vec<String> = Vec::new();

    for col in &spec.required_fields {
        let line = format!(
            "if (dto.{g}() == null) {{ throw new MissingRequiredFieldException(\"{col} is required\"); }}",
            g = getter(col),
        );
        precheck_create.push(line.clone());
        precheck_update.push(line);
    }

    for col in &spec.unique_fields {
        let fk = spec.foreign_keys.iter().find(|fk| &fk.column == col);
        let (value_getter, exists) = match fk {
            Some(fk) => {
                if !index.parent_is_single(&fk.ref_table) {
                    continue;
                }
                let assoc = to_camel_case(fk_base(col));
                (getter(&format!("{}_id", fk_base(col))), format!("existsBy{assoc}Id"))
            }
            None => (getter(col), format!("existsBy{}", to_camel_case(col))),
        };
        precheck_create.push(format!(
            "if (dto.{value_getter}() != null && repository.{exists}(dto.{value_getter}())) {{ throw new DuplicateResourceException(\"{entity_lower} with {col} already exists\"); }}",
        ));
        precheck_update.push(format!(
            "if (dto.{value_getter}() != null && repository.{exists}AndIdNot(dto.{value_getter}(), id)) {{ throw new DuplicateResourceException(\"{entity_lower} with {col} already exists\"); }}",
        ));
    }

    for col in &fk_columns {
        let fk = match &col.foreign_key {
            Some(fk) => fk,
            None => continue,
        };
        let Some(parent_repo) = parent(&fk.table) else { continue };

        // No scalar to check against a composite-key parent; existence is
        // deferred to relationship binding.
        if !parent_repo.single {
            continue;
        }

        if id.composite && col.primary_key {
            // FK that is part of the composite identity: check the key part
            // carried inside the identifier aggregate.
            let part = getter(&col.name);
            precheck_create.push(format!(
                "if (dto.getId() != null && dto.getId().{part}() != null && !{field}.existsById(dto.getId().{part}())) {{ throw new ForeignKeyNotFoundException(\"{col} references missing {parent}\"); }}",
                field = parent_repo.field,
                col = col.name,
                parent = fk.table,
            ));
            precheck_update.push(format!(
                "if (!{field}.existsById(id.{part}())) {{ throw new ForeignKeyNotFoundException(\"{col} references missing {parent}\"); }}",
                field = parent_repo.field,
                col = col.name,
                parent = fk.table,
            ));
            continue;
        }

        let value_getter = getter(&format!("{}_id", fk_base(&col.name)));
        let line = format!(
            "if (dto.{value_getter}() != null && !{field}.existsById(dto.{value_getter}())) {{ throw new ForeignKeyNotFoundException(\"{col} references missing {parent}\"); }}",
            field = parent_repo.field,
            col = col.name,
            parent = fk.table,
        );
        precheck_create.push(line.clone());
        precheck_update.push(line);
    }

    // Relationship-binding statements per operation shape.
    let mut bind_create: Vec<String> = Vec::new();
    let mut bind_update: Vec<String> = Vec::new();
    let mut bind_patch: Vec<String> = Vec::new();
    for col in &fk_columns {
        let fk = match &col.foreign_key {
            Some(fk) => fk,
            None => continue,
        };
        let Some(parent_repo) = parent(&fk.table) else { continue };
        if !parent_repo.single {
            // Composite-key parent: binding is deferred to manual handling.
            continue;
        }
        let setter = format!("set{}", to_camel_case(fk_base(&col.name)));
        let field = &parent_repo.field;

        if id.composite && col.primary_key {
            let part = getter(&col.name);
            bind_create.push(format!(
                "if (dto.getId() != null && dto.getId().{part}() != null) {{ entity.{setter}({field}.getRef(dto.getId().{part}())); }}",
            ));
            // The method identifier is always present on update.
            bind_update.push(format!("replaced.{setter}({field}.getRef(id.{part}()));"));
            bind_patch.push(format!(
                "if (dto.getId() != null && dto.getId().{part}() != null) {{ entity.{setter}({field}.getRef(dto.getId().{part}())); }}",
            ));
        } else {
            let value_getter = getter(&format!("{}_id", fk_base(&col.name)));
            bind_create.push(format!(
                "if (dto.{value_getter}() != null) {{ entity.{setter}({field}.getRef(dto.{value_getter}())); }}",
            ));
            bind_update.push(format!(
                "if (dto.{value_getter}() != null) {{ replaced.{setter}({field}.getRef(dto.{value_getter}())); }}",
            ));
            bind_patch.push(format!(
                "if (dto.{value_getter}() != null) {{ entity.{setter}({field}.getRef(dto.{value_getter}())); }}",
            ));
        }
    }

    // ----- Assemble the class -----

    let mut imports = vec![
        "java.util.*".to_string(),
        "java.util.stream.Collectors".to_string(),
        "java.util.UUID".to_string(),
        "lombok.RequiredArgsConstructor".to_string(),
        "org.springframework.data.domain.Page".to_string(),
        "org.springframework.data.domain.Pageable".to_string(),
        "org.springframework.data.domain.Sort".to_string(),
        "org.springframework.stereotype.Service".to_string(),
        "org.springframework.transaction.annotation.Transactional".to_string(),
        format!("{package}.dto.{dto}"),
        format!("{package}.entity.{entity}"),
    ];
    if id.composite {
        imports.push(format!("{package}.entity.{}", id.java_type));
    }
    for exception in [
        "ResourceNotFoundException",
        "DuplicateResourceException",
        "ForeignKeyNotFoundException",
        "MissingRequiredFieldException",
        "ReferentialIntegrityException",
    ] {
        imports.push(format!("{package}.error.{exception}"));
    }
    for parent_repo in &parents {
        imports.push(format!(
            "{package}.repository.{}Repository",
            to_camel_case(&parent_repo.table)
        ));
    }
    for (child_entity, _) in &child_fields {
        let import = format!("{package}.repository.{child_entity}Repository");
        if !imports.contains(&import) {
            imports.push(import);
        }
    }
    imports.push(format!("{package}.mapper.{entity}Mapper"));
    imports.push(format!("{package}.repository.{entity}Repository"));
    imports.push(format!("{package}.service.{entity}Service"));
    let mut seen_imports = HashSet::new();
    imports.retain(|import| seen_imports.insert(import.clone()));

    let mut members: Vec<Member> = vec![
        repo_field(&format!("{entity}Repository"), "repository"),
        repo_field(&format!("{entity}Mapper"), "mapper"),
    ];
    for parent_repo in &parents {
        let ty = format!("{}Repository", to_camel_case(&parent_repo.table));
        members.push(repo_field(&ty, &parent_repo.field));
    }
    for (child_entity, child_field) in &child_fields {
        let ty = format!("{child_entity}Repository");
        if !members_contains_field(&members, child_field) {
            members.push(repo_field(&ty, child_field));
        }
    }

    // Create
    let mut body = vec![
        "precheckCreate(dto);".to_string(),
        format!("{entity} entity = mapper.toEntity(dto);"),
    ];
    body.extend(bind_create);
    body.push("entity = repository.save(entity);".to_string());
    body.push("return mapper.toDto(entity);".to_string());
    members.push(tx_method(&dto, "create", &format!("{dto} dto"), body));

    // Update (full replace)
    let mut body = vec![
        format!("{entity} current = repository.findById(id)"),
        format!("    .orElseThrow(() -> new ResourceNotFoundException(\"{entity_lower} not found with id=\" + id));"),
        "precheckUpdate(id, dto);".to_string(),
        format!("{entity} replaced = mapper.toEntity(dto);"),
        "".to_string(),
        "// Force the identifier so persistence updates instead of inserting.".to_string(),
        format!("replaced.{}(id);", id.setter),
        "".to_string(),
        "// Immutable once created; carry over when the input omits them.".to_string(),
        "if (replaced.getUuid() == null) { replaced.setUuid(current.getUuid()); }".to_string(),
        "if (replaced.getCreatedAt() == null) { replaced.setCreatedAt(current.getCreatedAt()); }".to_string(),
        "".to_string(),
        "// A supplied version is trusted for the optimistic-lock check;".to_string(),
        "// an omitted one must not reset the counter.".to_string(),
        "if (replaced.getVersion() == null) { replaced.setVersion(current.getVersion()); }".to_string(),
    ];
    body.extend(bind_update);
    body.push("replaced = repository.save(replaced);".to_string());
    body.push("return mapper.toDto(replaced);".to_string());
    members.push(tx_method(
        &dto,
        "update",
        &format!("{} id, {dto} dto", id.java_type),
        body,
    ));

    // Patch (partial)
    let mut body = vec![
        format!("{entity} entity = repository.findById(id)"),
        format!("    .orElseThrow(() -> new ResourceNotFoundException(\"{entity_lower} not found with id=\" + id));"),
        "precheckUpdate(id, dto);".to_string(),
        "mapper.updateEntityFromDto(dto, entity);".to_string(),
    ];
    body.extend(bind_patch);
    body.push("entity = repository.save(entity);".to_string());
    body.push("return mapper.toDto(entity);".to_string());
    members.push(tx_method(
        &dto,
        "patch",
        &format!("{} id, {dto} dto", id.java_type),
        body,
    ));

    // Queries
    members.push(read_method(
        &format!("Optional<{dto}>"),
        "findById",
        &format!("{} id", id.java_type),
        vec!["return repository.findById(id).map(mapper::toDto);".to_string()],
    ));
    members.push(read_method(
        &format!("Optional<{dto}>"),
        "findByUuid",
        "UUID uuid",
        vec!["return repository.findByUuid(uuid).map(mapper::toDto);".to_string()],
    ));
    members.push(read_method(
        &format!("List<{dto}>"),
        "findAll",
        "",
        vec!["return repository.findAll().stream().map(mapper::toDto).collect(Collectors.toList());".to_string()],
    ));
    members.push(read_method(
        &format!("Page<{dto}>"),
        "findAll",
        "Pageable pageable",
        vec!["return repository.findAll(pageable).map(mapper::toDto);".to_string()],
    ));
    members.push(read_method(
        &format!("List<{dto}>"),
        "findAll",
        "Sort sort",
        vec!["return repository.findAll(sort).stream().map(mapper::toDto).collect(Collectors.toList());".to_string()],
    ));

    // Deletes: existence check, then the dependency guard, then the delete.
    members.push(tx_method(
        "void",
        "deleteById",
        &format!("{} id", id.java_type),
        vec![
            "if (!repository.existsById(id)) {".to_string(),
            format!("    throw new ResourceNotFoundException(\"{entity_lower} not found with id=\" + id);"),
            "}".to_string(),
            "guardDelete(id);".to_string(),
            "repository.deleteById(id);".to_string(),
        ],
    ));
    members.push(tx_method(
        "void",
        "deleteByUuid",
        "UUID uuid",
        vec![
            format!("{entity} entity = repository.findByUuid(uuid)"),
            format!("    .orElseThrow(() -> new ResourceNotFoundException(\"{entity_lower} not found with uuid=\" + uuid));"),
            format!("guardDelete(entity.{}());", id.getter),
            "repository.delete(entity);".to_string(),
        ],
    ));

    // Prechecks and the delete guard, derived from the table spec.
    members.push(Member::Method(Method {
        annotations: vec![],
        modifiers: "private".to_string(),
        ret: "void".to_string(),
        name: "precheckCreate".to_string(),
        params: format!("{dto} dto"),
        body: Some(or_no_op(precheck_create, "// no prechecks")),
    }));
    members.push(Member::Method(Method {
        annotations: vec![],
        modifiers: "private".to_string(),
        ret: "void".to_string(),
        name: "precheckUpdate".to_string(),
        params: format!("{} id, {dto} dto", id.java_type),
        body: Some(or_no_op(precheck_update, "// no prechecks")),
    }));
    members.push(Member::Method(Method {
        annotations: vec![],
        modifiers: "private".to_string(),
        ret: "void".to_string(),
        name: "guardDelete".to_string(),
        params: format!("{} id", id.java_type),
        body: Some(or_no_op(guard_lines, "// no dependent tables")),
    }));

    JavaFile {
        package: format!("{package}.service.impl"),
        imports,
        banner: None,
        decl: TypeDecl {
            annotations: vec!["@Service".to_string(), "@RequiredArgsConstructor".to_string()],
            kind: TypeKind::Class,
            name: format!("{entity}ServiceImpl"),
            extends: None,
            implements: vec![format!("{entity}Service")],
            members,
        },
    }
}

fn repo_field(ty: &str, name: &str) -> Member {
    Member::Field(Field {
        annotations: vec![],
        modifiers: "private final".to_string(),
        ty: ty.to_string(),
        name: name.to_string(),
        init: None,
    })
}

fn members_contains_field(members: &[Member], name: &str) -> bool {
    members
        .iter()
        .any(|m| matches!(m, Member::Field(f) if f.name == name))
}

fn tx_method(ret: &str, name: &str, params: &str, body: Vec<String>) -> Member {
    Member::Method(Method {
        annotations: vec!["@Override".to_string(), "@Transactional".to_string()],
        modifiers: "public".to_string(),
        ret: ret.to_string(),
        name: name.to_string(),
        params: params.to_string(),
        body: Some(body),
    })
}

fn read_method(ret: &str, name: &str, params: &str, body: Vec<String>) -> Member {
    Member::Method(Method {
        annotations: vec![
            "@Override".to_string(),
            "@Transactional(readOnly = true)".to_string(),
        ],
        modifiers: "public".to_string(),
        ret: ret.to_string(),
        name: name.to_string(),
        params: params.to_string(),
        body: Some(body),
    })
}

fn or_no_op(lines: Vec<String>, placeholder: &str) -> Vec<String> {
    if lines.is_empty() {
        vec![placeholder.to_string()]
    } else {
        lines
    }
}
