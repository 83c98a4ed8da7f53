//! REST-controller generation.
//!
//! Routing maps one-to-one onto the key-shape decision: single-key tables get
//! flat `/{id}` path-parameter routing, composite-key tables get one path
//! segment per key part, assembled into the identifier aggregate before the
//! service call.

use anyhow::Result;

use crate::config::GeneratorConfig;
use crate::derive::{IdBinding, KeyShape};
use crate::naming::{decapitalize, java_type, path_segment, to_camel_case, to_lower_camel};
use crate::render::java::{Field, JavaFile, Member, Method, TypeDecl, TypeKind};
use crate::schema::{Column, Table};
use crate::generators::write_file;

pub fn generate(config: &GeneratorConfig, tables: &[Table]) -> Result<()> {
    let dir = config.package_dir("controller");
    for table in tables {
        let file = controller(&config.package, config.api_base_trimmed(), table);
        write_file(&dir.join(format!("{}.java", file.decl.name)), &file.render())?;
    }
    Ok(())
}

/// Identifier routing pieces: path suffix, parameter declarations, and the
/// statements turning parameters into the service-facing identifier.
struct IdRoute {
    path: String,
    params: String,
    into_id: Vec<String>,
}

fn id_route(table: &Table, id: &IdBinding) -> IdRoute {
    match KeyShape::of(table) {
        KeyShape::Composite(pk_cols) => IdRoute {
            path: pk_cols
                .iter()
                .map(|c: &&Column| format!("/{{{}}}", c.name))
                .collect(),
            params: pk_cols
                .iter()
                .map(|c| {
                    format!(
                        "@PathVariable(\"{}\") {} {}",
                        c.name,
                        java_type(&c.sql_type),
                        to_lower_camel(&c.name)
                    )
                })
                .collect::<Vec<_>>()
                .join(", "),
            into_id: vec![format!(
                "{ty} id = new {ty}({args});",
                ty = id.java_type,
                args = pk_cols
                    .iter()
                    .map(|c| to_lower_camel(&c.name))
                    .collect::<Vec<_>>()
                    .join(", ")
            )],
        },
        _ => IdRoute {
            path: "/{id}".to_string(),
            params: format!("@PathVariable {} id", id.java_type),
            into_id: vec![],
        },
    }
}

fn controller(package: &str, api_base: &str, table: &Table) -> JavaFile {
    let entity = to_camel_case(&table.name);
    let entity_lower = decapitalize(&entity);
    let dto = format!("{entity}Dto");
    let id = IdBinding::of(table);
    let route = id_route(table, &id);

    let mut imports = vec![
        format!("{package}.dto.{dto}"),
        format!("{package}.service.{entity}Service"),
        format!("{package}.error.ResourceNotFoundException"),
    ];
    if id.composite {
        imports.push(format!("{package}.entity.{}", id.java_type));
    }
    imports.extend(
        [
            "org.springframework.http.*",
            "org.springframework.validation.annotation.Validated",
            "org.springframework.web.bind.annotation.*",
            "org.springframework.web.servlet.support.ServletUriComponentsBuilder",
            "org.springframework.data.domain.Page",
            "org.springframework.data.domain.Sort",
            "jakarta.validation.Valid",
            "java.net.URI",
            "java.util.*",
            "java.util.UUID",
        ]
        .map(str::to_string),
    );

    let mut members: Vec<Member> = vec![
        Member::Field(Field {
            annotations: vec![],
            modifiers: "private final".to_string(),
            ty: format!("{entity}Service"),
            name: "service".to_string(),
            init: None,
        }),
        Member::Method(Method {
            annotations: vec![],
            modifiers: "public".to_string(),
            ret: String::new(),
            name: format!("{entity}Controller"),
            params: format!("{entity}Service service"),
            body: Some(vec!["this.service = service;".to_string()]),
        }),
    ];

    let endpoint = |annotations: Vec<String>, ret: &str, name: &str, params: &str, body: Vec<String>| {
        Member::Method(Method {
            annotations,
            modifiers: "public".to_string(),
            ret: ret.to_string(),
            name: name.to_string(),
            params: params.to_string(),
            body: Some(body),
        })
    };

    members.push(endpoint(
        vec!["@GetMapping".to_string()],
        &format!("List<{dto}>"),
        "list",
        "",
        vec!["return service.findAll();".to_string()],
    ));
    members.push(endpoint(
        vec!["@GetMapping(\"/page\")".to_string()],
        &format!("Page<{dto}>"),
        "listPage",
        "@RequestParam(defaultValue = \"0\") int page, @RequestParam(defaultValue = \"20\") int size, Sort sort",
        vec![
            "var pageable = org.springframework.data.domain.PageRequest.of(page, size, sort);".to_string(),
            "return service.findAll(pageable);".to_string(),
        ],
    ));
    members.push(endpoint(
        vec!["@GetMapping(\"/sorted\")".to_string()],
        &format!("List<{dto}>"),
        "listSorted",
        "Sort sort",
        vec!["return service.findAll(sort);".to_string()],
    ));

    let mut body = route.into_id.clone();
    body.push("return service.findById(id)".to_string());
    body.push(format!(
        "    .orElseThrow(() -> new ResourceNotFoundException(\"{entity_lower} not found\"));"
    ));
    members.push(endpoint(
        vec![format!("@GetMapping(\"{}\")", route.path)],
        &dto,
        "get",
        &route.params,
        body,
    ));

    members.push(endpoint(
        vec!["@GetMapping(\"/uuid/{uuid}\")".to_string()],
        &dto,
        "getByUuid",
        "@PathVariable UUID uuid",
        vec![
            "return service.findByUuid(uuid)".to_string(),
            format!(
                "    .orElseThrow(() -> new ResourceNotFoundException(\"{entity_lower} not found with uuid=\" + uuid));"
            ),
        ],
    ));

    members.push(endpoint(
        vec!["@PostMapping(consumes = MediaType.APPLICATION_JSON_VALUE)".to_string()],
        &format!("ResponseEntity<{dto}>"),
        "create",
        &format!("@Valid @RequestBody {dto} dto"),
        vec![
            format!("{dto} created = service.create(dto);"),
            "URI location = ServletUriComponentsBuilder".to_string(),
            "    .fromCurrentRequest()".to_string(),
            "    .path(\"/uuid/{id}\")".to_string(),
            "    .buildAndExpand(created.getUuid())".to_string(),
            "    .toUri();".to_string(),
            "return ResponseEntity.created(location).body(created);".to_string(),
        ],
    ));

    let mut body = route.into_id.clone();
    body.push("return service.update(id, dto);".to_string());
    members.push(endpoint(
        vec![format!(
            "@PutMapping(path = \"{}\", consumes = MediaType.APPLICATION_JSON_VALUE)",
            route.path
        )],
        &dto,
        "update",
        &format!("{}, @Valid @RequestBody {dto} dto", route.params),
        body,
    ));

    let mut body = route.into_id.clone();
    body.push("return service.patch(id, dto);".to_string());
    members.push(endpoint(
        vec![format!(
            "@PatchMapping(path = \"{}\", consumes = MediaType.APPLICATION_JSON_VALUE)",
            route.path
        )],
        &dto,
        "patch",
        &format!("{}, @RequestBody {dto} dto", route.params),
        body,
    ));

    let mut body = route.into_id.clone();
    body.push("service.deleteById(id);".to_string());
    members.push(endpoint(
        vec![
            format!("@DeleteMapping(\"{}\")", route.path),
            "@ResponseStatus(HttpStatus.NO_CONTENT)".to_string(),
        ],
        "void",
        "delete",
        &route.params,
        body,
    ));

    members.push(endpoint(
        vec![
            "@DeleteMapping(\"/uuid/{uuid}\")".to_string(),
            "@ResponseStatus(HttpStatus.NO_CONTENT)".to_string(),
        ],
        "void",
        "deleteByUuid",
        "@PathVariable UUID uuid",
        vec!["service.deleteByUuid(uuid);".to_string()],
    ));

    JavaFile {
        package: format!("{package}.controller"),
        imports,
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "@RestController".to_string(),
                "@Validated".to_string(),
                format!(
                    "@RequestMapping(path = \"{api_base}/{}\", produces = MediaType.APPLICATION_JSON_VALUE)",
                    path_segment(&table.name)
                ),
            ],
            kind: TypeKind::Class,
            name: format!("{entity}Controller"),
            extends: None,
            implements: vec![],
            members,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key_controller_routes_by_scalar_id() {
        let table = Table::new("purchase_order").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("status", "VARCHAR(32)"),
        ]);
        let source = controller("com.example.app", "/api", &table).render();
        assert!(source.contains(
            "@RequestMapping(path = \"/api/purchase-order\", produces = MediaType.APPLICATION_JSON_VALUE)"
        ));
        assert!(source.contains("@GetMapping(\"/{id}\")"));
        assert!(source.contains("public PurchaseOrderDto get(@PathVariable Long id)"));
    }

    #[test]
    fn composite_key_controller_has_one_segment_per_key_part() {
        let table = Table::new("stock_level").columns(vec![
            Column::new("product_id", "BIGINT").primary_key(),
            Column::new("warehouse_id", "BIGINT").primary_key(),
        ]);
        let source = controller("com.example.app", "/api", &table).render();
        assert!(source.contains("@GetMapping(\"/{product_id}/{warehouse_id}\")"));
        assert!(source.contains(
            "@PathVariable(\"product_id\") Long productId, @PathVariable(\"warehouse_id\") Long warehouseId"
        ));
        assert!(source.contains("StockLevelId id = new StockLevelId(productId, warehouseId);"));
        // No single `{id}` segment anywhere in the routing.
        assert!(!source.contains("\"/{id}\""));
    }

    #[test]
    fn create_returns_location_of_external_identifier() {
        let table = Table::new("client").columns(vec![Column::new("id", "BIGINT").primary_key()]);
        let source = controller("com.example.app", "/api", &table).render();
        assert!(source.contains(".path(\"/uuid/{id}\")"));
        assert!(source.contains(".buildAndExpand(created.getUuid())"));
    }
}
