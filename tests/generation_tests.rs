use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crudgen::{catalog, generators, Column, GeneratorConfig, Table};

fn generate_into(root: &Path, tables: &[Table]) -> GeneratorConfig {
    let config = GeneratorConfig::rooted(root);
    generators::generate_all(&config, tables).expect("generation succeeds");
    config
}

fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    collect(root, root, &mut files);
    files
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) {
    for entry in fs::read_dir(dir).expect("readable dir") {
        let entry = entry.expect("dir entry");
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let rel = path
                .strip_prefix(root)
                .expect("under root")
                .to_string_lossy()
                .replace('\\', "/");
            files.insert(rel, fs::read(&path).expect("readable file"));
        }
    }
}

fn read_source(config: &GeneratorConfig, segment: &str, file: &str) -> String {
    let path = config.package_dir(segment).join(file);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing generated file {path:?}"))
}

/// A small schema exercising every key shape: single keys, a composite key
/// whose parts are foreign keys to distinct single-key parents, and a child
/// reference used by the delete guard.
fn scenario_tables() -> Vec<Table> {
    vec![
        Table::new("warehouse").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("code", "VARCHAR(32)").nullable(false).unique(),
        ]),
        Table::new("product").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("sku", "VARCHAR(64)").nullable(false).unique(),
            Column::new("name", "VARCHAR(255)").nullable(false),
        ]),
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
        ]),
    ]
}

#[test]
fn two_runs_produce_byte_identical_output() {
    let tables = catalog::tables();
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");
    generate_into(first.path(), &tables);
    generate_into(second.path(), &tables);

    let a = snapshot(first.path());
    let b = snapshot(second.path());
    assert!(!a.is_empty());
    assert_eq!(
        a.keys().collect::<Vec<_>>(),
        b.keys().collect::<Vec<_>>(),
        "file sets differ between runs"
    );
    for (path, contents) in &a {
        assert_eq!(contents, &b[path], "{path} differs between runs");
    }
}

#[test]
fn rerun_over_existing_output_is_stable() {
    let tables = catalog::tables();
    let dir = tempfile::tempdir().expect("tempdir");
    generate_into(dir.path(), &tables);
    let first = snapshot(dir.path());
    generate_into(dir.path(), &tables);
    let second = snapshot(dir.path());
    assert_eq!(first, second);
}

#[test]
fn master_manifest_lists_all_creates_before_any_constraints() {
    let tables = catalog::tables();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = generate_into(dir.path(), &tables);

    let master = fs::read_to_string(&config.master_file).expect("master manifest");
    let last_table = master
        .match_indices("-table.xml")
        .map(|(i, _)| i)
        .max()
        .expect("table includes");
    let first_constraints = master
        .match_indices("-constraints.xml")
        .map(|(i, _)| i)
        .min()
        .expect("constraints includes");
    assert!(
        last_table < first_constraints,
        "every create unit must precede the first constraints unit"
    );
    assert!(master.find("000-postgres-extensions.xml").expect("preamble") < last_table);
}

#[test]
fn unique_text_column_flows_from_repository_to_service_precondition() {
    let tables = scenario_tables();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = generate_into(dir.path(), &tables);

    let repository = read_source(&config, "repository", "ProductRepository.java");
    assert!(repository.contains("boolean existsBySku(String sku);"));
    assert!(repository.contains("boolean existsBySkuAndIdNot(String sku, Long id);"));

    let service = read_source(&config, "service/impl", "ProductServiceImpl.java");
    assert!(service.contains(
        "if (dto.getSku() != null && repository.existsBySku(dto.getSku())) { throw new DuplicateResourceException"
    ));
}

#[test]
fn composite_key_agrees_across_every_artifact() {
    let tables = scenario_tables();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = generate_into(dir.path(), &tables);

    let entity = read_source(&config, "entity", "StockLevel.java");
    assert!(entity.contains("private StockLevelId id;"));

    let id_type = read_source(&config, "entity", "StockLevelId.java");
    assert!(id_type.contains("private Long productId;"));
    assert!(id_type.contains("private Long warehouseId;"));

    let repository = read_source(&config, "repository", "StockLevelRepository.java");
    assert!(repository.contains("BaseRepository<StockLevel, StockLevelId>"));

    let service = read_source(&config, "service", "StockLevelService.java");
    assert!(service.contains("StockLevelDto update(StockLevelId id, StockLevelDto dto);"));

    let controller = read_source(&config, "controller", "StockLevelController.java");
    assert!(controller.contains("/{product_id}/{warehouse_id}"));
    assert!(controller.contains("new StockLevelId(productId, warehouseId)"));
    assert!(!controller.contains("\"/{id}\""));

    let dto = read_source(&config, "dto", "StockLevelDto.java");
    assert!(dto.contains("private StockLevelIdDto id;"));
}

#[test]
fn deleting_a_referenced_parent_is_guarded_before_the_delete_call() {
    let tables = scenario_tables();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = generate_into(dir.path(), &tables);

    let service = read_source(&config, "service/impl", "ProductServiceImpl.java");
    let guard = service
        .find("if (stockLevelRepository.countByProductId(id) > 0) { throw new ReferentialIntegrityException")
        .expect("delete guard present");
    let delete = service
        .find("repository.deleteById(id);")
        .expect("delete call present");
    let guard_call = service.find("guardDelete(id);").expect("guard invoked");
    assert!(guard_call < delete);
    assert!(guard > delete, "guard body is defined after the CRUD methods");
}

#[test]
fn customized_base_classes_survive_regeneration() {
    let tables = scenario_tables();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = generate_into(dir.path(), &tables);

    let base_entity = config.package_dir("entity").join("BaseEntity.java");
    fs::write(&base_entity, "// locally customized\n").expect("writable");
    let product_entity = config.package_dir("entity").join("Product.java");
    fs::write(&product_entity, "// stale\n").expect("writable");

    generate_into(dir.path(), &tables);

    assert_eq!(
        fs::read_to_string(&base_entity).expect("base entity"),
        "// locally customized\n",
        "base classes are idempotently skipped when present"
    );
    assert!(
        fs::read_to_string(&product_entity)
            .expect("product entity")
            .contains("public class Product extends BaseEntity"),
        "table-specific classes are always overwritten"
    );
}

#[test]
fn collection_groups_every_table_with_the_standard_calls() {
    let tables = catalog::tables();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = generate_into(dir.path(), &tables);

    let collection: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.collection_out).expect("collection"))
            .expect("valid json");
    let folders = collection["item"].as_array().expect("folders");
    assert_eq!(folders.len(), tables.len());
    for folder in folders {
        assert_eq!(folder["item"].as_array().expect("requests").len(), 10);
    }
    assert_eq!(collection["auth"]["type"], "basic");

    let environment: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.env_out).expect("environment"))
            .expect("valid json");
    let keys: Vec<&str> = environment["values"]
        .as_array()
        .expect("values")
        .iter()
        .map(|v| v["key"].as_str().expect("key"))
        .collect();
    assert_eq!(keys, ["baseUrl", "username", "password", "uuid"]);
}
