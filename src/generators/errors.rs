//! Error-scaffolding generation for the target application: exception types,
//! the error-code enumeration, the constraint-name catalog and the global
//! handler.
//!
//! Application-level checks are preferred (they run before the persistence
//! call and produce specific codes); the persistence-layer safety net exists
//! for constraints the generated preconditions could not check and degrades
//! to a generic code when a violated constraint's name has no mapping.

use anyhow::Result;

use crate::config::GeneratorConfig;
use crate::naming::{
    foreign_key_constraint_name, not_null_constraint_name, unique_constraint_name,
};
use crate::render::java::{Field, JavaFile, Member, Method, TypeDecl, TypeKind};
use crate::schema::Table;
use crate::generators::{write_file, write_file_if_absent};

/// Exception types thrown by the generated service layer.
const EXCEPTIONS: [&str; 6] = [
    "ResourceNotFoundException",
    "DuplicateResourceException",
    "ForeignKeyNotFoundException",
    "MissingRequiredFieldException",
    "InvalidValueException",
    "ReferentialIntegrityException",
];

/// Generic error codes, always present ahead of the per-constraint ones.
const GENERIC_CODES: [&str; 8] = [
    "NOT_FOUND",
    "DUPLICATE",
    "FK_NOT_FOUND",
    "MISSING_REQUIRED_FIELD",
    "REF_INTEGRITY",
    "VALIDATION_ERROR",
    "DATA_INTEGRITY",
    "INTERNAL_ERROR",
];

pub fn generate(config: &GeneratorConfig, tables: &[Table]) -> Result<()> {
    let dir = config.package_dir("error");
    for name in EXCEPTIONS {
        write_file_if_absent(&dir.join(format!("{name}.java")), &exception(&config.package, name).render())?;
    }
    write_file_if_absent(&dir.join("ErrorResponse.java"), &error_response(&config.package).render())?;
    write_file(&dir.join("ErrorCode.java"), &error_code(&config.package, tables).render())?;
    write_file(
        &dir.join("ConstraintCatalog.java"),
        &constraint_catalog(&config.package, tables).render(),
    )?;
    write_file(
        &dir.join("GlobalExceptionHandler.java"),
        &global_handler(&config.package).render(),
    )?;
    Ok(())
}

fn exception(package: &str, name: &str) -> JavaFile {
    JavaFile {
        package: format!("{package}.error"),
        imports: vec![],
        banner: None,
        decl: TypeDecl {
            annotations: vec![],
            kind: TypeKind::Class,
            name: name.to_string(),
            extends: Some("RuntimeException".to_string()),
            implements: vec![],
            members: vec![Member::Method(Method {
                annotations: vec![],
                modifiers: "public".to_string(),
                ret: String::new(),
                name: name.to_string(),
                params: "String message".to_string(),
                body: Some(vec!["super(message);".to_string()]),
            })],
        },
    }
}

fn error_response(package: &str) -> JavaFile {
    JavaFile {
        package: format!("{package}.error"),
        imports: vec![
            "java.time.OffsetDateTime".to_string(),
            "java.util.Map".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec![],
            kind: TypeKind::Record(
                "String code,\n        String message,\n        Map<String, Object> details,\n        OffsetDateTime timestamp".to_string(),
            ),
            name: "ErrorResponse".to_string(),
            extends: None,
            implements: vec![],
            members: vec![Member::Method(Method {
                annotations: vec![],
                modifiers: "public static".to_string(),
                ret: "ErrorResponse".to_string(),
                name: "of".to_string(),
                params: "String code, String message, Map<String, Object> details".to_string(),
                body: Some(vec![
                    "return new ErrorResponse(code, message, details, OffsetDateTime.now());".to_string(),
                ]),
            })],
        },
    }
}

/// Stable code identifier base for one (table, column) pair.
fn code_base(table: &Table, column_name: &str) -> String {
    format!("{}_{}", table.name, column_name)
        .to_uppercase()
        .replace('-', "_")
}

/// Per-constraint codes in declaration order: one code per (table, column)
/// carrying a uniqueness, non-null or foreign-key constraint.
fn per_table_codes(tables: &[Table]) -> Vec<String> {
    let mut codes = Vec::new();
    let mut push = |code: String| {
        if !codes.contains(&code) {
            codes.push(code);
        }
    };
    for table in tables {
        for col in &table.columns {
            let base = code_base(table, &col.name);
            if col.unique == Some(true) {
                push(format!("{base}_DUPLICATE"));
            }
            if col.nullable == Some(false) {
                push(format!("{base}_REQUIRED"));
            }
            if col.foreign_key.is_some() {
                push(format!("{base}_FK_VIOLATION"));
            }
        }
    }
    codes
}

fn error_code(package: &str, tables: &[Table]) -> JavaFile {
    let mut members: Vec<Member> = GENERIC_CODES
        .iter()
        .map(|code| Member::Constant(format!("{code},")))
        .collect();
    for code in per_table_codes(tables) {
        members.push(Member::Constant(format!("{code},")));
    }
    JavaFile {
        package: format!("{package}.error"),
        imports: vec![],
        banner: None,
        decl: TypeDecl {
            annotations: vec![
                "/** Application-wide error codes (stable identifiers for clients). */".to_string(),
            ],
            kind: TypeKind::Enum,
            name: "ErrorCode".to_string(),
            extends: None,
            implements: vec![],
            members,
        },
    }
}

/// Catalog mapping DDL constraint names to specific error codes. The names
/// follow the same conventions the changelog generator emits, so a violated
/// database constraint resolves to the code derived from the same column.
fn constraint_catalog(package: &str, tables: &[Table]) -> JavaFile {
    let mut entries = Vec::new();
    for table in tables {
        for col in &table.columns {
            let base = code_base(table, &col.name);
            if col.unique == Some(true) {
                entries.push(format!(
                    "byConstraint.put(\"{}\", ErrorCode.{base}_DUPLICATE);",
                    unique_constraint_name(&table.name, &col.name)
                ));
            }
            if let Some(fk) = &col.foreign_key {
                entries.push(format!(
                    "byConstraint.put(\"{}\", ErrorCode.{base}_FK_VIOLATION);",
                    foreign_key_constraint_name(&table.name, &col.name, &fk.table)
                ));
            }
            if col.nullable == Some(false) {
                entries.push(format!(
                    "byConstraint.put(\"{}\", ErrorCode.{base}_REQUIRED);",
                    not_null_constraint_name(&table.name, &col.name)
                ));
            }
        }
    }
    if entries.is_empty() {
        entries.push("// no constrained columns".to_string());
    }

    JavaFile {
        package: format!("{package}.error"),
        imports: vec!["java.util.*".to_string()],
        banner: None,
        decl: TypeDecl {
            annotations: vec![],
            kind: TypeKind::Class,
            name: "ConstraintCatalog".to_string(),
            extends: None,
            implements: vec![],
            members: vec![
                Member::Field(Field {
                    annotations: vec![],
                    modifiers: "private static final".to_string(),
                    ty: "Map<String, ErrorCode>".to_string(),
                    name: "byConstraint".to_string(),
                    init: Some("new HashMap<>()".to_string()),
                }),
                Member::StaticInit(entries),
                Member::Method(Method {
                    annotations: vec![],
                    modifiers: "private".to_string(),
                    ret: String::new(),
                    name: "ConstraintCatalog".to_string(),
                    params: String::new(),
                    body: Some(vec![]),
                }),
                Member::Method(Method {
                    annotations: vec![
                        "/** Specific code for a constraint name (case-insensitive), or empty if unknown. */".to_string(),
                    ],
                    modifiers: "public static".to_string(),
                    ret: "Optional<ErrorCode>".to_string(),
                    name: "resolve".to_string(),
                    params: "String constraintName".to_string(),
                    body: Some(vec![
                        "if (constraintName == null) return Optional.empty();".to_string(),
                        "return Optional.ofNullable(byConstraint.get(constraintName.toLowerCase(Locale.ROOT)));".to_string(),
                    ]),
                }),
            ],
        },
    }
}

fn global_handler(package: &str) -> JavaFile {
    let handler = |exception: &str, method: &str, status_expr: &str, code: &str| {
        Member::Method(Method {
            annotations: vec![format!("@ExceptionHandler({exception}.class)")],
            modifiers: "public".to_string(),
            ret: "ResponseEntity<ErrorResponse>".to_string(),
            name: method.to_string(),
            params: format!("{exception} ex"),
            body: Some(vec![
                format!("return {status_expr}"),
                format!("    .body(ErrorResponse.of(ErrorCode.{code}.name(), ex.getMessage(), Map.of()));"),
            ]),
        })
    };

    let members = vec![
        handler(
            "ResourceNotFoundException",
            "handleNotFound",
            "ResponseEntity.status(HttpStatus.NOT_FOUND)",
            "NOT_FOUND",
        ),
        handler(
            "DuplicateResourceException",
            "handleDuplicate",
            "ResponseEntity.status(HttpStatus.CONFLICT)",
            "DUPLICATE",
        ),
        handler(
            "ForeignKeyNotFoundException",
            "handleForeignKey",
            "ResponseEntity.unprocessableEntity()",
            "FK_NOT_FOUND",
        ),
        handler(
            "MissingRequiredFieldException",
            "handleMissingField",
            "ResponseEntity.badRequest()",
            "MISSING_REQUIRED_FIELD",
        ),
        handler(
            "InvalidValueException",
            "handleInvalidValue",
            "ResponseEntity.badRequest()",
            "VALIDATION_ERROR",
        ),
        handler(
            "ReferentialIntegrityException",
            "handleReferentialIntegrity",
            "ResponseEntity.status(HttpStatus.CONFLICT)",
            "REF_INTEGRITY",
        ),
        Member::Method(Method {
            annotations: vec!["@ExceptionHandler(MethodArgumentNotValidException.class)".to_string()],
            modifiers: "public".to_string(),
            ret: "ResponseEntity<ErrorResponse>".to_string(),
            name: "handleMethodArgNotValid".to_string(),
            params: "MethodArgumentNotValidException ex".to_string(),
            body: Some(vec![
                "Map<String, Object> details = new HashMap<>();".to_string(),
                "ex.getBindingResult().getFieldErrors()".to_string(),
                "    .forEach(err -> details.put(err.getField(), err.getDefaultMessage()));".to_string(),
                "return ResponseEntity.unprocessableEntity()".to_string(),
                "    .body(ErrorResponse.of(ErrorCode.VALIDATION_ERROR.name(), \"Validation failed\", details));".to_string(),
            ]),
        }),
        Member::Method(Method {
            annotations: vec!["@ExceptionHandler(ConstraintViolationException.class)".to_string()],
            modifiers: "public".to_string(),
            ret: "ResponseEntity<ErrorResponse>".to_string(),
            name: "handleConstraintViolation".to_string(),
            params: "ConstraintViolationException ex".to_string(),
            body: Some(vec![
                "Map<String, Object> details = new HashMap<>();".to_string(),
                "ex.getConstraintViolations().forEach(v -> details.put(v.getPropertyPath().toString(), v.getMessage()));".to_string(),
                "return ResponseEntity.unprocessableEntity()".to_string(),
                "    .body(ErrorResponse.of(ErrorCode.VALIDATION_ERROR.name(), \"Validation failed\", details));".to_string(),
            ]),
        }),
        // Safety net for constraints the application-level checks could not
        // pre-empt (races, composite shapes).
        Member::Method(Method {
            annotations: vec!["@ExceptionHandler(DataIntegrityViolationException.class)".to_string()],
            modifiers: "public".to_string(),
            ret: "ResponseEntity<ErrorResponse>".to_string(),
            name: "handleDataIntegrity".to_string(),
            params: "DataIntegrityViolationException ex".to_string(),
            body: Some(vec![
                "String constraint = extractConstraintName(ex);".to_string(),
                "ErrorCode code = ConstraintCatalog.resolve(constraint).orElse(ErrorCode.DATA_INTEGRITY);".to_string(),
                "HttpStatus status = code.name().endsWith(\"_DUPLICATE\") || code == ErrorCode.DUPLICATE".to_string(),
                "    ? HttpStatus.CONFLICT".to_string(),
                "    : HttpStatus.UNPROCESSABLE_ENTITY;".to_string(),
                "Map<String, Object> details = constraint == null ? Map.of() : Map.of(\"constraint\", constraint);".to_string(),
                "return ResponseEntity.status(status)".to_string(),
                "    .body(ErrorResponse.of(code.name(), \"Database constraint violated\", details));".to_string(),
            ]),
        }),
        // Last resort; never leaks internal failure detail to the caller.
        Member::Method(Method {
            annotations: vec!["@ExceptionHandler(Exception.class)".to_string()],
            modifiers: "public".to_string(),
            ret: "ResponseEntity<ErrorResponse>".to_string(),
            name: "handleGeneric".to_string(),
            params: "Exception ex".to_string(),
            body: Some(vec![
                "return ResponseEntity.status(HttpStatus.INTERNAL_SERVER_ERROR)".to_string(),
                "    .body(ErrorResponse.of(ErrorCode.INTERNAL_ERROR.name(), \"Unexpected error\", Map.of()));".to_string(),
            ]),
        }),
        // Best-effort diagnostic enrichment only; drivers word their messages
        // differently and resolution failures fall back to the generic code.
        Member::Method(Method {
            annotations: vec![],
            modifiers: "private".to_string(),
            ret: "String".to_string(),
            name: "extractConstraintName".to_string(),
            params: "Throwable t".to_string(),
            body: Some(vec![
                "if (t == null) return null;".to_string(),
                "String msg = String.valueOf(t.getMessage());".to_string(),
                "int i = msg.toLowerCase(Locale.ROOT).indexOf(\"constraint\");".to_string(),
                "if (i >= 0) {".to_string(),
                "    int q1 = msg.indexOf('\"', i);".to_string(),
                "    int q2 = (q1 >= 0) ? msg.indexOf('\"', q1 + 1) : -1;".to_string(),
                "    if (q1 >= 0 && q2 > q1) return msg.substring(q1 + 1, q2);".to_string(),
                "    int b1 = msg.indexOf('(', i);".to_string(),
                "    int b2 = (b1 >= 0) ? msg.indexOf(')', b1 + 1) : -1;".to_string(),
                "    if (b1 >= 0 && b2 > b1) return msg.substring(b1 + 1, b2);".to_string(),
                "}".to_string(),
                "return extractConstraintName(t.getCause());".to_string(),
            ]),
        }),
    ];

    JavaFile {
        package: format!("{package}.error"),
        imports: vec![
            "org.springframework.dao.DataIntegrityViolationException".to_string(),
            "org.springframework.http.*".to_string(),
            "org.springframework.web.bind.MethodArgumentNotValidException".to_string(),
            "org.springframework.web.bind.annotation.*".to_string(),
            "jakarta.validation.ConstraintViolationException".to_string(),
            "java.util.HashMap".to_string(),
            "java.util.Locale".to_string(),
            "java.util.Map".to_string(),
        ],
        banner: None,
        decl: TypeDecl {
            annotations: vec!["@RestControllerAdvice".to_string()],
            kind: TypeKind::Class,
            name: "GlobalExceptionHandler".to_string(),
            extends: None,
            implements: vec![],
            members,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn tables() -> Vec<Table> {
        vec![Table::new("product").columns(vec![
            Column::new("id", "BIGINT").primary_key(),
            Column::new("sku", "VARCHAR(64)").nullable(false).unique(),
            Column::new("category_id", "BIGINT").references("category", "id"),
        ])]
    }

    #[test]
    fn per_column_codes_cover_each_constraint_kind() {
        let codes = per_table_codes(&tables());
        assert_eq!(
            codes,
            [
                "PRODUCT_SKU_DUPLICATE",
                "PRODUCT_SKU_REQUIRED",
                "PRODUCT_CATEGORY_ID_FK_VIOLATION"
            ]
        );
    }

    #[test]
    fn error_code_enum_lists_generic_codes_first() {
        let source = error_code("com.example.app", &tables()).render();
        let generic = source.find("NOT_FOUND,").expect("generic code");
        let specific = source.find("PRODUCT_SKU_DUPLICATE,").expect("specific code");
        assert!(generic < specific);
        assert!(source.contains("MISSING_REQUIRED_FIELD,"));
        assert!(source.contains("DATA_INTEGRITY,"));
    }

    #[test]
    fn catalog_keys_match_changelog_constraint_names() {
        let source = constraint_catalog("com.example.app", &tables()).render();
        assert!(source.contains("byConstraint.put(\"uq_product_sku\", ErrorCode.PRODUCT_SKU_DUPLICATE);"));
        assert!(source.contains(
            "byConstraint.put(\"fk_product_category_id_category\", ErrorCode.PRODUCT_CATEGORY_ID_FK_VIOLATION);"
        ));
        assert!(source.contains("byConstraint.put(\"nn_product_sku\", ErrorCode.PRODUCT_SKU_REQUIRED);"));
    }

    #[test]
    fn handler_falls_back_to_generic_data_integrity_code() {
        let source = global_handler("com.example.app").render();
        assert!(source.contains("ConstraintCatalog.resolve(constraint).orElse(ErrorCode.DATA_INTEGRITY)"));
        assert!(source.contains("@ExceptionHandler(Exception.class)"));
        assert!(source.contains("\"Unexpected error\""));
        assert!(!source.contains("ex.toString()"));
    }
}
