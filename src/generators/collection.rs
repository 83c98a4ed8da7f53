//! API call-catalog export: one collection with a folder per table covering
//! the standard list/get/create/update/patch/delete calls, plus an
//! environment file with base-URL and basic-auth placeholders.
//!
//! Sample request bodies are synthesized from column types; identifiers in
//! paths follow the same key-shape decision as the controllers (one segment
//! per key part for composite keys).

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::GeneratorConfig;
use crate::derive::KeyShape;
use crate::naming::{fk_base, path_segment, to_camel_case, to_lower_camel};
use crate::schema::Table;
use crate::generators::write_file;

const SCHEMA_URL: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Columns never present in request bodies: supplied by the system, not the
/// caller.
const SYSTEM_BODY_COLUMNS: [&str; 5] = ["id", "uuid", "created_at", "updated_at", "version"];

#[derive(Serialize)]
struct Collection {
    info: Info,
    auth: Auth,
    variable: Vec<Variable>,
    item: Vec<Folder>,
}

#[derive(Serialize)]
struct Info {
    name: String,
    #[serde(rename = "_postman_id")]
    postman_id: String,
    description: String,
    schema: String,
}

#[derive(Serialize)]
struct Auth {
    #[serde(rename = "type")]
    auth_type: String,
    basic: Vec<AuthParam>,
}

#[derive(Serialize)]
struct AuthParam {
    key: String,
    value: String,
    #[serde(rename = "type")]
    param_type: String,
}

#[derive(Serialize)]
struct Variable {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct Folder {
    name: String,
    item: Vec<Item>,
}

#[derive(Serialize)]
struct Item {
    name: String,
    request: Request,
    response: Vec<ExampleResponse>,
}

#[derive(Serialize)]
struct Request {
    description: String,
    method: String,
    header: Vec<Header>,
    url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Body>,
}

#[derive(Serialize)]
struct Header {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct Url {
    raw: String,
    host: Vec<String>,
    path: Vec<String>,
}

#[derive(Serialize)]
struct Body {
    mode: String,
    raw: String,
}

#[derive(Serialize)]
struct ExampleResponse {
    name: String,
    status: String,
    code: u16,
    header: Vec<Header>,
    body: String,
}

#[derive(Serialize)]
struct Environment {
    id: String,
    name: String,
    values: Vec<EnvValue>,
    #[serde(rename = "_postman_variable_scope")]
    scope: String,
    #[serde(rename = "_postman_exported_using")]
    exported_using: String,
}

#[derive(Serialize)]
struct EnvValue {
    key: String,
    value: String,
    #[serde(rename = "type")]
    value_type: String,
    enabled: bool,
}

pub fn generate(config: &GeneratorConfig, tables: &[Table]) -> Result<()> {
    let collection = Collection {
        info: Info {
            name: config.collection_name.clone(),
            postman_id: "auto-generated".to_string(),
            description: "Auto-generated collection for API testing (Basic Auth). Set username/password in the environment.".to_string(),
            schema: SCHEMA_URL.to_string(),
        },
        auth: Auth {
            auth_type: "basic".to_string(),
            basic: vec![
                AuthParam {
                    key: "username".to_string(),
                    value: "{{username}}".to_string(),
                    param_type: "string".to_string(),
                },
                AuthParam {
                    key: "password".to_string(),
                    value: "{{password}}".to_string(),
                    param_type: "string".to_string(),
                },
            ],
        },
        variable: vec![
            Variable {
                key: "baseUrl".to_string(),
                value: config.base_url.trim_end_matches('/').to_string(),
            },
            Variable {
                key: "uuid".to_string(),
                value: "00000000-0000-0000-0000-000000000000".to_string(),
            },
        ],
        item: tables
            .iter()
            .map(|t| folder(config.api_base_trimmed(), t))
            .collect(),
    };
    write_file(&config.collection_out, &to_pretty_json(&collection)?)?;

    let environment = Environment {
        id: "auto-generated-env".to_string(),
        name: config.environment_name.clone(),
        values: vec![
            EnvValue {
                key: "baseUrl".to_string(),
                value: config.base_url.trim_end_matches('/').to_string(),
                value_type: "default".to_string(),
                enabled: true,
            },
            EnvValue {
                key: "username".to_string(),
                value: "admin".to_string(),
                value_type: "secret".to_string(),
                enabled: true,
            },
            EnvValue {
                key: "password".to_string(),
                value: "admin".to_string(),
                value_type: "secret".to_string(),
                enabled: true,
            },
            EnvValue {
                key: "uuid".to_string(),
                value: "00000000-0000-0000-0000-000000000000".to_string(),
                value_type: "default".to_string(),
                enabled: true,
            },
        ],
        scope: "environment".to_string(),
        exported_using: "crudgen".to_string(),
    };
    write_file(&config.env_out, &to_pretty_json(&environment)?)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Sample value for one column type, used in synthesized request bodies.
fn sample_value(sql_type: &str) -> Value {
    let s = sql_type.trim().to_uppercase();
    if s.starts_with("VARCHAR") || s.starts_with("CHAR") || s.starts_with("TEXT") {
        return json!("string");
    }
    if s.starts_with("UUID") {
        return json!("{{uuid}}");
    }
    if s.starts_with("NUMERIC") || s.starts_with("DECIMAL") {
        return json!(0.0);
    }
    if s.starts_with("BIGINT") || s.starts_with("INT") || s.starts_with("SMALLINT") {
        return json!(1);
    }
    if s.starts_with("BOOLEAN") {
        return json!(false);
    }
    if s.contains("TIMESTAMP") || s.contains("DATE") || s.contains("TIME") {
        return json!("2025-01-01T00:00:00Z");
    }
    json!("value")
}

/// Sample request body: business columns only, foreign keys flattened to
/// their scalar identifier fields.
fn sample_body(table: &Table) -> Map<String, Value> {
    let mut body = Map::new();
    for col in &table.columns {
        if SYSTEM_BODY_COLUMNS.contains(&col.name.as_str()) || col.primary_key {
            continue;
        }
        if col.foreign_key.is_some() {
            body.insert(to_lower_camel(&format!("{}_id", fk_base(&col.name))), json!(1));
        } else {
            body.insert(col.name.clone(), sample_value(&col.sql_type));
        }
    }
    body
}

/// curl transcript embedded in the request description.
fn curl_for(method: &str, url: &str, body: Option<&Map<String, Value>>) -> String {
    let base = format!("curl -u \"{{{{username}}}}:{{{{password}}}}\" -X {method} \"{{{{baseUrl}}}}{url}\"");
    match body {
        None => base,
        Some(body) => {
            let json = serde_json::to_string_pretty(&Value::Object(body.clone()))
                .unwrap_or_else(|_| "{}".to_string());
            format!("{base} \\\n  -H \"Content-Type: application/json\" \\\n  -d '{json}'")
        }
    }
}

fn request(name: &str, method: &str, url_path: &str, body: Option<&Map<String, Value>>) -> Item {
    Item {
        name: name.to_string(),
        request: Request {
            description: curl_for(method, url_path, body),
            method: method.to_string(),
            header: vec![Header {
                key: "Content-Type".to_string(),
                value: "application/json".to_string(),
            }],
            url: Url {
                raw: format!("{{{{baseUrl}}}}{url_path}"),
                host: vec!["{{baseUrl}}".to_string()],
                path: url_path.trim_matches('/').split('/').map(str::to_string).collect(),
            },
            body: body.map(|b| Body {
                mode: "raw".to_string(),
                raw: serde_json::to_string_pretty(&Value::Object(b.clone()))
                    .unwrap_or_else(|_| "{}".to_string()),
            }),
        },
        response: vec![ExampleResponse {
            name: format!("Example {name}"),
            status: "OK".to_string(),
            code: 200,
            header: vec![],
            body: "{}".to_string(),
        }],
    }
}

fn folder(api_base: &str, table: &Table) -> Folder {
    let url_base = format!("{api_base}/{}", path_segment(&table.name));

    let id_path = match KeyShape::of(table) {
        KeyShape::Composite(pk_cols) => pk_cols
            .iter()
            .map(|c| format!("{{{}}}", c.name))
            .collect::<Vec<_>>()
            .join("/"),
        _ => "{id}".to_string(),
    };

    let body = sample_body(table);
    let body = if body.is_empty() {
        let mut fallback = Map::new();
        fallback.insert("note".to_string(), json!("fill body"));
        fallback
    } else {
        body
    };

    Folder {
        name: to_camel_case(&table.name),
        item: vec![
            request("List All", "GET", &url_base, None),
            request("List Page", "GET", &format!("{url_base}/page"), None),
            request("List Sorted", "GET", &format!("{url_base}/sorted"), None),
            request(
                &format!("Get by ID ({id_path})"),
                "GET",
                &format!("{url_base}/{id_path}"),
                None,
            ),
            request("Get by UUID", "GET", &format!("{url_base}/uuid/{{uuid}}"), None),
            request("Create", "POST", &url_base, Some(&body)),
            request(
                &format!("Update (PUT) {id_path}"),
                "PUT",
                &format!("{url_base}/{id_path}"),
                Some(&body),
            ),
            request(
                &format!("Patch (Partial) {id_path}"),
                "PATCH",
                &format!("{url_base}/{id_path}"),
                Some(&body),
            ),
            request(
                &format!("Delete by ID {id_path}"),
                "DELETE",
                &format!("{url_base}/{id_path}"),
                None,
            ),
            request(
                "Delete by UUID",
                "DELETE",
                &format!("{url_base}/uuid/{{uuid}}"),
                None,
            ),
        ],
    }
}
