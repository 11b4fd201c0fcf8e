//! OpenAPI 3 document for the product routes, generated from the same
//! [`RouteDecl`] table the router is built from.

use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::config::DocsConfig;
use crate::router::{Operation, RouteDecl};
use crate::validation::{FieldRules, Location, RuleKind};

pub const OPENAPI_VERSION: &str = "3.0.2";

fn product_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "integer", "description": "The Product ID", "example": 1 },
            "name": { "type": "string", "description": "The Product name", "example": "Curved Monitor 49 Inches" },
            "price": { "type": "number", "description": "The Product price", "example": 300 },
            "availability": { "type": "boolean", "description": "The Product availability", "example": true },
            "created_at": { "type": "string", "format": "date-time" },
            "updated_at": { "type": "string", "format": "date-time" }
        }
    })
}

/// `/api/products/:id` -> `/api/products/{id}`
fn openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn field_schema(field: &FieldRules) -> Value {
    let mut schema = Map::new();

    if field.has(RuleKind::Int) {
        schema.insert("type".into(), json!("integer"));
    } else if field.has(RuleKind::Numeric) || field.has(RuleKind::Positive) {
        schema.insert("type".into(), json!("number"));
    } else if field.has(RuleKind::Boolean) {
        schema.insert("type".into(), json!("boolean"));
    } else {
        schema.insert("type".into(), json!("string"));
        if field.has(RuleKind::NotEmpty) {
            schema.insert("minLength".into(), json!(1));
        }
        if let Some(max) = field.max_length_limit() {
            schema.insert("maxLength".into(), json!(max));
        }
    }

    if field.has(RuleKind::Positive) {
        schema.insert("minimum".into(), json!(0));
        schema.insert("exclusiveMinimum".into(), json!(true));
    }

    let messages: Vec<&str> = field.rules.iter().map(|r| r.message).collect();
    schema.insert("description".into(), json!(messages.join("; ")));

    Value::Object(schema)
}

fn success_content(decl: &RouteDecl) -> Value {
    let schema = match decl.operation {
        Operation::List => json!({ "type": "array", "items": { "$ref": "#/components/schemas/Product" } }),
        Operation::Delete => json!({ "type": "string", "example": "Product Deleted" }),
        _ => json!({ "$ref": "#/components/schemas/Product" }),
    };

    json!({
        "application/json": {
            "schema": {
                "type": "object",
                "properties": { "data": schema }
            }
        }
    })
}

fn operation_object(decl: &RouteDecl) -> Value {
    let mut operation = json!({
        "summary": decl.summary,
        "description": decl.description,
        "tags": ["Products"],
    });

    let parameters: Vec<Value> = decl
        .rules
        .fields()
        .iter()
        .filter(|f| f.location == Location::Params)
        .map(|f| {
            json!({
                "in": "path",
                "name": f.field,
                "required": true,
                "schema": field_schema(f),
            })
        })
        .collect();
    if !parameters.is_empty() {
        operation["parameters"] = json!(parameters);
    }

    let body_fields: Vec<&FieldRules> = decl
        .rules
        .fields()
        .iter()
        .filter(|f| f.location == Location::Body)
        .collect();
    if !body_fields.is_empty() {
        let properties: Map<String, Value> = body_fields
            .iter()
            .map(|f| (f.field.to_string(), field_schema(f)))
            .collect();
        let required: Vec<&str> = body_fields.iter().map(|f| f.field).collect();

        operation["requestBody"] = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": {
                        "type": "object",
                        "properties": properties,
                        "required": required,
                    }
                }
            }
        });
    }

    let mut responses = Map::new();
    for r in &decl.responses {
        let mut body = json!({ "description": r.description });
        if (200..300).contains(&r.status) {
            body["content"] = success_content(decl);
        }
        responses.insert(r.status.to_string(), body);
    }
    operation["responses"] = Value::Object(responses);

    operation
}

/// Build the OpenAPI document for `routes`
pub fn build_spec(routes: &[RouteDecl]) -> Value {
    let mut paths = Map::new();
    for decl in routes {
        let path_item = paths
            .entry(openapi_path(decl.path))
            .or_insert_with(|| Value::Object(Map::new()));
        let method = decl.operation.method().as_str().to_ascii_lowercase();
        path_item[method] = operation_object(decl);
    }

    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "Products REST API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "API Docs for Products"
        },
        "tags": [
            { "name": "Products", "description": "API operations related to products" }
        ],
        "paths": paths,
        "components": {
            "schemas": { "Product": product_schema() }
        }
    })
}

pub fn to_yaml(spec: &Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(spec)
}

struct DocsState {
    json: String,
    yaml: String,
    page: String,
}

fn docs_page(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
  <style>.swagger-ui .topbar {{ background-color: #2b3b45 }}</style>
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({{ url: "/docs/openapi.json", dom_id: "#swagger-ui" }});
  </script>
</body>
</html>
"##
    )
}

/// `/docs`, `/docs/openapi.json` and `/docs/openapi.yaml`
pub fn docs_routes<S>(config: &DocsConfig, routes: &[RouteDecl]) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let spec = build_spec(routes);
    let json = serde_json::to_string_pretty(&spec).unwrap_or_else(|_| "{}".to_string());
    let yaml = to_yaml(&spec).unwrap_or_else(|e| {
        tracing::error!("Failed to render OpenAPI YAML: {}", e);
        String::new()
    });

    let state = Arc::new(DocsState {
        json,
        yaml,
        page: docs_page(&config.site_title),
    });

    let json_state = state.clone();
    let yaml_state = state.clone();
    let page_state = state;

    Router::new()
        .route(
            "/docs",
            get(move || {
                let page = page_state.page.clone();
                async move { Html(page) }
            }),
        )
        .route(
            "/docs/openapi.json",
            get(move || {
                let body = json_state.json.clone();
                async move { ([(header::CONTENT_TYPE, "application/json")], body).into_response() }
            }),
        )
        .route(
            "/docs/openapi.yaml",
            get(move || {
                let body = yaml_state.yaml.clone();
                async move { ([(header::CONTENT_TYPE, "application/yaml")], body).into_response() }
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::product_routes;

    #[test]
    fn converts_path_params() {
        assert_eq!(openapi_path("/api/products/:id"), "/api/products/{id}");
        assert_eq!(openapi_path("/api/products"), "/api/products");
    }

    #[test]
    fn documents_every_product_route() {
        let spec = build_spec(&product_routes());
        let paths = &spec["paths"];

        for method in ["get", "post"] {
            assert!(paths["/api/products"][method].is_object(), "missing {method} /api/products");
        }
        for method in ["get", "put", "patch", "delete"] {
            assert!(paths["/api/products/{id}"][method].is_object(), "missing {method} /api/products/{{id}}");
        }
        assert_eq!(spec["openapi"], OPENAPI_VERSION);
        assert!(spec["components"]["schemas"]["Product"].is_object());
    }

    #[test]
    fn request_bodies_follow_rules() {
        let spec = build_spec(&product_routes());

        let create = &spec["paths"]["/api/products"]["post"];
        let schema = &create["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(schema["properties"]["price"]["type"], "number");
        assert_eq!(schema["properties"]["price"]["exclusiveMinimum"], true);
        assert_eq!(schema["properties"]["name"]["minLength"], 1);
        assert_eq!(schema["properties"]["name"]["maxLength"], 100);
        assert!(schema["properties"].get("availability").is_none());

        let replace = &spec["paths"]["/api/products/{id}"]["put"];
        let schema = &replace["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(schema["properties"]["availability"]["type"], "boolean");
        assert_eq!(replace["parameters"][0]["schema"]["type"], "integer");

        // toggle takes no body
        assert!(spec["paths"]["/api/products/{id}"]["patch"].get("requestBody").is_none());
    }

    #[test]
    fn renders_yaml() {
        let spec = build_spec(&product_routes());
        let yaml = to_yaml(&spec).unwrap();
        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, spec);
    }
}
