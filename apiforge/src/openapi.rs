//! OpenAPI 3.0 document assembly.
//!
//! Starts from a fixed template (servers, bearer auth) and layers in what
//! the endpoint designer, schema designer and coordinator produced.

use serde_json::{Map, Value, json};

pub const OPENAPI_VERSION: &str = "3.0.0";
pub const FALLBACK_TITLE: &str = "REST API Specification";

/// The starting document every specification is built on.
pub fn template() -> Value {
    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "API Specification",
            "description": "REST API based on user requirements",
            "version": "1.0.0"
        },
        "servers": [
            {
                "url": "https://api.example.com/v1",
                "description": "Production server"
            },
            {
                "url": "https://staging-api.example.com/v1",
                "description": "Staging server"
            }
        ],
        "paths": {},
        "components": {
            "schemas": {},
            "securitySchemes": {
                "BearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT"
                }
            }
        }
    })
}

/// Title and description for the `info` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiInfo {
    pub title: String,
    pub description: String,
}

impl ApiInfo {
    /// Read `title` and `description` from the coordinator's JSON reply.
    pub fn from_json(obj: &Map<String, Value>) -> Option<Self> {
        let title = obj.get("title")?.as_str()?.trim();
        let description = obj.get("description")?.as_str()?.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    /// Used when the coordinator gave nothing usable.
    pub fn fallback(requirements: &str) -> Self {
        let first = requirements.split('.').next().unwrap_or("").trim();
        let description = if first.is_empty() {
            "REST API based on user requirements.".to_string()
        } else {
            format!("REST API based on user requirements. {first}.")
        };
        Self {
            title: FALLBACK_TITLE.to_string(),
            description,
        }
    }
}

/// Build the final document.
///
/// `endpoints` contributes its `paths` object; `schemas` becomes
/// `components.schemas` (a wrapping `schemas` key is unwrapped).
pub fn assemble(
    endpoints: Option<&Value>,
    schemas: Option<&Map<String, Value>>,
    info: &ApiInfo,
) -> Value {
    let mut spec = template();

    if let Some(paths) = endpoints.and_then(|e| e.get("paths")).filter(|p| p.is_object()) {
        spec["paths"] = paths.clone();
    }

    if let Some(schemas) = schemas {
        let inner = match schemas.get("schemas") {
            Some(Value::Object(inner)) if schemas.len() == 1 => inner.clone(),
            _ => schemas.clone(),
        };
        spec["components"]["schemas"] = Value::Object(inner);
    }

    spec["info"]["title"] = json!(info.title);
    spec["info"]["description"] = json!(info.description);
    spec["info"]["contact"] = json!({
        "name": "API Support",
        "url": "https://example.com/support",
        "email": "api-support@example.com"
    });
    spec["info"]["termsOfService"] = json!("https://example.com/terms");

    spec
}

/// True when `doc` declares an OpenAPI 3.0.x version.
pub fn is_openapi_3_0(doc: &Value) -> bool {
    doc.get("openapi")
        .and_then(Value::as_str)
        .is_some_and(|v| v.starts_with("3.0."))
}
