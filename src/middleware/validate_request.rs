use axum::{
    body::{to_bytes, Body},
    extract::{RawPathParams, Request, State},
    middleware::Next,
    response::Response,
    RequestExt,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::validation::{gate, RuleSet};

/// Per-route state for [`validate_request`]
#[derive(Clone)]
pub struct RouteGate {
    pub rules: Arc<RuleSet>,
    pub body_limit: usize,
}

impl RouteGate {
    pub fn new(rules: RuleSet, body_limit: usize) -> Self {
        Self {
            rules: Arc::new(rules),
            body_limit,
        }
    }
}

/// The JSON body the gate parsed, handed on to the handler.
///
/// Only present on routes whose rules read the body.
#[derive(Debug, Clone)]
pub struct ValidatedBody(pub Value);

/// Evaluate the route's rules and halt with 400 on any violation.
///
/// Routes without body rules never look at the body, so whatever a client
/// sends there is passed through untouched.
pub async fn validate_request(
    State(gate_state): State<RouteGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let rules = &gate_state.rules;

    let params: HashMap<String, String> = if rules.reads_params() {
        match request.extract_parts::<RawPathParams>().await {
            Ok(raw) => raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            // Undecodable segments fail the param rules like any other bad value
            Err(_) => HashMap::new(),
        }
    } else {
        HashMap::new()
    };

    let body = if rules.reads_body() {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, gate_state.body_limit)
            .await
            .map_err(|_| ApiError::malformed_body("Request body too large or unreadable"))?;

        let payload = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice::<Value>(&bytes)
                .map_err(|e| ApiError::malformed_body(format!("Malformed JSON body: {}", e)))?
        };

        request = Request::from_parts(parts, Body::from(bytes));
        payload
    } else {
        Value::Null
    };

    let violations = rules.evaluate(&params, &body);
    if !violations.is_empty() {
        tracing::debug!(
            "Rejected {} {}: {} violation(s)",
            request.method(),
            request.uri().path(),
            violations.len()
        );
    }
    gate(violations)?;

    if rules.reads_body() {
        request.extensions_mut().insert(ValidatedBody(body));
    }

    Ok(next.run(request).await)
}
