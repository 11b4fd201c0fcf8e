use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::config::SecurityConfig;
use crate::database::NAME_MAX_CHARS;
use crate::handlers;
use crate::middleware::{validate_request, RouteGate};
use crate::state::AppState;
use crate::validation::{FieldRules, RuleSet};

pub const PRODUCTS_PATH: &str = "/api/products";
pub const PRODUCT_PATH: &str = "/api/products/:id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Replace,
    ToggleAvailability,
    Delete,
}

impl Operation {
    pub fn method(self) -> Method {
        match self {
            Operation::List | Operation::Get => Method::GET,
            Operation::Create => Method::POST,
            Operation::Replace => Method::PUT,
            Operation::ToggleAvailability => Method::PATCH,
            Operation::Delete => Method::DELETE,
        }
    }

    fn endpoint(self) -> MethodRouter<AppState> {
        match self {
            Operation::List => get(handlers::list_products),
            Operation::Get => get(handlers::get_product),
            Operation::Create => post(handlers::create_product),
            Operation::Replace => put(handlers::replace_product),
            Operation::ToggleAvailability => patch(handlers::toggle_availability),
            Operation::Delete => delete(handlers::delete_product),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentedResponse {
    pub status: u16,
    pub description: &'static str,
}

/// One product endpoint: where it lives, what it validates, what it answers.
/// Both the router and the API docs are built from these.
#[derive(Debug, Clone)]
pub struct RouteDecl {
    pub path: &'static str,
    pub operation: Operation,
    pub summary: &'static str,
    pub description: &'static str,
    pub rules: RuleSet,
    pub responses: Vec<DocumentedResponse>,
}

fn response(status: u16, description: &'static str) -> DocumentedResponse {
    DocumentedResponse { status, description }
}

fn id_param() -> FieldRules {
    FieldRules::param("id").is_int("Invalid ID")
}

fn name_field() -> FieldRules {
    FieldRules::body("name")
        .not_empty("Product name must not be empty")
        .max_length(NAME_MAX_CHARS, "Product name must be at most 100 characters")
}

fn price_field() -> FieldRules {
    FieldRules::body("price")
        .is_numeric("Invalid price value")
        .not_empty("Product price must not be empty")
        .positive("Product price must be greater than zero")
}

fn availability_field() -> FieldRules {
    FieldRules::body("availability").is_boolean("Invalid availability value")
}

pub fn product_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl {
            path: PRODUCTS_PATH,
            operation: Operation::List,
            summary: "Get a list of products",
            description: "Return every product, most recently created first",
            rules: RuleSet::new(),
            responses: vec![response(200, "Successful response")],
        },
        RouteDecl {
            path: PRODUCT_PATH,
            operation: Operation::Get,
            summary: "Get a product by ID",
            description: "Return a product based on its unique ID",
            rules: RuleSet::new().field(id_param()),
            responses: vec![
                response(200, "Successful response"),
                response(400, "Bad Request - Invalid ID"),
                response(404, "Not found"),
            ],
        },
        RouteDecl {
            path: PRODUCTS_PATH,
            operation: Operation::Create,
            summary: "Creates a new product",
            description: "Returns a new record in the database",
            rules: RuleSet::new().field(name_field()).field(price_field()),
            responses: vec![
                response(201, "Product created successfully"),
                response(400, "Bad Request - invalid input data"),
            ],
        },
        RouteDecl {
            path: PRODUCT_PATH,
            operation: Operation::Replace,
            summary: "Updates a product with user input",
            description: "Returns the updated product",
            rules: RuleSet::new()
                .field(id_param())
                .field(name_field())
                .field(price_field())
                .field(availability_field()),
            responses: vec![
                response(200, "Successful response"),
                response(400, "Bad Request - Invalid ID or invalid input data"),
                response(404, "Product Not Found"),
            ],
        },
        RouteDecl {
            path: PRODUCT_PATH,
            operation: Operation::ToggleAvailability,
            summary: "Update product availability",
            description: "Flips the availability of the product and returns it",
            rules: RuleSet::new().field(id_param()),
            responses: vec![
                response(200, "Successful response"),
                response(400, "Bad Request - Invalid ID"),
                response(404, "Product Not Found"),
            ],
        },
        RouteDecl {
            path: PRODUCT_PATH,
            operation: Operation::Delete,
            summary: "Delete the product by a given ID",
            description: "Returns a confirmation message",
            rules: RuleSet::new().field(id_param()),
            responses: vec![
                response(200, "Successful response"),
                response(400, "Bad Request - Invalid ID"),
                response(404, "Product Not Found"),
            ],
        },
    ]
}

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_bytes;

    let mut router = Router::new().route("/health", get(handlers::health::health));

    for decl in product_routes() {
        let mut endpoint = decl.operation.endpoint();
        // [rules..., gate] run after routing, so path params are available
        if !decl.rules.is_empty() {
            endpoint = endpoint.route_layer(from_fn_with_state(
                RouteGate::new(decl.rules, body_limit),
                validate_request,
            ));
        }
        router = router.route(decl.path, endpoint);
    }

    if state.config.docs.enabled {
        router = router.merge(api::openapi::docs_routes(&state.config.docs, &product_routes()));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.security))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    match security.cors_origin.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}; no origin will be allowed", origin);
                layer
            }
        },
        None => layer,
    }
}
