pub mod response;
pub mod validate_request;

pub use response::{ApiResponse, ApiResult};
pub use validate_request::{validate_request, RouteGate, ValidatedBody};
