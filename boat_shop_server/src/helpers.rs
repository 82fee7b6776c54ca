use actix_web::HttpRequest;
use boat_order_engine::OrderFlowError;
use log::*;
use rand::Rng;

use crate::errors::ServerError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The id that ties log lines to a request: the `x-request-id` header if the caller (or a proxy) sent one, otherwise a
/// fresh random id.
pub fn request_id(req: &HttpRequest) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("{:016x}", rand::thread_rng().gen::<u64>()))
}

/// Converts an engine error into a response error. Storage failures are logged with the request id first, since the
/// response body does not carry their details.
pub fn flow_error(req: &HttpRequest, e: OrderFlowError) -> ServerError {
    if let OrderFlowError::StorageError(inner) = &e {
        error!("💻️ [{}] {} {} failed. {inner}", request_id(req), req.method(), req.path());
    }
    ServerError::OrderFlow(e)
}
