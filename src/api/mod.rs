// API module entry
// Read-only lookup endpoints under /api/

mod params;
mod response;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::AppState;
use crate::logger;
use crate::routing::guard;
use crate::store::{Endpoint, QueryError};

// Re-export public types
pub use params::parse_query;
pub use response::{error_response, json_response, negotiate, EncodedBody};

/// API dispatch boundary
///
/// Every outcome, including store failures and worker panics, becomes a
/// JSON response here; nothing propagates to the connection layer.
pub async fn handle_api(
    path: &str,
    query: Option<&str>,
    accepts_gzip: bool,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let http = &state.config.http;
    let name = guard::api_endpoint(path).unwrap_or_default();

    let result = match Endpoint::from_name(name) {
        Some(endpoint) => state.store.query(endpoint, parse_query(query)).await,
        None => Err(QueryError::UnknownEndpoint(name.to_string())),
    };

    match result {
        Ok(value) => json_response(StatusCode::OK, &value, accepts_gzip, http),
        Err(e) => {
            if e.status().is_server_error() {
                logger::log_api_error(&format!("{path}: {e}"));
            }
            error_response(e.status(), &e.to_string(), accepts_gzip, http)
        }
    }
}
