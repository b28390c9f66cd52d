//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path classification, method
//! validation, dispatch to the API or static handler, and access logging.

use crate::api;
use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{classify, normalize_path, PathClass};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderMap;
use hyper::{Method, Request, Response, Version};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Percent-decoded, normalized path, used for classification, file
    /// lookup and redirects
    pub path: &'a str,
    /// Path exactly as received, for the access log
    pub raw_path: &'a str,
    pub query: Option<&'a str>,
    pub accepts_gzip: bool,
    pub if_modified_since: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let (parts, _) = req.into_parts();

    let raw_path = parts.uri.path();
    let decoded = percent_decode_str(raw_path).decode_utf8_lossy();
    // Paths with `..` keep their decoded form; the guard blocks them
    let normalized = normalize_path(&decoded);
    let ctx = RequestContext {
        path: normalized.as_deref().unwrap_or(decoded.as_ref()),
        raw_path,
        query: parts.uri.query(),
        accepts_gzip: http::accepts_gzip(header_str(&parts.headers, "accept-encoding")),
        if_modified_since: header_str(&parts.headers, "if-modified-since"),
    };

    let response = route_request(&parts.method, &ctx, &state).await;

    if state.access_log_enabled() {
        log_access(
            &parts.method,
            &parts.headers,
            parts.version,
            &ctx,
            &response,
            start,
            remote_addr,
            &state,
        );
    }

    Ok(response)
}

/// Classify the path, then dispatch
async fn route_request(
    method: &Method,
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let class = classify(ctx.path);

    // Blocked paths look exactly like missing files, whatever the method
    if class == PathClass::Blocked {
        return http::build_404_response();
    }

    if let Some(resp) = check_http_method(method, class, &state.config.http.cors_origin) {
        return resp;
    }

    match class {
        PathClass::Health => http::build_health_response(),
        PathClass::Api => api::handle_api(ctx.path, ctx.query, ctx.accepts_gzip, state).await,
        PathClass::Static => static_files::serve(ctx, &state.config.http).await,
        PathClass::Blocked => http::build_404_response(),
    }
}

/// Only GET is served; API routes also answer CORS preflight
fn check_http_method(
    method: &Method,
    class: PathClass,
    cors_origin: &str,
) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET => None,
        Method::OPTIONS if class == PathClass::Api => {
            Some(http::build_options_response(cors_origin))
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response("GET"))
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[allow(clippy::too_many_arguments)]
fn log_access(
    method: &Method,
    headers: &HeaderMap,
    version: Version,
    ctx: &RequestContext<'_>,
    response: &Response<Full<Bytes>>,
    start: Instant,
    remote_addr: SocketAddr,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        method.to_string(),
        ctx.raw_path.to_string(),
    );
    entry.query = ctx.query.map(ToString::to_string);
    entry.http_version = version_str(version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or_default();
    entry.referer = header_str(headers, "referer").map(ToString::to_string);
    entry.user_agent = header_str(headers, "user-agent").map(ToString::to_string);
    entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}
