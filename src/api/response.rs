// API response composition
// JSON serialization, gzip negotiation, CORS and cache headers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;
use crate::http::{encoding, CachePolicy};
use crate::logger;

/// Negotiated body bytes, ready to send
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub gzipped: bool,
}

/// Compress `body` when the client accepts gzip and it is larger than `min_size`
///
/// Falls back to the identity encoding if compression fails.
pub fn negotiate(body: Vec<u8>, accepts_gzip: bool, min_size: usize) -> EncodedBody {
    if !accepts_gzip || body.len() <= min_size {
        return EncodedBody {
            bytes: body,
            gzipped: false,
        };
    }
    match encoding::gzip(&body) {
        Ok(bytes) => EncodedBody {
            bytes,
            gzipped: true,
        },
        Err(e) => {
            logger::log_warning(&format!("gzip failed, sending identity body: {e}"));
            EncodedBody {
                bytes: body,
                gzipped: false,
            }
        }
    }
}

/// Build JSON response
///
/// Non-ASCII text is written as UTF-8, not escaped. Always carries the
/// configured CORS origin and `Cache-Control: no-cache`.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    accepts_gzip: bool,
    http: &HttpConfig,
) -> Response<Full<Bytes>> {
    let (status, json) = match serde_json::to_vec(body) {
        Ok(j) => (status, j),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"Internal server error"}"#.to_vec(),
            )
        }
    };

    let encoded = negotiate(json, accepts_gzip, http.gzip_min_size);

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .header("Content-Length", encoded.bytes.len())
        .header("Access-Control-Allow-Origin", http.cors_origin.as_str())
        .header("Cache-Control", CachePolicy::NoCache.to_header_value())
        .header("Vary", "Accept-Encoding");
    if encoded.gzipped {
        builder = builder.header("Content-Encoding", "gzip");
    }

    builder
        .body(Full::new(Bytes::from(encoded.bytes)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            let mut resp = Response::new(Full::new(Bytes::from_static(
                br#"{"error":"Internal server error"}"#,
            )));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

/// `{"error": message}` with the given status
pub fn error_response(
    status: StatusCode,
    message: &str,
    accepts_gzip: bool,
    http: &HttpConfig,
) -> Response<Full<Bytes>> {
    json_response(
        status,
        &serde_json::json!({ "error": message }),
        accepts_gzip,
        http,
    )
}
