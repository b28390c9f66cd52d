//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the API
//! and static file handlers that build on it.

pub mod cache;
pub mod encoding;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use encoding::accepts_gzip;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_health_response,
    build_options_response, build_redirect_response,
};
