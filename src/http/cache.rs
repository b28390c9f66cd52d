//! HTTP cache control module
//!
//! Provides `Cache-Control` policies and `Last-Modified` handling.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// IMF-fixdate layout used by `Last-Modified` / `If-Modified-Since`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u64),
    /// Revalidate on every use
    NoCache,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

/// Format a timestamp as an HTTP date
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Check the client's `If-Modified-Since` against the file's mtime
///
/// Returns true when the client copy is current (should return 304).
/// Unparseable dates are ignored.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(|v| DateTime::parse_from_rfc2822(v.trim()).ok())
    else {
        return false;
    };
    // HTTP dates carry whole seconds only
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_cache_policy() {
        assert_eq!(
            CachePolicy::Public(86_400).to_header_value(),
            "public, max-age=86400"
        );
        assert_eq!(CachePolicy::NoCache.to_header_value(), "no-cache");
    }

    #[test]
    fn test_format_http_date() {
        let t = UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(format_http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_not_modified_since() {
        let mtime = UNIX_EPOCH + Duration::from_millis(784_111_777_250);
        assert!(not_modified_since(
            Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            mtime
        ));
        assert!(not_modified_since(
            Some("Mon, 07 Nov 1994 08:49:37 GMT"),
            mtime
        ));
        assert!(!not_modified_since(
            Some("Sat, 05 Nov 1994 08:49:37 GMT"),
            mtime
        ));
        assert!(!not_modified_since(Some("yesterday"), mtime));
        assert!(!not_modified_since(None, mtime));
    }
}
