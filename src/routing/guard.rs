//! Request path classification
//!
//! Decides, from the decoded path alone, whether a request is refused,
//! answered by the health check, handed to the API, or served from disk.

use std::path::Path;

/// Health check route
pub const HEALTH_PATH: &str = "/health";

/// Prefix under which API endpoints live
pub const API_PREFIX: &str = "/api/";

/// Extensions that are never served (server sources, compiled artifacts,
/// databases and their side files, logs, server configuration)
pub const DENIED_EXTENSIONS: &[&str] = &[
    "py",
    "pyc",
    "pyo",
    "rs",
    "db",
    "sqlite",
    "sqlite3",
    "db-journal",
    "db-wal",
    "db-shm",
    "log",
    "toml",
    "lock",
];

/// Path prefixes that are never served, compared case-insensitively
pub const DENIED_PREFIXES: &[&str] = &[
    "/.git",
    "/.env",
    "/.gitignore",
    "/.vscode",
    "/.idea",
    "/.claude",
    "/node_modules",
    "/__pycache__",
    "/target/",
];

/// Where a request goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Answer 404 without looking at the disk
    Blocked,
    Health,
    Api,
    Static,
}

/// Classify a percent-decoded request path
pub fn classify(path: &str) -> PathClass {
    if is_denied(path) {
        PathClass::Blocked
    } else if path == HEALTH_PATH {
        PathClass::Health
    } else if path.starts_with(API_PREFIX) {
        PathClass::Api
    } else {
        PathClass::Static
    }
}

/// Collapse repeated `/` and drop `.` segments
///
/// A trailing slash survives. Returns `None` when any segment is `..`.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            part => {
                normalized.push('/');
                normalized.push_str(part);
            }
        }
    }

    if normalized.is_empty() || path.ends_with('/') {
        normalized.push('/');
    }
    Some(normalized)
}

/// Whether the path hits the extension deny-set or a sensitive prefix
///
/// Checked on the normalized form, so `//.git` and `/./.env` are caught;
/// paths with `..` segments are always denied.
pub fn is_denied(path: &str) -> bool {
    let Some(normalized) = normalize_path(path) else {
        return true;
    };
    let lower = normalized.to_ascii_lowercase();

    if DENIED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }

    Path::new(&lower)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DENIED_EXTENSIONS.contains(&ext))
}

/// Endpoint name of an API path (`/api/brands/` -> `brands`)
pub fn api_endpoint(path: &str) -> Option<&str> {
    path.strip_prefix(API_PREFIX)
        .map(|rest| rest.trim_end_matches('/'))
}
