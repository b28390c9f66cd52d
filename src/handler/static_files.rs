//! Static file serving module
//!
//! Resolves request paths under the asset root. Compressible files are
//! gzipped in memory when the client accepts it; everything else goes
//! through a byte-exact passthrough.

use crate::config::HttpConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, encoding, mime, CachePolicy};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Bytes escaped when a decoded path is written back into `Location`
const LOCATION_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Serve a static asset
pub async fn serve(ctx: &RequestContext<'_>, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    let Some(file_path) = resolve_path(&http_config.root, ctx.path).await else {
        return http::build_404_response();
    };

    let content_type = content_type_for(&file_path);
    if ctx.accepts_gzip && mime::is_compressible(content_type) {
        if let Some(resp) = serve_compressed(&file_path, content_type, http_config).await {
            return resp;
        }
    }

    serve_passthrough(ctx, &file_path, http_config).await
}

/// Map a decoded request path to a location under `root`
///
/// Returns `None` for anything that would leave the root, whether through
/// `..` segments or a symlink pointing outside it. Paths that don't exist
/// are returned as-is; the passthrough answers those with 404.
pub async fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
                return None;
            }
        }
    }

    // Missing files can't escape; let the passthrough 404 them
    let Ok(canonical) = fs::canonicalize(&resolved).await else {
        return Some(resolved);
    };
    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            canonical.display()
        ));
        return None;
    }

    Some(resolved)
}

fn content_type_for(path: &Path) -> &'static str {
    mime::get_content_type(path.extension().and_then(|e| e.to_str()))
}

fn is_image(path: &Path) -> bool {
    mime::is_image_extension(path.extension().and_then(|e| e.to_str()))
}

/// Gzip a regular, readable file; `None` hands the request to the passthrough
async fn serve_compressed(
    file_path: &Path,
    content_type: &str,
    http_config: &HttpConfig,
) -> Option<Response<Full<Bytes>>> {
    let metadata = fs::metadata(file_path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }

    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read '{}', falling back to passthrough: {e}",
                file_path.display()
            ));
            return None;
        }
    };
    let compressed = encoding::gzip(&content).ok()?;

    let resp = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Encoding", "gzip")
        .header("Content-Length", compressed.len())
        .header(
            "Cache-Control",
            CachePolicy::Public(http_config.static_max_age).to_header_value(),
        )
        .header("Vary", "Accept-Encoding")
        .body(Full::new(Bytes::from(compressed)));

    match resp {
        Ok(r) => Some(r),
        Err(e) => {
            http::response::log_build_error("gzip", &e);
            None
        }
    }
}

/// Byte-exact transfer of whatever is at `file_path`
///
/// Directories redirect to their slash form, then serve an index file.
/// Image types get the long-lived cache directive; nothing is compressed.
async fn serve_passthrough(
    ctx: &RequestContext<'_>,
    file_path: &Path,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    let Ok(metadata) = fs::metadata(file_path).await else {
        return http::build_404_response();
    };

    let file_path = if metadata.is_dir() {
        if !ctx.path.ends_with('/') {
            // Built from the normalized path, so it always has a single leading slash
            let location = utf8_percent_encode(ctx.path, LOCATION_PATH);
            let target = match ctx.query {
                Some(q) => format!("{location}/?{q}"),
                None => format!("{location}/"),
            };
            return http::build_redirect_response(&target);
        }
        match find_index_file(file_path, &http_config.index_files).await {
            Some(index) => index,
            None => return http::build_404_response(),
        }
    } else {
        file_path.to_path_buf()
    };

    let last_modified = fs::metadata(&file_path)
        .await
        .and_then(|m| m.modified())
        .ok();
    if let Some(modified) = last_modified {
        if cache::not_modified_since(ctx.if_modified_since, modified) {
            return http::build_304_response(&cache::format_http_date(modified));
        }
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return http::build_404_response();
        }
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type_for(&file_path))
        .header("Content-Length", content.len());
    if let Some(modified) = last_modified {
        builder = builder.header("Last-Modified", cache::format_http_date(modified));
    }
    if is_image(&file_path) {
        builder = builder.header(
            "Cache-Control",
            CachePolicy::Public(http_config.static_max_age).to_header_value(),
        );
    }

    builder
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            http::response::log_build_error("200", &e);
            http::build_404_response()
        })
}

async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for name in index_files {
        let candidate = dir.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}
