//! End-to-end tests for static serving and the path guard

mod common;

use hyper::{Method, StatusCode};

use common::{body_bytes, header, Fixture};

#[tokio::test]
async fn test_root_serves_index() {
    let fx = Fixture::new();
    let resp = fx.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(body_bytes(resp).await.as_ref(), b"<html>petronox</html>");
}

#[tokio::test]
async fn test_guarded_files_are_404_even_when_present() {
    let fx = Fixture::new();
    for name in ["server.py", "config.toml", "server.log", "Cargo.lock"] {
        std::fs::write(fx.dir.path().join(name), "secret").unwrap();
    }
    std::fs::create_dir(fx.dir.path().join(".git")).unwrap();
    std::fs::write(fx.dir.path().join(".git/config"), "secret").unwrap();
    std::fs::write(fx.dir.path().join(".env"), "TOKEN=secret").unwrap();

    for uri in [
        "/petronox.db",
        "/server.py",
        "/config.toml",
        "/server.log",
        "/Cargo.lock",
        "/.git/config",
        "/.env",
        "/%2Egit/config",
        "/server%2Epy",
        "//.git/config",
        "/./.env",
        "/.//.env",
        "/%2F.git/config",
        "/js/../.env",
    ] {
        let resp = fx.get(uri).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = body_bytes(resp).await;
        assert!(!String::from_utf8_lossy(&body).contains("secret"), "{uri}");
    }
}

#[tokio::test]
async fn test_guarded_paths_ignore_method() {
    let fx = Fixture::new();
    let resp = fx.send(Method::POST, "/petronox.db", &[]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_is_404() {
    let fx = Fixture::new();
    for uri in ["/../etc/passwd", "/%2E%2E/etc/passwd", "/css/..%2F..%2Fetc/passwd"] {
        let resp = fx.get(uri).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let fx = Fixture::new();
    let resp = fx.get("/nope.html").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stylesheet_gzipped_with_cache_header() {
    let fx = Fixture::new();
    std::fs::write(fx.dir.path().join("app.css"), "body { margin: 0; }\n".repeat(50)).unwrap();

    let resp = fx
        .send(Method::GET, "/app.css", &[("accept-encoding", "gzip")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-encoding"), Some("gzip"));
    assert_eq!(header(&resp, "cache-control"), Some("public, max-age=86400"));
    assert_eq!(header(&resp, "vary"), Some("Accept-Encoding"));
}

#[tokio::test]
async fn test_image_not_compressed() {
    let fx = Fixture::new();
    std::fs::write(fx.dir.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let resp = fx
        .send(Method::GET, "/logo.png", &[("accept-encoding", "gzip")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-encoding"), None);
    assert_eq!(header(&resp, "cache-control"), Some("public, max-age=86400"));
    assert_eq!(body_bytes(resp).await.as_ref(), &[0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_static_rejects_other_methods() {
    let fx = Fixture::new();
    for method in [Method::POST, Method::OPTIONS, Method::HEAD] {
        let resp = fx.send(method.clone(), "/index.html", &[]).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
}

#[tokio::test]
async fn test_directory_redirect_stays_on_host() {
    let fx = Fixture::new();
    std::fs::create_dir(fx.dir.path().join("evil.example")).unwrap();

    for uri in ["//evil.example", "///evil.example", "/.//evil.example", "/%2Fevil.example"] {
        let resp = fx.get(uri).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY, "{uri}");
        assert_eq!(header(&resp, "location"), Some("/evil.example/"), "{uri}");
    }

    let resp = fx.get("//evil.example?lang=de").await;
    assert_eq!(header(&resp, "location"), Some("/evil.example/?lang=de"));
}
