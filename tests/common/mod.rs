//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use rusqlite::Connection;

use petronox_server::config::{AppState, Config, HttpConfig, LoggingConfig, ServerConfig, StoreConfig};
use petronox_server::handler::handle_request;
use petronox_server::store::SCHEMA;

const SEED: &str = "
INSERT INTO categories (id, name) VALUES (1, 'Cars'), (2, 'Motorcycles');
INSERT INTO brands (id, category_id, name) VALUES (1, 1, 'BMW'), (2, 1, 'Audi'), (3, 2, 'Ducati');
INSERT INTO models (id, brand_id, name) VALUES (1, 1, '3 Series'), (2, 2, 'A4');
INSERT INTO types (id, model_id, name) VALUES (1, 1, '320d'), (2, 1, '330i'), (3, 2, '2.0 TDI');
INSERT INTO components (id, type_id, name, sort_order) VALUES
    (1, 1, 'Engine', 0),
    (2, 1, 'Transmission', 1),
    (3, 2, 'Engine', 0);
INSERT INTO oil_sections (component_id, section_key, oil_names, oil_properties) VALUES
    (1, 'normal', '[\"Petronox Ultra 5W-30\"]', '{\"capacity\": \"5.2 l\"}'),
    (1, 'severe', '[\"Petronox Pro 0W-30\"]', '{\"interval\": \"15000 km\"}'),
    (2, 'normal', '[\"Petronox ATF\"]', '{}');
INSERT INTO search_index (type_name, category, brand, model, type_lower) VALUES
    ('320d', 'Cars', 'BMW', '3 Series', '320d'),
    ('320d', 'Cars', 'BMW', '3 Series', '320d'),
    ('330i', 'Cars', 'BMW', '3 Series', '330i'),
    ('2.0 TDI', 'Cars', 'Audi', 'A4', '2.0 tdi');
INSERT INTO products (id, name, description) VALUES
    (1, 'Petronox Ultra 5W-30', 'Fully synthetic engine oil'),
    (2, 'Petronox ATF', 'Automatic transmission fluid');
";

/// A seeded database plus a static root, both removed on drop
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub state: Arc<AppState>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("petronox.db");
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SEED).unwrap();
        drop(conn);

        std::fs::write(dir.path().join("index.html"), "<html>petronox</html>").unwrap();
        let state = Arc::new(AppState::new(config(db, dir.path())));
        Self { dir, state }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("petronox.db")
    }

    /// Run extra SQL against the backing file
    pub fn exec(&self, sql: &str) {
        let conn = Connection::open(self.db_path()).unwrap();
        conn.execute_batch(sql).unwrap();
    }

    pub async fn get(&self, uri: &str) -> Response<Full<Bytes>> {
        self.send(Method::GET, uri, &[]).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> Response<Full<Bytes>> {
        send(Arc::clone(&self.state), method, uri, headers).await
    }
}

pub async fn send(
    state: Arc<AppState>,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
) -> Response<Full<Bytes>> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Empty::<Bytes>::new()).unwrap();
    let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
    handle_request(req, state, addr).await.unwrap()
}

pub fn config(db: PathBuf, root: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        store: StoreConfig { path: db },
        http: HttpConfig {
            cors_origin: "*".to_string(),
            static_max_age: 86_400,
            root: root.to_path_buf(),
            index_files: vec!["index.html".to_string()],
            gzip_min_size: 256,
        },
        logging: LoggingConfig {
            access_log: false,
            access_log_format: "short".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
    }
}

pub async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

pub fn header<'a>(resp: &'a Response<Full<Bytes>>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}
