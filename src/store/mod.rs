//! Query engine
//!
//! Maps API endpoint names to read-only lookups against the SQLite store.
//! Every lookup opens its own connection on a blocking worker; the
//! connection is dropped when the worker returns, whatever the outcome.

mod error;
pub mod queries;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::{Connection, OpenFlags};
use serde_json::Value;

pub use error::QueryError;
pub use queries::{OilSection, Product, SearchHit, VehicleData, VehicleKey, SEARCH_LIMIT};

/// Table layout the import step is expected to produce
pub const SCHEMA: &str = include_str!("schema.sql");

/// API endpoints, one per lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Categories,
    Brands,
    Models,
    Types,
    Vehicle,
    Search,
    Products,
}

impl Endpoint {
    pub const ALL: [Self; 7] = [
        Self::Categories,
        Self::Brands,
        Self::Models,
        Self::Types,
        Self::Vehicle,
        Self::Search,
        Self::Products,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Brands => "brands",
            Self::Models => "models",
            Self::Types => "types",
            Self::Vehicle => "vehicle",
            Self::Search => "search",
            Self::Products => "products",
        }
    }
}

/// Request parameters; absent keys read as the empty string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map_or("", String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    /// Later duplicates are ignored
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashMap::new();
        for (k, v) in iter {
            map.entry(k.into()).or_insert_with(|| v.into());
        }
        Self(map)
    }
}

/// Handle to the read-only SQLite store
#[derive(Debug, Clone)]
pub struct Store {
    path: Arc<PathBuf>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    /// Open a fresh read-only connection
    pub fn connect(&self) -> Result<Connection, QueryError> {
        let conn = Connection::open_with_flags(
            self.path.as_path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Run an endpoint's lookup and shape the result as JSON
    pub async fn query(&self, endpoint: Endpoint, params: Params) -> Result<Value, QueryError> {
        if let Some(value) = short_circuit(endpoint, &params) {
            return Ok(value);
        }

        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = store.connect()?;
            execute(&conn, endpoint, &params)
        })
        .await
        .map_err(|e| QueryError::Worker(e.to_string()))?
    }
}

/// Answers that need no store access
fn short_circuit(endpoint: Endpoint, params: &Params) -> Option<Value> {
    match endpoint {
        Endpoint::Search if params.get("q").trim().is_empty() => Some(Value::Array(Vec::new())),
        _ => None,
    }
}

/// Execute an endpoint on an open connection
pub fn execute(conn: &Connection, endpoint: Endpoint, params: &Params) -> Result<Value, QueryError> {
    let category = params.get("category");
    let brand = params.get("brand");
    let model = params.get("model");

    match endpoint {
        Endpoint::Categories => to_json(&queries::categories(conn)?),
        Endpoint::Brands => to_json(&queries::brands(conn, category)?),
        Endpoint::Models => to_json(&queries::models(conn, category, brand)?),
        Endpoint::Types => to_json(&queries::types(conn, category, brand, model)?),
        Endpoint::Vehicle => {
            let key = VehicleKey {
                category,
                brand,
                model,
                type_name: params.get("type"),
            };
            to_json(&queries::vehicle(conn, key)?)
        }
        Endpoint::Search => match short_circuit(endpoint, params) {
            Some(value) => Ok(value),
            None => to_json(&queries::search(conn, params.get("q"))?),
        },
        Endpoint::Products => to_json(&queries::products(conn)?),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, QueryError> {
    serde_json::to_value(value).map_err(QueryError::Encode)
}
