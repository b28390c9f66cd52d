//! Lookup queries
//!
//! One function per endpoint. Each takes an open connection and returns a
//! typed result; shaping into JSON happens in the caller.

use indexmap::IndexMap;
use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::Value;

use super::error::QueryError;

/// Maximum number of search hits returned
pub const SEARCH_LIMIT: usize = 10;

/// Component name -> section key -> oil data, in presentation order
pub type VehicleData = IndexMap<String, IndexMap<String, OilSection>>;

/// Product name -> product details, in import order
pub type Catalog = IndexMap<String, Product>;

/// Oil recommendation stored under one section key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OilSection {
    pub oil_names: Value,
    pub oil_properties: Value,
}

/// One autocomplete hit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub type_name: String,
    pub category: String,
    pub brand: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub description: String,
}

/// Fully-qualified type selection
#[derive(Debug, Clone, Copy)]
pub struct VehicleKey<'a> {
    pub category: &'a str,
    pub brand: &'a str,
    pub model: &'a str,
    pub type_name: &'a str,
}

/// One row of the component/section join
#[derive(Debug, Clone)]
pub struct VehicleRow {
    pub component: String,
    pub section_key: Option<String>,
    pub oil_names: Option<String>,
    pub oil_properties: Option<String>,
}

pub fn categories(conn: &Connection) -> Result<Vec<String>, QueryError> {
    collect_names(conn, "SELECT name FROM categories ORDER BY name", [])
}

pub fn brands(conn: &Connection, category: &str) -> Result<Vec<String>, QueryError> {
    collect_names(
        conn,
        "SELECT b.name FROM brands b
         JOIN categories c ON c.id = b.category_id
         WHERE c.name = ?1
         ORDER BY b.name",
        params![category],
    )
}

pub fn models(conn: &Connection, category: &str, brand: &str) -> Result<Vec<String>, QueryError> {
    collect_names(
        conn,
        "SELECT m.name FROM models m
         JOIN brands b ON b.id = m.brand_id
         JOIN categories c ON c.id = b.category_id
         WHERE c.name = ?1 AND b.name = ?2
         ORDER BY m.name",
        params![category, brand],
    )
}

pub fn types(
    conn: &Connection,
    category: &str,
    brand: &str,
    model: &str,
) -> Result<Vec<String>, QueryError> {
    collect_names(
        conn,
        "SELECT t.name FROM types t
         JOIN models m ON m.id = t.model_id
         JOIN brands b ON b.id = m.brand_id
         JOIN categories c ON c.id = b.category_id
         WHERE c.name = ?1 AND b.name = ?2 AND m.name = ?3
         ORDER BY t.name",
        params![category, brand, model],
    )
}

/// Component and oil section data for one type
///
/// An unknown combination yields an empty map.
pub fn vehicle(conn: &Connection, key: VehicleKey<'_>) -> Result<VehicleData, QueryError> {
    let mut stmt = conn.prepare_cached(
        "SELECT comp.name, s.section_key, s.oil_names, s.oil_properties
         FROM categories c
         JOIN brands b ON b.category_id = c.id
         JOIN models m ON m.brand_id = b.id
         JOIN types t ON t.model_id = m.id
         JOIN components comp ON comp.type_id = t.id
         LEFT JOIN oil_sections s ON s.component_id = comp.id
         WHERE c.name = ?1 AND b.name = ?2 AND m.name = ?3 AND t.name = ?4
         ORDER BY comp.sort_order, comp.id, s.section_key",
    )?;

    let rows = stmt
        .query_map(
            params![key.category, key.brand, key.model, key.type_name],
            |row| {
                Ok(VehicleRow {
                    component: row.get(0)?,
                    section_key: row.get(1)?,
                    oil_names: row.get(2)?,
                    oil_properties: row.get(3)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    fold_vehicle_rows(rows)
}

/// Rebuild the nested component/section structure from ordered join rows
pub fn fold_vehicle_rows<I>(rows: I) -> Result<VehicleData, QueryError>
where
    I: IntoIterator<Item = VehicleRow>,
{
    rows.into_iter().try_fold(VehicleData::new(), |mut acc, row| {
        let sections = acc.entry(row.component).or_default();
        if let Some(section_key) = row.section_key {
            let section = OilSection {
                oil_names: decode_payload("oil_names", row.oil_names.as_deref())?,
                oil_properties: decode_payload("oil_properties", row.oil_properties.as_deref())?,
            };
            sections.insert(section_key, section);
        }
        Ok(acc)
    })
}

fn decode_payload(column: &'static str, raw: Option<&str>) -> Result<Value, QueryError> {
    raw.map_or(Ok(Value::Null), |text| {
        serde_json::from_str(text).map_err(|source| QueryError::Payload { column, source })
    })
}

/// Case-insensitive substring search over type names
///
/// Callers are expected to have rejected blank queries already.
pub fn search(conn: &Connection, query: &str) -> Result<Vec<SearchHit>, QueryError> {
    let needle = query.trim().to_lowercase();
    let mut stmt = conn.prepare_cached(
        "SELECT DISTINCT type_name, category, brand, model
         FROM search_index
         WHERE instr(type_lower, ?1) > 0
         LIMIT ?2",
    )?;

    #[allow(clippy::cast_possible_wrap)]
    let hits = stmt
        .query_map(params![needle, SEARCH_LIMIT as i64], |row| {
            Ok(SearchHit {
                type_name: row.get(0)?,
                category: row.get(1)?,
                brand: row.get(2)?,
                model: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(hits)
}

pub fn products(conn: &Connection) -> Result<Catalog, QueryError> {
    let mut stmt = conn.prepare_cached("SELECT name, description FROM products ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        ))
    })?;

    let mut catalog = Catalog::new();
    for row in rows {
        let (name, description) = row?;
        catalog.insert(name, Product { description });
    }
    Ok(catalog)
}

fn collect_names<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<String>, QueryError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let names = stmt
        .query_map(params, |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
