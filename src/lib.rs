//! Petronox server
//!
//! Serves a static front-end and a read-only JSON API over a SQLite
//! database of vehicles and their lubricant recommendations.

pub mod api;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod store;
