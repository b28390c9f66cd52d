//! Routing module
//!
//! Pure request classification, independent of any handler.

pub mod guard;

pub use guard::{classify, normalize_path, PathClass};
