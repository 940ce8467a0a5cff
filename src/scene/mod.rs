//! Object descriptions loaded from disk

pub mod config;

pub use config::{CarvePass, MaterialEntry, ObjectConfig};
