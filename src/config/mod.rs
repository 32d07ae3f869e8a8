//! Configuration loading and schema for `tideloop`.
//!
//! Scene configurations are YAML documents deserialized into
//! [`schema::EngineConfig`]. Every field has a default equal to the
//! reference scene's constants, so an empty document (or no document
//! at all) yields the stock narrative.

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate};
pub use schema::EngineConfig;
