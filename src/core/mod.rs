//! Core modules: record schemas, the markdown codec and the shared
//! primitives every command builds on.

pub mod config;
pub mod error;
pub mod markdown;
pub mod output;
pub mod paths;
pub mod records;
pub mod schema;
