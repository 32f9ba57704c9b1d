//! Bridge module containing all embedding-related components.

pub mod config;
pub mod import_hook;
pub mod interpreter;
pub mod loader;
pub mod registry;
pub mod statement;
pub mod value;
