//! CLI command handlers

pub mod commands;

pub use commands::{catalog, collect_inputs, extract, init_config};
