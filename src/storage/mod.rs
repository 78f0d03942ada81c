//! Storage layer for the remembered login configuration.
//!
//! # Modules
//!
//! - `backend`: the [`ConfigStore`] trait
//! - `json`: JSON file store with atomic writes
//! - `memory`: process-local store

pub mod backend;
pub mod json;
pub mod memory;

pub use backend::ConfigStore;
pub use json::JsonConfigStore;
pub use memory::MemoryConfigStore;
