//! Modules layer - Infrastructure components
//!
//! Contains the catalog store backends the feature services read and write through.

pub mod store;
