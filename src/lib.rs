//! Parameter Graph Library
//!
//! A node graph whose parameters depend on each other through connections
//! and affections. Writes dirty everything downstream; reads pull dirty
//! values up to date on demand.

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod param;
pub mod persistence;
