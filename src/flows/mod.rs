//! Flows module - End-to-end operations
//!
//! Provides:
//! - concat: Collect a tree and write it as one document

pub mod concat;
