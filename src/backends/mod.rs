//! Backends module - Filesystem traversal
//!
//! Provides:
//! - collect: Depth-first tree collection honoring ignore rules

pub mod collect;
