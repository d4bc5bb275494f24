//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Record model (FileRecord, RecordSet)
//! - Ignore rule parsing and matching
//! - Path normalization utilities
//! - Lossy text reading
//! - Rendering functions for different output formats
//! - Token counting for the run summary

pub mod error;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod rules;
pub mod tokenizer;
