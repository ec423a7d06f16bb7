//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the pipeline:
//! - Math types and operations
//! - Observer tables and arena re-exports
//! - Frame counting
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
