//! Core types shared by the strut constraint solver crates.
//!
//! This crate provides the foundational types used across the workspace:
//! - Strength bands and lexicographic objective weights
//! - Solver configuration
//! - Error types

pub mod errors;
pub mod options;
pub mod strength;

pub use errors::*;
pub use options::*;
pub use strength::*;
