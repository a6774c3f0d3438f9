//! Domain models for wedplan.
//!
//! These are the core types shared across all crates.

pub mod order;
pub mod package;
pub mod task;
pub mod user;
