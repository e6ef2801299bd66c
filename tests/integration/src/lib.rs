//! Integration test utilities for honk chat
//!
//! This crate provides helpers for running end-to-end sessions against
//! the in-memory store, and against Redis when one is configured.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
