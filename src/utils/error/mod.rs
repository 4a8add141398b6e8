//! Error handling utilities
//!
//! Crate-wide error type, classification helpers and HTTP rendering.

pub mod error;

pub use error::*;
