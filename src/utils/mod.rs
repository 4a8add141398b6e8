//! Utility modules
//!
//! Error handling and logging shared by every component.

pub mod error;
pub mod logging;
