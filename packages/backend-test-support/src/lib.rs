//! Backend test support utilities
//!
//! Shared helpers for the Spyster backend test binaries: one-time logging
//! initialization, unique display names, and problem-details assertions.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
