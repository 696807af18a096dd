//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `foxbridge` application.
//!
//! This module centralizes reusable components, such as the process-level
//! error type and logging setup.

pub mod error;
pub mod logging;
