//! Shared change-calendar domain primitives.
//!
//! This crate owns the custom-resource invocation contract, the calendar
//! source selection, and the error taxonomy. It intentionally excludes AWS SDK
//! and Lambda runtime concerns.

pub mod arn;
pub mod contract;
pub mod document;
pub mod error;
