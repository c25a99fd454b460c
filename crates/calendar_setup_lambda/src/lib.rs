//! AWS-oriented handler for the change-calendar custom resource.
//!
//! This crate owns the Lambda entry point and the collaborator seams (STS,
//! S3, SSM). Contract types and the error taxonomy are re-exported from
//! `calendar_setup_core` through the `runtime` module.

pub mod adapters;
pub mod handlers;

pub mod runtime {
    pub use calendar_setup_core::{arn, contract, document, error};
}
