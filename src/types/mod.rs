//! Shared types for grievance-desk

pub mod error;

pub use error::{DeskError, IdentityError, Result};
