//! Grievance desk - citizen grievance core for Bolo Bharat
//!
//! Citizens file grievances against public-service domains, vote on each
//! other's grievances and follow them through a status history maintained by
//! administrators. This crate holds that core behind two collaborator traits:
//! a hierarchical document repository and an identity provider.
//!
//! ## Modules
//!
//! - **lifecycle**: submission, status changes, voting
//! - **aggregate**: filtering, tallies, recency ordering, ownership split
//! - **export**: CSV rendering of the grievance collection
//! - **feed**: live admin and dashboard views over repository snapshots
//! - **auth**: identities, sessions, permissions, account flows
//! - **repository**: document repository trait, in-memory implementation,
//!   typed grievance store

pub mod aggregate;
pub mod auth;
pub mod config;
pub mod export;
pub mod feed;
pub mod lifecycle;
pub mod model;
pub mod repository;
pub mod types;

pub use config::Args;
pub use types::{DeskError, Result};
