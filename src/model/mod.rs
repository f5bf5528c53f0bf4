//! Document schemas for grievance-desk
//!
//! Defines the grievance and user profile documents and their vocabularies.

mod domain;
mod grievance;
mod user;

pub use domain::{normalize_label, Domain, GrievanceStatus, Language};
pub use grievance::{
    grievance_path, submitter_path, Grievance, GrievanceDraft, StatusChange, SubmitterDetails,
    GRIEVANCE_ROOT,
};
pub use user::{user_details_path, user_path, UserDetails, USERS_ROOT, USER_DETAILS_ROOT};
