//! User profile schema
//!
//! Stored at `userDetails/{uid}` and copied into each grievance the user files.

use serde::{Deserialize, Serialize};

/// Root path for per-user profile details
pub const USER_DETAILS_ROOT: &str = "userDetails";

/// Root path for per-user account records
pub const USERS_ROOT: &str = "users";

/// Profile details a citizen fills in after registering
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// `userDetails/{uid}`
pub fn user_details_path(uid: &str) -> String {
    format!("{}/{}", USER_DETAILS_ROOT, uid)
}

/// `users/{uid}`
pub fn user_path(uid: &str) -> String {
    format!("{}/{}", USERS_ROOT, uid)
}
