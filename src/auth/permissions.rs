//! Permission levels and the operation table for grievance actions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission levels for grievance operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
#[derive(Default)]
pub enum PermissionLevel {
    /// Not signed in
    #[default]
    Public = 0,
    /// Signed-in citizen
    Authenticated = 1,
    /// Grievance administrator
    Admin = 2,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::Public => write!(f, "PUBLIC"),
            PermissionLevel::Authenticated => write!(f, "AUTHENTICATED"),
            PermissionLevel::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Get the required permission level for a grievance operation.
/// Returns None for unknown operations (which should be blocked).
pub fn get_required_permission(operation: &str) -> Option<PermissionLevel> {
    match operation {
        "register" | "login" | "reset_password" => Some(PermissionLevel::Public),

        "submit_grievance"
        | "cast_vote"
        | "view_dashboard"
        | "save_user_details"
        | "delete_account" => Some(PermissionLevel::Authenticated),

        "change_status" | "view_all_grievances" | "export_csv" => Some(PermissionLevel::Admin),

        _ => None,
    }
}

/// Check if an operation is allowed for the given permission level
pub fn is_operation_allowed(operation: &str, level: PermissionLevel) -> bool {
    match get_required_permission(operation) {
        Some(required) => level >= required,
        None => false,
    }
}

/// Get a human-readable description of an operation for logging
pub fn get_operation_description(operation: &str) -> &'static str {
    match operation {
        "register" => "Register account",
        "login" => "Sign in",
        "reset_password" => "Request password reset",
        "submit_grievance" => "Submit grievance",
        "cast_vote" => "Vote on grievance",
        "view_dashboard" => "View dashboard",
        "save_user_details" => "Save profile details",
        "delete_account" => "Delete account",
        "change_status" => "Change grievance status",
        "view_all_grievances" => "View admin console",
        "export_csv" => "Export grievances as CSV",
        _ => "Unknown operation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_operations() {
        assert!(is_operation_allowed("login", PermissionLevel::Public));
        assert!(is_operation_allowed("login", PermissionLevel::Admin));
    }

    #[test]
    fn test_citizen_operations() {
        assert!(!is_operation_allowed(
            "submit_grievance",
            PermissionLevel::Public
        ));
        assert!(is_operation_allowed(
            "submit_grievance",
            PermissionLevel::Authenticated
        ));
        assert!(is_operation_allowed("cast_vote", PermissionLevel::Admin));
    }

    #[test]
    fn test_admin_operations() {
        assert!(!is_operation_allowed(
            "change_status",
            PermissionLevel::Authenticated
        ));
        assert!(!is_operation_allowed("export_csv", PermissionLevel::Public));
        assert!(is_operation_allowed("change_status", PermissionLevel::Admin));
    }

    #[test]
    fn test_unknown_operations_blocked() {
        assert!(!is_operation_allowed("delete_grievance", PermissionLevel::Admin));
        assert_eq!(
            get_operation_description("delete_grievance"),
            "Unknown operation"
        );
    }

    #[test]
    fn test_permission_ordering() {
        assert!(PermissionLevel::Admin > PermissionLevel::Authenticated);
        assert!(PermissionLevel::Authenticated > PermissionLevel::Public);
    }
}
