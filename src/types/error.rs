//! Error types for grievance-desk
//!
//! One flat enum for the whole crate, plus a `user_message` mapping for what
//! gets surfaced to people.

/// Main error type for grievance operations
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// Malformed or missing required input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Actor lacks the capability the operation requires
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Target entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Voter tried to endorse their own grievance
    #[error("Self vote rejected for grievance {grievance_id}")]
    SelfVote { grievance_id: String },

    /// External document repository failure
    #[error("Repository error: {0}")]
    Repository(String),

    /// Identity provider failure
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// Text surfaced to the person who triggered the operation.
    ///
    /// Repository failures are collapsed into a generic retry prompt; the
    /// detailed cause is only logged.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Authorization(_) => "You are not allowed to perform this action.".to_string(),
            Self::NotFound(_) => "The requested grievance could not be found.".to_string(),
            Self::SelfVote { .. } => "You cannot vote on your own grievance.".to_string(),
            Self::Repository(_) => "Something went wrong. Please try again.".to_string(),
            Self::Identity(err) => err.to_string(),
            Self::Config(_) | Self::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Whether a retry by the user could reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::Internal(_))
    }
}

/// Failures reported by an identity provider.
///
/// Display strings are the user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("This email is already registered. Please login or use a different email.")]
    EmailInUse,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Password should be at least 6 characters.")]
    WeakPassword,

    #[error("No account found with this email. Please register first.")]
    UnknownAccount,

    #[error("Incorrect password. Please try again.")]
    WrongPassword,

    #[error("No user logged in")]
    NoSession,

    #[error("Authentication service failure: {0}")]
    Provider(String),
}

// Implement From conversions for common error types

impl From<std::io::Error> for DeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Repository(format!("JSON error: {}", err))
    }
}

/// Result type alias for grievance operations
pub type Result<T> = std::result::Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_prompt_retry() {
        let err = DeskError::Repository("connection reset".into());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_message_is_surfaced_verbatim() {
        let err = DeskError::Validation("Problem title is required".into());
        assert_eq!(err.user_message(), "Problem title is required");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_identity_error_converts() {
        let err: DeskError = IdentityError::WeakPassword.into();
        assert_eq!(
            err.user_message(),
            "Password should be at least 6 characters."
        );
    }
}
