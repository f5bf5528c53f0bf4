//! Authentication and authorization for grievance-desk
//!
//! Provides:
//! - The identity provider seam and an in-memory implementation
//! - Permission levels for operation authorization
//! - Session tracking that turns identities into actors
//! - Account flows (register, login, reset, delete with cascade)
//! - Password hashing with Argon2

pub mod account;
pub mod identity;
pub mod memory;
pub mod password;
pub mod permissions;
pub mod session;

pub use account::{AccountService, Landing, LoginOutcome};
pub use identity::{is_valid_email, Identity, IdentityProvider};
pub use memory::InMemoryIdentityProvider;
pub use password::{hash_password, verify_password};
pub use permissions::{get_required_permission, is_operation_allowed, PermissionLevel};
pub use session::{Actor, SessionStore};
