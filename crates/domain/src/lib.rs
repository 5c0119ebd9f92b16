//! Identity entities, validation rules and the permission matcher.

#![forbid(unsafe_code)]

mod grant;
mod permission;
mod role;
mod user;
pub mod validation;

pub use grant::{Grant, GrantId};
pub use permission::{
    Permission, SEGMENT_SEPARATOR, WILDCARD, dedup_permissions, has_all_permissions,
    has_any_permission, has_permission, permission_matches,
};
pub use role::{Role, RoleId, RoleStatus};
pub use user::{PasswordCredential, SealedSecret, User, UserId, UserStatus};
