//! Identity services and the ports they depend on.

#![forbid(unsafe_code)]

mod auth_config;
mod authn_service;
mod authz_ports;
mod authz_service;
mod permission_checker;
mod seed_service;
mod store_ports;

pub use auth_config::{
    AuthConfig, DEFAULT_PASSWORD_LENGTH, DEFAULT_PIN_LENGTH, DEFAULT_SUPERADMIN_EMAIL,
    DEFAULT_SUPERADMIN_NAME, DEFAULT_SUPERADMIN_USERNAME, DEFAULT_TOKEN_AUDIENCE,
    DEFAULT_TOKEN_TTL, MIN_GENERATED_PASSWORD_LENGTH,
};
pub use authn_service::{
    AuthenticatedSession, AuthnService, BootstrapOutcome, SYSTEM_ACTOR, SignUpInput,
};
pub use authz_ports::{AuthzCheckRequest, AuthzCheckResponse, AuthzTransport, PermissionCache};
pub use authz_service::{AuthzService, CreateRoleInput};
pub use permission_checker::{DEFAULT_DECISION_TTL, PermissionChecker, cache_key};
pub use seed_service::{SeedGrant, SeedPlan, SeedReport, SeedRole, SeedService, SeedUser};
pub use store_ports::{GrantStore, RoleStore, UserStore};
