#![allow(dead_code)]

use std::sync::Arc;

use tessera_application::{AuthConfig, AuthnService, AuthzService, SignUpInput};
use tessera_crypto::{KdfParams, keypair_from_seed};
use tessera_infrastructure::InMemoryIdentityStore;

pub struct Services {
    pub store: Arc<InMemoryIdentityStore>,
    pub authn: AuthnService,
    pub authz: AuthzService,
}

pub fn config() -> AuthConfig {
    AuthConfig::new([11; 32], [22; 32])
        .with_token_private_key(keypair_from_seed(&[33; 32]))
        .with_kdf(KdfParams::new(1024, 1, 1))
}

pub fn services_with(config: AuthConfig) -> Services {
    let store = Arc::new(InMemoryIdentityStore::new());
    Services {
        authn: AuthnService::new(store.clone(), config)
            .unwrap_or_else(|error| panic!("test config rejected: {error}")),
        authz: AuthzService::new(store.clone(), store.clone()),
        store,
    }
}

pub fn services() -> Services {
    services_with(config())
}

pub fn sign_up_input(email: &str, password: &str, username: &str, display_name: &str) -> SignUpInput {
    SignUpInput {
        email: email.to_owned(),
        password: password.to_owned(),
        username: username.to_owned(),
        display_name: display_name.to_owned(),
    }
}
