//! # Discriminator Registry
//!
//! Process-wide, immutable maps from a discriminator value to the factory that
//! builds the concrete variant. One registry per polymorphic family:
//!
//! | Family | Key |
//! |--------|-----|
//! | [`SecretResource`] | `secret_type` body field |
//! | [`EngineConfig`] | `{secret_type}` path parameter |
//! | [`SecretAction`] | `{secret_type}:{action}` |
//! | [`PolicyResult`] | policy `type` media type |
//!
//! A miss resolves to the family's generic variant with every field retained.

use crate::constants::{media_types, secret_types};
use crate::models::{EngineConfig, PolicyResult, SecretAction, SecretResource};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Builds a variant from its discriminator and JSON fields
pub type Factory<T> = fn(&str, Map<String, Value>) -> Result<T, serde_json::Error>;

/// Discriminator → factory map for one family
pub struct Registry<T> {
    family: &'static str,
    factories: HashMap<&'static str, Factory<T>>,
    fallback: Factory<T>,
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("Registry")
            .field("family", &self.family)
            .field("keys", &keys)
            .finish_non_exhaustive()
    }
}

impl<T> Registry<T> {
    pub fn new(family: &'static str, fallback: Factory<T>) -> Self {
        Self {
            family,
            factories: HashMap::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn register(mut self, key: &'static str, factory: Factory<T>) -> Self {
        self.factories.insert(key, factory);
        self
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.factories.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Build the variant registered under `key`, or the generic variant
    ///
    /// # Errors
    ///
    /// Whatever the selected factory reports, typically a missing required field.
    pub fn resolve(&self, key: &str, fields: Map<String, Value>) -> Result<T, serde_json::Error> {
        match self.factories.get(key) {
            Some(factory) => factory(key, fields),
            None => {
                debug!(family = self.family, key, "registry.fallback");
                (self.fallback)(key, fields)
            }
        }
    }
}

/// Secret resources keyed by `secret_type`
pub static SECRET_RESOURCES: LazyLock<Registry<SecretResource>> = LazyLock::new(|| {
    Registry::new("secret_resource", SecretResource::generic_from_fields)
        .register(secret_types::ARBITRARY, SecretResource::arbitrary_from_fields)
        .register(
            secret_types::USERNAME_PASSWORD,
            SecretResource::username_password_from_fields,
        )
        .register(
            secret_types::IAM_CREDENTIALS,
            SecretResource::iam_credentials_from_fields,
        )
});

/// Engine configurations keyed by the `{secret_type}` path parameter
pub static ENGINE_CONFIGS: LazyLock<Registry<EngineConfig>> = LazyLock::new(|| {
    Registry::new("engine_config", EngineConfig::other_from_fields).register(
        secret_types::IAM_CREDENTIALS,
        EngineConfig::iam_secret_engine_root_from_fields,
    )
});

/// Key of a secret action: `{secret_type}:{action}`
pub fn action_key(secret_type: &str, action: &str) -> String {
    format!("{secret_type}:{action}")
}

/// Secret actions keyed by [`action_key`]
pub static SECRET_ACTIONS: LazyLock<Registry<SecretAction>> = LazyLock::new(|| {
    Registry::new("secret_action", SecretAction::other_from_fields)
        .register(
            action_keys::ARBITRARY_ROTATE,
            SecretAction::rotate_arbitrary_from_fields,
        )
        .register(
            action_keys::USERNAME_PASSWORD_ROTATE,
            SecretAction::rotate_username_password_from_fields,
        )
        .register(
            action_keys::IAM_CREDENTIALS_DELETE_CREDENTIALS,
            SecretAction::delete_credentials_for_iam_from_fields,
        )
});

/// Static action keys; must match [`action_key`] for the corresponding pairs
mod action_keys {
    pub const ARBITRARY_ROTATE: &str = "arbitrary:rotate";
    pub const USERNAME_PASSWORD_ROTATE: &str = "username_password:rotate";
    pub const IAM_CREDENTIALS_DELETE_CREDENTIALS: &str = "iam_credentials:delete_credentials";
}

/// Policy results keyed by their `type` media type
pub static POLICY_RESULTS: LazyLock<Registry<PolicyResult>> = LazyLock::new(|| {
    Registry::new("policy_result", PolicyResult::generic_from_fields)
        .register(media_types::SECRET_POLICY, PolicyResult::rotation_from_fields)
});
