//! # Models
//!
//! Request and response shapes of the Secrets Manager API.
//!
//! Polymorphic families (`SecretResource`, `EngineConfig`, `SecretAction`,
//! `PolicyResult`) are enums with hand-written serde impls that dispatch
//! through [`crate::registry`]. Every other model derives serde.

mod action;
mod engine;
mod envelope;
mod metadata;
mod policy;
mod secret;
mod secret_group;

pub use action::{
    DeleteCredentialsForIamSecret, RotateArbitrarySecretBody, RotateUsernamePasswordSecretBody,
    SecretAction,
};
pub use engine::{EngineConfig, IamSecretEngineRootConfig};
pub use envelope::{CollectionEnvelope, CollectionMetadata};
pub use metadata::SecretMetadata;
pub use policy::{
    GenericPolicy, PolicyResult, Rotation, RotationUnit, SecretPolicyRotation, POLICY_TYPE_FIELD,
};
pub use secret::{
    ArbitrarySecretResource, GenericSecretResource, IamCredentialsSecretResource, SecretBase,
    SecretResource, SecretVariant, Ttl, UsernamePasswordSecretResource, SECRET_BASE_FIELDS,
    SECRET_TYPE_FIELD,
};
pub use secret_group::{SecretGroupMetadataUpdatable, SecretGroupResource};

/// Envelope of secret groups
pub type SecretGroupCollection = CollectionEnvelope<SecretGroupResource>;

/// Envelope of secrets of any type
pub type SecretCollection = CollectionEnvelope<SecretResource>;

/// Envelope of secret metadata
pub type SecretMetadataCollection = CollectionEnvelope<SecretMetadata>;

/// Envelope of policies
pub type PolicyCollection = CollectionEnvelope<PolicyResult>;
