//! # Engine Configuration
//!
//! The configuration endpoints exchange a bare object whose shape depends on
//! the `{secret_type}` path parameter rather than on a body field. Decoding
//! therefore takes the secret type explicitly; see [`EngineConfig::decode`].

use crate::codec::{self, check_extras, Model};
use crate::error::Result;
use crate::registry::ENGINE_CONFIGS;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use zeroize::Zeroize;

const IAM_ROOT_FIELDS: &[&str] = &["api_key", "api_key_hash"];

/// Root configuration of the IAM credentials engine
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IamSecretEngineRootConfig {
    /// API key used to generate service credentials
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_hash: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl IamSecretEngineRootConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_key_hash: None,
            extras: Map::new(),
        }
    }
}

impl fmt::Debug for IamSecretEngineRootConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamSecretEngineRootConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_key_hash", &self.api_key_hash)
            .field("extras", &self.extras)
            .finish()
    }
}

impl Drop for IamSecretEngineRootConfig {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

impl Model for IamSecretEngineRootConfig {
    fn check_model(&self) -> Result<()> {
        check_extras("IamSecretEngineRootConfig", &[IAM_ROOT_FIELDS], &self.extras)
    }
}

/// Configuration of an engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineConfig {
    IamSecretEngineRoot(IamSecretEngineRootConfig),
    /// Engine without a typed model; `kind` is the secret type it was read for
    Other {
        kind: String,
        properties: Map<String, Value>,
    },
}

impl EngineConfig {
    /// Decode the configuration returned for `secret_type`
    ///
    /// # Errors
    ///
    /// Fails if `value` is not an object or lacks a required field of the
    /// registered variant.
    pub fn decode(secret_type: &str, value: Value) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_value(value)?;
        ENGINE_CONFIGS.resolve(secret_type, fields)
    }

    pub fn as_iam_secret_engine_root(&self) -> Option<&IamSecretEngineRootConfig> {
        match self {
            EngineConfig::IamSecretEngineRoot(config) => Some(config),
            EngineConfig::Other { .. } => None,
        }
    }

    pub(crate) fn iam_secret_engine_root_from_fields(
        _secret_type: &str,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        codec::object(fields).map(EngineConfig::IamSecretEngineRoot)
    }

    pub(crate) fn other_from_fields(
        secret_type: &str,
        properties: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        Ok(EngineConfig::Other {
            kind: secret_type.to_string(),
            properties,
        })
    }
}

impl From<IamSecretEngineRootConfig> for EngineConfig {
    fn from(config: IamSecretEngineRootConfig) -> Self {
        EngineConfig::IamSecretEngineRoot(config)
    }
}

impl Serialize for EngineConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            EngineConfig::IamSecretEngineRoot(config) => config.serialize(serializer),
            EngineConfig::Other { properties, .. } => properties.serialize(serializer),
        }
    }
}

impl Model for EngineConfig {
    fn check_model(&self) -> Result<()> {
        match self {
            EngineConfig::IamSecretEngineRoot(config) => config.check_model(),
            EngineConfig::Other { .. } => Ok(()),
        }
    }
}
