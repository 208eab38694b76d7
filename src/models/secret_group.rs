//! # Secret Groups

use crate::codec::{check_extras, rfc3339, Model};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SECRET_GROUP_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "creation_date",
    "last_update_date",
    "type",
];

/// A secret group, plus any additional properties the caller sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretGroupResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<DateTime<Utc>>,
    /// Media type of the resource, set by the server
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl SecretGroupResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set an additional property
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

impl Model for SecretGroupResource {
    fn check_model(&self) -> Result<()> {
        check_extras("SecretGroupResource", &[SECRET_GROUP_FIELDS], &self.extras)
    }
}

/// Mutable part of a secret group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretGroupMetadataUpdatable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SecretGroupMetadataUpdatable {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Model for SecretGroupMetadataUpdatable {}
