//! # Secret Metadata
//!
//! Metadata view of a secret. Only `name`, `description`, `labels`,
//! `expiration_date` and `ttl` are writable; [`SecretMetadata::updatable`]
//! strips the rest before an update request is encoded.

use crate::codec::{rfc3339, Model};
use crate::models::secret::Ttl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<DateTime<Utc>>,
}

impl SecretMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_expiration_date(mut self, date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(rfc3339::seconds(date));
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Copy holding only the writable fields
    #[must_use]
    pub fn updatable(&self) -> Self {
        Self {
            labels: self.labels.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            expiration_date: self.expiration_date,
            ttl: self.ttl.clone(),
            ..Default::default()
        }
    }
}

impl Model for SecretMetadata {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_updatable_drops_read_only_fields() {
        let fetched: SecretMetadata = serde_json::from_value(json!({
            "id": "abc",
            "name": "db",
            "labels": ["prod"],
            "state": 1,
            "secret_type": "username_password",
            "crn": "crn:v1:bluemix:public:secrets-manager:us-south:a/1:2::secret:abc",
            "creation_date": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let update = fetched.with_description("rotated monthly").updatable();
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({"labels": ["prod"], "name": "db", "description": "rotated monthly"})
        );
    }
}
