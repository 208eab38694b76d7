//! # Secret Policies
//!
//! Policy results are keyed by their `type` media type through
//! [`crate::registry::POLICY_RESULTS`]. The rotation policy is the only known
//! kind; anything else decodes as [`GenericPolicy`].

use crate::codec::{self, check_extras, rfc3339, Model};
use crate::constants::media_types;
use crate::error::Result;
use crate::registry::POLICY_RESULTS;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Discriminator field
pub const POLICY_TYPE_FIELD: &str = "type";

/// Rotation interval unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationUnit {
    Day,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub interval: i64,
    pub unit: RotationUnit,
}

/// Automatic rotation policy
///
/// Request bodies carry only `type` and `rotation`; the remaining fields are
/// filled in by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretPolicyRotation {
    #[serde(rename = "type")]
    pub policy_type: String,
    pub rotation: Rotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl SecretPolicyRotation {
    pub fn new(interval: i64, unit: RotationUnit) -> Self {
        Self {
            policy_type: media_types::SECRET_POLICY.to_string(),
            rotation: Rotation { interval, unit },
            id: None,
            crn: None,
            creation_date: None,
            created_by: None,
            last_update_date: None,
            updated_by: None,
        }
    }
}

impl Model for SecretPolicyRotation {}

/// Policy of a kind the registry does not know
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericPolicy {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Model for GenericPolicy {
    fn check_model(&self) -> Result<()> {
        let tag: &[&str] =
            if self.policy_type.is_none() && codec::has_null_tag(&self.extras, POLICY_TYPE_FIELD) {
                &[]
            } else {
                &[POLICY_TYPE_FIELD]
            };
        check_extras("GenericPolicy", &[tag], &self.extras)
    }
}

/// A policy as returned by the policy endpoints
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyResult {
    Rotation(SecretPolicyRotation),
    Generic(GenericPolicy),
}

impl PolicyResult {
    pub fn policy_type(&self) -> Option<&str> {
        match self {
            PolicyResult::Rotation(policy) => Some(&policy.policy_type),
            PolicyResult::Generic(policy) => policy.policy_type.as_deref(),
        }
    }

    pub fn as_rotation(&self) -> Option<&SecretPolicyRotation> {
        match self {
            PolicyResult::Rotation(policy) => Some(policy),
            PolicyResult::Generic(_) => None,
        }
    }

    pub(crate) fn rotation_from_fields(
        _policy_type: &str,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        codec::object(fields).map(PolicyResult::Rotation)
    }

    pub(crate) fn generic_from_fields(
        _policy_type: &str,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        codec::object_with_optional_tag(fields, POLICY_TYPE_FIELD, |policy: &mut GenericPolicy| {
            &mut policy.extras
        })
        .map(PolicyResult::Generic)
    }
}

impl From<SecretPolicyRotation> for PolicyResult {
    fn from(policy: SecretPolicyRotation) -> Self {
        PolicyResult::Rotation(policy)
    }
}

impl Serialize for PolicyResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PolicyResult::Rotation(policy) => policy.serialize(serializer),
            PolicyResult::Generic(policy) => policy.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PolicyResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let policy_type = fields
            .get(POLICY_TYPE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        POLICY_RESULTS
            .resolve(&policy_type, fields)
            .map_err(D::Error::custom)
    }
}

impl Model for PolicyResult {
    fn check_model(&self) -> Result<()> {
        match self {
            PolicyResult::Rotation(policy) => policy.check_model(),
            PolicyResult::Generic(policy) => policy.check_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_rotation_request_shape() {
        let policy = SecretPolicyRotation::new(1, RotationUnit::Month);
        assert_eq!(
            serde_json::to_string(&policy).unwrap(),
            r#"{"type":"application/vnd.ibm.secrets-manager.secret.policy+json","rotation":{"interval":1,"unit":"month"}}"#
        );
    }

    #[test]
    fn test_policy_result_dispatches_on_media_type() {
        let result: PolicyResult = serde_json::from_value(json!({
            "id": "p1",
            "type": "application/vnd.ibm.secrets-manager.secret.policy+json",
            "rotation": {"interval": 1, "unit": "day"},
            "created_by": "iam-ServiceId-1"
        }))
        .unwrap();
        let rotation = result.as_rotation().unwrap();
        assert_eq!(rotation.rotation.interval, 1);
        assert_eq!(rotation.rotation.unit, RotationUnit::Day);
        assert_eq!(rotation.id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_unknown_policy_kind_is_generic() {
        let input = json!({"type": "application/vnd.example.expiry+json", "notify_days": 7});
        let result: PolicyResult = serde_json::from_value(input.clone()).unwrap();
        assert!(result.as_rotation().is_none());
        assert_eq!(result.policy_type(), Some("application/vnd.example.expiry+json"));
        assert_eq!(codec::encode(&result).unwrap(), input);
    }

    #[test]
    fn test_built_rotation_survives_encode_and_decode() {
        let mut policy = SecretPolicyRotation::new(3, RotationUnit::Day);
        policy.id = Some("p1".to_string());
        policy.creation_date = Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let result = PolicyResult::from(policy);
        let decoded: PolicyResult =
            serde_json::from_value(codec::encode(&result).unwrap()).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn test_null_policy_type_is_generic_and_lossless() {
        let input = json!({"type": null, "notify_days": 7});
        let result: PolicyResult = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(result.policy_type(), None);
        assert_eq!(codec::encode(&result).unwrap(), input);
    }

    #[test]
    fn test_unknown_rotation_unit_is_rejected() {
        let err = serde_json::from_value::<PolicyResult>(json!({
            "type": "application/vnd.ibm.secrets-manager.secret.policy+json",
            "rotation": {"interval": 1, "unit": "week"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("week"));
    }
}
