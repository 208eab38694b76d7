//! # Secret Actions
//!
//! Bodies for `POST /api/v1/secrets/{secret_type}/{id}?action={action}`.
//! The body carries no discriminator; the variant follows from the secret type
//! and the `action` query parameter (see [`crate::registry::action_key`]).

use crate::codec::{self, Model};
use crate::constants::{actions, secret_types};
use crate::registry::{action_key, SECRET_ACTIONS};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// New payload for an arbitrary secret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotateArbitrarySecretBody {
    pub payload: Value,
}

/// New password for a username/password secret; the server generates one when absent
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateUsernamePasswordSecretBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for RotateUsernamePasswordSecretBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotateUsernamePasswordSecretBody")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Revoke the API key generated for an IAM credentials secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCredentialsForIamSecret {
    pub service_id: String,
}

/// An action performed on a secret
#[derive(Debug, Clone, PartialEq)]
pub enum SecretAction {
    RotateArbitrary(RotateArbitrarySecretBody),
    RotateUsernamePassword(RotateUsernamePasswordSecretBody),
    DeleteCredentialsForIam(DeleteCredentialsForIamSecret),
    /// Action without a typed body
    Other {
        action: String,
        properties: Map<String, Value>,
    },
}

impl SecretAction {
    pub fn rotate_arbitrary(payload: impl Into<Value>) -> Self {
        SecretAction::RotateArbitrary(RotateArbitrarySecretBody {
            payload: payload.into(),
        })
    }

    pub fn rotate_username_password(password: Option<String>) -> Self {
        SecretAction::RotateUsernamePassword(RotateUsernamePasswordSecretBody { password })
    }

    pub fn delete_credentials_for_iam(service_id: impl Into<String>) -> Self {
        SecretAction::DeleteCredentialsForIam(DeleteCredentialsForIamSecret {
            service_id: service_id.into(),
        })
    }

    /// Value of the `action` query parameter
    pub fn action(&self) -> &str {
        match self {
            SecretAction::RotateArbitrary(_) | SecretAction::RotateUsernamePassword(_) => {
                actions::ROTATE
            }
            SecretAction::DeleteCredentialsForIam(_) => actions::DELETE_CREDENTIALS,
            SecretAction::Other { action, .. } => action,
        }
    }

    /// Secret type the action applies to, when the variant implies one
    pub fn secret_type(&self) -> Option<&'static str> {
        match self {
            SecretAction::RotateArbitrary(_) => Some(secret_types::ARBITRARY),
            SecretAction::RotateUsernamePassword(_) => Some(secret_types::USERNAME_PASSWORD),
            SecretAction::DeleteCredentialsForIam(_) => Some(secret_types::IAM_CREDENTIALS),
            SecretAction::Other { .. } => None,
        }
    }

    /// Decode the body of `action` on a secret of `secret_type`
    ///
    /// # Errors
    ///
    /// Fails if `value` is not an object or lacks a required field of the
    /// registered variant.
    pub fn decode(secret_type: &str, action: &str, value: Value) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_value(value)?;
        SECRET_ACTIONS.resolve(&action_key(secret_type, action), fields)
    }

    pub(crate) fn rotate_arbitrary_from_fields(
        _key: &str,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        codec::object(fields).map(SecretAction::RotateArbitrary)
    }

    pub(crate) fn rotate_username_password_from_fields(
        _key: &str,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        codec::object(fields).map(SecretAction::RotateUsernamePassword)
    }

    pub(crate) fn delete_credentials_for_iam_from_fields(
        _key: &str,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        codec::object(fields).map(SecretAction::DeleteCredentialsForIam)
    }

    pub(crate) fn other_from_fields(
        key: &str,
        properties: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        let action = key.split_once(':').map_or(key, |(_, action)| action);
        Ok(SecretAction::Other {
            action: action.to_string(),
            properties,
        })
    }
}

impl Serialize for SecretAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SecretAction::RotateArbitrary(body) => body.serialize(serializer),
            SecretAction::RotateUsernamePassword(body) => body.serialize(serializer),
            SecretAction::DeleteCredentialsForIam(body) => body.serialize(serializer),
            SecretAction::Other { properties, .. } => properties.serialize(serializer),
        }
    }
}

impl Model for SecretAction {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rotate_is_keyed_by_secret_type() {
        let arbitrary =
            SecretAction::decode("arbitrary", "rotate", json!({"payload": "new"})).unwrap();
        let password =
            SecretAction::decode("username_password", "rotate", json!({"password": "p"})).unwrap();
        assert!(matches!(arbitrary, SecretAction::RotateArbitrary(_)));
        assert!(matches!(password, SecretAction::RotateUsernamePassword(_)));
        assert_eq!(arbitrary.action(), "rotate");
    }

    #[test]
    fn test_variant_round_trip() {
        for action in [
            SecretAction::rotate_arbitrary("new-payload"),
            SecretAction::rotate_username_password(Some("n3w".to_string())),
            SecretAction::rotate_username_password(None),
            SecretAction::delete_credentials_for_iam("ServiceId-1"),
        ] {
            let encoded = codec::encode(&action).unwrap();
            let secret_type = action.secret_type().unwrap();
            let decoded = SecretAction::decode(secret_type, action.action(), encoded).unwrap();
            assert_eq!(decoded, action);
        }
    }

    #[test]
    fn test_unknown_action_is_kept() {
        let action =
            SecretAction::decode("imported_cert", "restore", json!({"version": 2})).unwrap();
        assert_eq!(action.action(), "restore");
        assert_eq!(action.secret_type(), None);
        assert_eq!(codec::encode(&action).unwrap(), json!({"version": 2}));
    }

    #[test]
    fn test_debug_redacts_password() {
        let action = SecretAction::rotate_username_password(Some("hunter2".to_string()));
        assert!(!format!("{action:?}").contains("hunter2"));
    }
}
