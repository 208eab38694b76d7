//! # Secret Resources
//!
//! `SecretResource` is a tagged union over the known secret types, dispatched on
//! the `secret_type` body field through [`crate::registry::SECRET_RESOURCES`].
//!
//! Every variant shares [`SecretBase`] and keeps unrecognized keys in an
//! `extras` map, so a record written by a newer server survives a
//! decode/encode cycle unchanged. A `secret_type` the registry does not know
//! decodes as [`GenericSecretResource`].

use crate::codec::{self, check_extras, rfc3339, Model};
use crate::constants::secret_types;
use crate::error::Result;
use crate::registry::SECRET_RESOURCES;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Discriminator field
pub const SECRET_TYPE_FIELD: &str = "secret_type";

/// JSON names of the [`SecretBase`] fields
pub const SECRET_BASE_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "secret_group_id",
    "labels",
    "state",
    "state_description",
    "crn",
    "creation_date",
    "created_by",
    "last_update_date",
    "versions",
];

/// Fields common to every secret type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretBase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Lifecycle state: 0 pre-activation, 1 active, 2 suspended, 3 deactivated, 5 destroyed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<Map<String, Value>>>,
}

impl SecretBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Behaviour shared by the concrete secret types
pub trait SecretVariant: Sized {
    /// Discriminator written to `secret_type`
    const SECRET_TYPE: &'static str;
    /// JSON names of the fields declared by the variant itself
    const FIELDS: &'static [&'static str];

    fn base(&self) -> &SecretBase;
    fn base_mut(&mut self) -> &mut SecretBase;
    fn extras(&self) -> &Map<String, Value>;
    fn extras_mut(&mut self) -> &mut Map<String, Value>;

    #[must_use]
    fn with_description(mut self, description: impl Into<String>) -> Self {
        self.base_mut().description = Some(description.into());
        self
    }

    #[must_use]
    fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_mut().labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    fn with_secret_group_id(mut self, group: impl Into<String>) -> Self {
        self.base_mut().secret_group_id = Some(group.into());
        self
    }

    /// Set an additional property
    #[must_use]
    fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras_mut().insert(key.into(), value.into());
        self
    }
}

fn check_variant<V: SecretVariant>(model: &'static str, variant: &V) -> Result<()> {
    check_extras(
        model,
        &[SECRET_BASE_FIELDS, V::FIELDS, &[SECRET_TYPE_FIELD]],
        variant.extras(),
    )
}

macro_rules! secret_variant {
    ($ty:ident, $secret_type:expr, [$($field:literal),* $(,)?]) => {
        impl SecretVariant for $ty {
            const SECRET_TYPE: &'static str = $secret_type;
            const FIELDS: &'static [&'static str] = &[$($field),*];

            fn base(&self) -> &SecretBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut SecretBase {
                &mut self.base
            }

            fn extras(&self) -> &Map<String, Value> {
                &self.extras
            }

            fn extras_mut(&mut self) -> &mut Map<String, Value> {
                &mut self.extras
            }
        }

        impl Model for $ty {
            fn check_model(&self) -> Result<()> {
                check_variant(stringify!($ty), self)
            }
        }
    };
}

/// Secret with a caller-supplied payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArbitrarySecretResource {
    #[serde(flatten)]
    pub base: SecretBase,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Opaque server-provided mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

secret_variant!(
    ArbitrarySecretResource,
    secret_types::ARBITRARY,
    ["expiration_date", "payload", "secret_data"]
);

impl ArbitrarySecretResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: SecretBase::new(name),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    #[must_use]
    pub fn with_expiration_date(mut self, date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(rfc3339::seconds(date));
        self
    }
}

/// Username and password pair with optional automatic rotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsernamePasswordSecretResource {
    #[serde(flatten)]
    pub base: SecretBase,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_data: Option<Map<String, Value>>,
    #[serde(default, with = "rfc3339", skip_serializing_if = "Option::is_none")]
    pub next_rotation_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

secret_variant!(
    UsernamePasswordSecretResource,
    secret_types::USERNAME_PASSWORD,
    [
        "expiration_date",
        "username",
        "password",
        "secret_data",
        "next_rotation_date"
    ]
);

impl UsernamePasswordSecretResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: SecretBase::new(name),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_expiration_date(mut self, date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(rfc3339::seconds(date));
        self
    }
}

/// Lease duration of dynamically generated IAM credentials
///
/// The service accepts either a number of seconds or a duration string such as `1h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ttl {
    Seconds(i64),
    Duration(String),
}

/// Dynamically generated IAM API key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IamCredentialsSecretResource {
    #[serde(flatten)]
    pub base: SecretBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_api_key: Option<bool>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

secret_variant!(
    IamCredentialsSecretResource,
    secret_types::IAM_CREDENTIALS,
    ["ttl", "access_groups", "api_key", "service_id", "reuse_api_key"]
);

impl IamCredentialsSecretResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: SecretBase::new(name),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn with_access_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access_groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }
}

/// Secret of a type the registry does not know
///
/// Variant-specific fields land in `extras`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericSecretResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
    #[serde(flatten)]
    pub base: SecretBase,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Model for GenericSecretResource {
    fn check_model(&self) -> Result<()> {
        let tag: &[&str] =
            if self.secret_type.is_none() && codec::has_null_tag(&self.extras, SECRET_TYPE_FIELD) {
                &[]
            } else {
                &[SECRET_TYPE_FIELD]
            };
        check_extras("GenericSecretResource", &[SECRET_BASE_FIELDS, tag], &self.extras)
    }
}

/// A secret of any type
#[derive(Debug, Clone, PartialEq)]
pub enum SecretResource {
    Arbitrary(ArbitrarySecretResource),
    UsernamePassword(UsernamePasswordSecretResource),
    IamCredentials(IamCredentialsSecretResource),
    Generic(GenericSecretResource),
}

impl SecretResource {
    /// Discriminator value, if known
    pub fn secret_type(&self) -> Option<&str> {
        match self {
            SecretResource::Arbitrary(_) => Some(ArbitrarySecretResource::SECRET_TYPE),
            SecretResource::UsernamePassword(_) => {
                Some(UsernamePasswordSecretResource::SECRET_TYPE)
            }
            SecretResource::IamCredentials(_) => Some(IamCredentialsSecretResource::SECRET_TYPE),
            SecretResource::Generic(generic) => generic.secret_type.as_deref(),
        }
    }

    pub fn base(&self) -> &SecretBase {
        match self {
            SecretResource::Arbitrary(secret) => &secret.base,
            SecretResource::UsernamePassword(secret) => &secret.base,
            SecretResource::IamCredentials(secret) => &secret.base,
            SecretResource::Generic(secret) => &secret.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SecretBase {
        match self {
            SecretResource::Arbitrary(secret) => &mut secret.base,
            SecretResource::UsernamePassword(secret) => &mut secret.base,
            SecretResource::IamCredentials(secret) => &mut secret.base,
            SecretResource::Generic(secret) => &mut secret.base,
        }
    }

    pub fn extras(&self) -> &Map<String, Value> {
        match self {
            SecretResource::Arbitrary(secret) => &secret.extras,
            SecretResource::UsernamePassword(secret) => &secret.extras,
            SecretResource::IamCredentials(secret) => &secret.extras,
            SecretResource::Generic(secret) => &secret.extras,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.base().id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn as_arbitrary(&self) -> Option<&ArbitrarySecretResource> {
        match self {
            SecretResource::Arbitrary(secret) => Some(secret),
            _ => None,
        }
    }

    pub fn as_username_password(&self) -> Option<&UsernamePasswordSecretResource> {
        match self {
            SecretResource::UsernamePassword(secret) => Some(secret),
            _ => None,
        }
    }

    pub fn as_iam_credentials(&self) -> Option<&IamCredentialsSecretResource> {
        match self {
            SecretResource::IamCredentials(secret) => Some(secret),
            _ => None,
        }
    }

    pub(crate) fn arbitrary_from_fields(
        _secret_type: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        fields.shift_remove(SECRET_TYPE_FIELD);
        codec::object(fields).map(SecretResource::Arbitrary)
    }

    pub(crate) fn username_password_from_fields(
        _secret_type: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        fields.shift_remove(SECRET_TYPE_FIELD);
        codec::object(fields).map(SecretResource::UsernamePassword)
    }

    pub(crate) fn iam_credentials_from_fields(
        _secret_type: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        fields.shift_remove(SECRET_TYPE_FIELD);
        codec::object(fields).map(SecretResource::IamCredentials)
    }

    pub(crate) fn generic_from_fields(
        _secret_type: &str,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        codec::object_with_optional_tag(fields, SECRET_TYPE_FIELD, |secret: &mut GenericSecretResource| {
            &mut secret.extras
        })
        .map(SecretResource::Generic)
    }
}

impl From<ArbitrarySecretResource> for SecretResource {
    fn from(secret: ArbitrarySecretResource) -> Self {
        SecretResource::Arbitrary(secret)
    }
}

impl From<UsernamePasswordSecretResource> for SecretResource {
    fn from(secret: UsernamePasswordSecretResource) -> Self {
        SecretResource::UsernamePassword(secret)
    }
}

impl From<IamCredentialsSecretResource> for SecretResource {
    fn from(secret: IamCredentialsSecretResource) -> Self {
        SecretResource::IamCredentials(secret)
    }
}

impl From<GenericSecretResource> for SecretResource {
    fn from(secret: GenericSecretResource) -> Self {
        SecretResource::Generic(secret)
    }
}

/// Known variant with its discriminator written first
#[derive(Serialize)]
struct Tagged<'a, T> {
    secret_type: &'static str,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for SecretResource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SecretResource::Arbitrary(inner) => Tagged {
                secret_type: ArbitrarySecretResource::SECRET_TYPE,
                inner,
            }
            .serialize(serializer),
            SecretResource::UsernamePassword(inner) => Tagged {
                secret_type: UsernamePasswordSecretResource::SECRET_TYPE,
                inner,
            }
            .serialize(serializer),
            SecretResource::IamCredentials(inner) => Tagged {
                secret_type: IamCredentialsSecretResource::SECRET_TYPE,
                inner,
            }
            .serialize(serializer),
            SecretResource::Generic(inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SecretResource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let secret_type = fields
            .get(SECRET_TYPE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        SECRET_RESOURCES
            .resolve(&secret_type, fields)
            .map_err(D::Error::custom)
    }
}

impl Model for SecretResource {
    fn check_model(&self) -> Result<()> {
        match self {
            SecretResource::Arbitrary(secret) => secret.check_model(),
            SecretResource::UsernamePassword(secret) => secret.check_model(),
            SecretResource::IamCredentials(secret) => secret.check_model(),
            SecretResource::Generic(secret) => secret.check_model(),
        }
    }
}
