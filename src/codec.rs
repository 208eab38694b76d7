//! # Model Codec
//!
//! Shared encoding rules for every model:
//!
//! - Absent optional fields are omitted, never written as `null`
//! - Additional properties follow the declared fields and may not shadow them
//! - Dates are RFC 3339, UTC, seconds precision; setters and the decoder drop
//!   fractional seconds so a value equals its own decoded encoding

use crate::error::{Error, Result};
use serde::de::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};

/// A model that can be checked before it is encoded
pub trait Model: Serialize {
    /// Reject additional properties that collide with a declared field
    ///
    /// # Errors
    ///
    /// [`Error::InvalidModel`] naming the first colliding key.
    fn check_model(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: Model> Model for Vec<T> {
    fn check_model(&self) -> Result<()> {
        self.iter().try_for_each(Model::check_model)
    }
}

/// Encode `value` to JSON after the collision check
///
/// # Errors
///
/// [`Error::InvalidModel`] when an additional property shadows a declared field.
pub fn encode<M: Model + ?Sized>(value: &M) -> Result<Value> {
    value.check_model()?;
    serde_json::to_value(value).map_err(|e| Error::InvalidModel {
        model: std::any::type_name::<M>(),
        key: e.to_string(),
    })
}

/// Fail if any key of `extras` is one of `declared`
pub(crate) fn check_extras(
    model: &'static str,
    declared: &[&[&str]],
    extras: &Map<String, Value>,
) -> Result<()> {
    match extras
        .keys()
        .find(|key| declared.iter().any(|fields| fields.contains(&key.as_str())))
    {
        Some(key) => Err(Error::InvalidModel {
            model,
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

/// Decode a JSON object into `T`, failing on anything but an object
pub(crate) fn object<T: serde::de::DeserializeOwned>(
    fields: Map<String, Value>,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(fields))
}

/// Decode a fallback model whose discriminator `tag` may be a string, absent or `null`
///
/// A `null` tag decodes as absent and is kept in the extras returned by
/// `extras`, so it is written back on encode.
pub(crate) fn object_with_optional_tag<T, F>(
    mut fields: Map<String, Value>,
    tag: &str,
    extras: F,
) -> Result<T, serde_json::Error>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(&mut T) -> &mut Map<String, Value>,
{
    let null_tag = match fields.get(tag) {
        None | Some(Value::String(_)) => false,
        Some(Value::Null) => {
            fields.shift_remove(tag);
            true
        }
        Some(_) => {
            return Err(serde_json::Error::custom(format!(
                "{tag} must be a string or null"
            )))
        }
    };
    let mut value: T = object(fields)?;
    if null_tag {
        extras(&mut value).insert(tag.to_string(), Value::Null);
    }
    Ok(value)
}

/// Whether `extras` carries a `null` discriminator kept by [`object_with_optional_tag`]
pub(crate) fn has_null_tag(extras: &Map<String, Value>, tag: &str) -> bool {
    extras.get(tag).is_some_and(Value::is_null)
}

/// `Option<DateTime<Utc>>` as RFC 3339 with seconds precision
pub mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// `date` at the precision it is written with
    pub fn seconds(date: DateTime<Utc>) -> DateTime<Utc> {
        date.trunc_subsecs(0)
    }

    #[allow(
        clippy::ref_option,
        reason = "serde `with` modules receive a reference to the field"
    )]
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|date| seconds(date.with_timezone(&Utc)))
                    .map_err(|e| serde::de::Error::custom(format!("invalid date '{raw}': {e}")))
            })
            .transpose()
    }
}
