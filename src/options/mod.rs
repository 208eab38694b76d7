//! # Operation Options
//!
//! One options type per endpoint. Required values are taken by `new`; optional
//! ones are set with `with_*`. Fields stay public and are re-validated when the
//! call is made, so a value edited after construction cannot skip validation.

mod engine;
mod policies;
mod secret_groups;
mod secrets;

pub use engine::{GetConfigOptions, PutConfigOptions};
pub use policies::{GetPolicyOptions, PutPolicyOptions};
pub use secret_groups::{
    CreateSecretGroupOptions, DeleteSecretGroupOptions, GetSecretGroupOptions,
    ListSecretGroupsOptions, UpdateSecretGroupMetadataOptions,
};
pub use secrets::{
    CreateSecretOptions, DeleteSecretOptions, GetSecretMetadataOptions, GetSecretOptions,
    ListAllSecretsOptions, ListSecretsOptions, UpdateSecretMetadataOptions, UpdateSecretOptions,
};

use crate::codec::{self, Model};
use crate::error::Result;
use crate::models::{CollectionEnvelope, CollectionMetadata};
use serde_json::Value;
use std::collections::HashMap;

/// Caller headers applied over the defaults
pub type Headers = HashMap<String, String>;

/// `with_headers` for options types that carry a `headers` field
macro_rules! impl_headers {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                #[must_use]
                pub fn with_headers(mut self, headers: $crate::options::Headers) -> Self {
                    self.headers = Some(headers);
                    self
                }
            }
        )+
    };
}

pub(crate) use impl_headers;

/// Push `limit`/`offset` when set
pub(crate) fn push_paging(
    query: &mut Vec<(&'static str, String)>,
    limit: Option<i64>,
    offset: Option<i64>,
) {
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(offset) = offset {
        query.push(("offset", offset.to_string()));
    }
}

/// `{metadata, resources}` body; `None` until both parts are set
pub(crate) fn envelope_body<T: Model + Clone>(
    metadata: Option<&CollectionMetadata>,
    resources: Option<&Vec<T>>,
) -> Result<Option<Value>> {
    match (metadata, resources) {
        (Some(metadata), Some(resources)) => codec::encode(&CollectionEnvelope {
            metadata: metadata.clone(),
            resources: resources.clone(),
        })
        .map(Some),
        _ => Ok(None),
    }
}
