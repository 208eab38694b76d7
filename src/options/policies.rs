//! Secret policy operations

use super::{envelope_body, impl_headers, Headers};
use crate::constants::policies;
use crate::error::Result;
use crate::models::{CollectionMetadata, PolicyCollection, SecretPolicyRotation};
use crate::operation::{decode_json, require, Operation, Validate};
use paths::SecretsManagerOperation;
use serde_json::Value;

/// Set the policies of a secret
///
/// `policy` defaults to `rotation`, the only policy kind the service defines.
#[derive(Debug, Clone, Default)]
pub struct PutPolicyOptions {
    pub secret_type: Option<String>,
    pub id: Option<String>,
    pub metadata: Option<CollectionMetadata>,
    pub resources: Option<Vec<SecretPolicyRotation>>,
    pub policy: Option<String>,
    pub headers: Option<Headers>,
}

impl PutPolicyOptions {
    pub fn new(
        secret_type: impl Into<String>,
        id: impl Into<String>,
        metadata: CollectionMetadata,
        resources: Vec<SecretPolicyRotation>,
    ) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            id: Some(id.into()),
            metadata: Some(metadata),
            resources: Some(resources),
            policy: Some(policies::ROTATION.to_string()),
            headers: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }
}

impl Validate for PutPolicyOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.id, "id")?;
        require(&self.metadata, "metadata")?;
        require(&self.resources, "resources")?;
        require(&self.policy, "policy")?;
        Ok(())
    }
}

impl Operation for PutPolicyOptions {
    type Output = PolicyCollection;
    const NAME: &'static str = "put_policy";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::PutPolicy
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("secret_type", self.secret_type.clone().unwrap_or_default()),
            ("id", self.id.clone().unwrap_or_default()),
        ]
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        self.policy
            .iter()
            .map(|policy| ("policy", policy.clone()))
            .collect()
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn body(&self) -> Result<Option<Value>> {
        envelope_body(self.metadata.as_ref(), self.resources.as_ref())
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

/// Read the policies of a secret; without `policy` every kind is returned
#[derive(Debug, Clone, Default)]
pub struct GetPolicyOptions {
    pub secret_type: Option<String>,
    pub id: Option<String>,
    pub policy: Option<String>,
    pub headers: Option<Headers>,
}

impl GetPolicyOptions {
    pub fn new(secret_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            id: Some(id.into()),
            policy: None,
            headers: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }
}

impl Validate for GetPolicyOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.id, "id")?;
        Ok(())
    }
}

impl Operation for GetPolicyOptions {
    type Output = PolicyCollection;
    const NAME: &'static str = "get_policy";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::GetPolicy
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("secret_type", self.secret_type.clone().unwrap_or_default()),
            ("id", self.id.clone().unwrap_or_default()),
        ]
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        self.policy
            .iter()
            .map(|policy| ("policy", policy.clone()))
            .collect()
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

impl_headers!(PutPolicyOptions, GetPolicyOptions);
