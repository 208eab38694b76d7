//! Secret group operations

use super::{envelope_body, impl_headers, push_paging, Headers};
use crate::error::Result;
use crate::models::{
    CollectionMetadata, SecretGroupCollection, SecretGroupMetadataUpdatable, SecretGroupResource,
};
use crate::operation::{decode_json, require, Operation, Validate};
use paths::SecretsManagerOperation;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct CreateSecretGroupOptions {
    pub metadata: Option<CollectionMetadata>,
    pub resources: Option<Vec<SecretGroupResource>>,
    pub headers: Option<Headers>,
}

impl CreateSecretGroupOptions {
    pub fn new(metadata: CollectionMetadata, resources: Vec<SecretGroupResource>) -> Self {
        Self {
            metadata: Some(metadata),
            resources: Some(resources),
            headers: None,
        }
    }
}

impl Validate for CreateSecretGroupOptions {
    fn validate(&self) -> Result<()> {
        require(&self.metadata, "metadata")?;
        require(&self.resources, "resources")?;
        Ok(())
    }
}

impl Operation for CreateSecretGroupOptions {
    type Output = SecretGroupCollection;
    const NAME: &'static str = "create_secret_group";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::CreateSecretGroup
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
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

#[derive(Debug, Clone, Default)]
pub struct ListSecretGroupsOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub headers: Option<Headers>,
}

impl ListSecretGroupsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl Validate for ListSecretGroupsOptions {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Operation for ListSecretGroupsOptions {
    type Output = SecretGroupCollection;
    const NAME: &'static str = "list_secret_groups";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::ListSecretGroups
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_paging(&mut query, self.limit, self.offset);
        query
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetSecretGroupOptions {
    pub id: Option<String>,
    pub headers: Option<Headers>,
}

impl GetSecretGroupOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            headers: None,
        }
    }
}

impl Validate for GetSecretGroupOptions {
    fn validate(&self) -> Result<()> {
        require(&self.id, "id")?;
        Ok(())
    }
}

impl Operation for GetSecretGroupOptions {
    type Output = SecretGroupCollection;
    const NAME: &'static str = "get_secret_group";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::GetSecretGroup
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.clone().unwrap_or_default())]
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSecretGroupMetadataOptions {
    pub id: Option<String>,
    pub metadata: Option<CollectionMetadata>,
    pub resources: Option<Vec<SecretGroupMetadataUpdatable>>,
    pub headers: Option<Headers>,
}

impl UpdateSecretGroupMetadataOptions {
    pub fn new(
        id: impl Into<String>,
        metadata: CollectionMetadata,
        resources: Vec<SecretGroupMetadataUpdatable>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            metadata: Some(metadata),
            resources: Some(resources),
            headers: None,
        }
    }
}

impl Validate for UpdateSecretGroupMetadataOptions {
    fn validate(&self) -> Result<()> {
        require(&self.id, "id")?;
        require(&self.metadata, "metadata")?;
        require(&self.resources, "resources")?;
        Ok(())
    }
}

impl Operation for UpdateSecretGroupMetadataOptions {
    type Output = SecretGroupCollection;
    const NAME: &'static str = "update_secret_group_metadata";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::UpdateSecretGroupMetadata
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.clone().unwrap_or_default())]
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

#[derive(Debug, Clone, Default)]
pub struct DeleteSecretGroupOptions {
    pub id: Option<String>,
    pub headers: Option<Headers>,
}

impl DeleteSecretGroupOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            headers: None,
        }
    }
}

impl Validate for DeleteSecretGroupOptions {
    fn validate(&self) -> Result<()> {
        require(&self.id, "id")?;
        Ok(())
    }
}

impl Operation for DeleteSecretGroupOptions {
    type Output = ();
    const NAME: &'static str = "delete_secret_group";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::DeleteSecretGroup
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.clone().unwrap_or_default())]
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, _body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        Ok(())
    }
}

impl_headers!(
    CreateSecretGroupOptions,
    ListSecretGroupsOptions,
    GetSecretGroupOptions,
    UpdateSecretGroupMetadataOptions,
    DeleteSecretGroupOptions,
);
