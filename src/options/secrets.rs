//! Secret operations

use super::{envelope_body, impl_headers, push_paging, Headers};
use crate::codec;
use crate::error::Result;
use crate::models::{
    CollectionMetadata, SecretAction, SecretCollection, SecretMetadata, SecretMetadataCollection,
    SecretResource, SECRET_TYPE_FIELD,
};
use crate::operation::{decode_json, require, Operation, Validate};
use paths::SecretsManagerOperation;
use serde_json::Value;

fn secret_path(secret_type: Option<&String>, id: Option<&String>) -> Vec<(&'static str, String)> {
    vec![
        ("secret_type", secret_type.cloned().unwrap_or_default()),
        ("id", id.cloned().unwrap_or_default()),
    ]
}

/// Create a secret of the type named in the path
///
/// The path carries the secret type, so each resource is sent without its
/// `secret_type` field.
#[derive(Debug, Clone, Default)]
pub struct CreateSecretOptions {
    pub secret_type: Option<String>,
    pub metadata: Option<CollectionMetadata>,
    pub resources: Option<Vec<SecretResource>>,
    pub headers: Option<Headers>,
}

impl CreateSecretOptions {
    pub fn new(
        secret_type: impl Into<String>,
        metadata: CollectionMetadata,
        resources: Vec<SecretResource>,
    ) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            metadata: Some(metadata),
            resources: Some(resources),
            headers: None,
        }
    }
}

impl Validate for CreateSecretOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.metadata, "metadata")?;
        require(&self.resources, "resources")?;
        Ok(())
    }
}

impl Operation for CreateSecretOptions {
    type Output = SecretCollection;
    const NAME: &'static str = "create_secret";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::CreateSecret
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("secret_type", self.secret_type.clone().unwrap_or_default())]
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn body(&self) -> Result<Option<Value>> {
        let mut body = envelope_body(self.metadata.as_ref(), self.resources.as_ref())?;
        if let Some(Value::Array(resources)) = body
            .as_mut()
            .and_then(|envelope| envelope.get_mut("resources"))
        {
            for resource in resources.iter_mut().filter_map(Value::as_object_mut) {
                resource.shift_remove(SECRET_TYPE_FIELD);
            }
        }
        Ok(body)
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListSecretsOptions {
    pub secret_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub headers: Option<Headers>,
}

impl ListSecretsOptions {
    pub fn new(secret_type: impl Into<String>) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            ..Default::default()
        }
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

impl Validate for ListSecretsOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        Ok(())
    }
}

impl Operation for ListSecretsOptions {
    type Output = SecretCollection;
    const NAME: &'static str = "list_secrets";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::ListSecrets
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("secret_type", self.secret_type.clone().unwrap_or_default())]
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

/// List secrets of every type
#[derive(Debug, Clone, Default)]
pub struct ListAllSecretsOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Filter on name, labels and description
    pub search: Option<String>,
    /// Field to sort by, e.g. `name`
    pub sort_by: Option<String>,
    /// Secret group ids; `default` selects secrets outside any group
    pub groups: Option<Vec<String>>,
    pub headers: Option<Headers>,
}

impl ListAllSecretsOptions {
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

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    #[must_use]
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }
}

impl Validate for ListAllSecretsOptions {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Operation for ListAllSecretsOptions {
    type Output = SecretCollection;
    const NAME: &'static str = "list_all_secrets";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::ListAllSecrets
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_paging(&mut query, self.limit, self.offset);
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sort_by", sort_by.clone()));
        }
        for group in self.groups.iter().flatten() {
            query.push(("groups", group.clone()));
        }
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
pub struct GetSecretOptions {
    pub secret_type: Option<String>,
    pub id: Option<String>,
    pub headers: Option<Headers>,
}

impl GetSecretOptions {
    pub fn new(secret_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            id: Some(id.into()),
            headers: None,
        }
    }
}

impl Validate for GetSecretOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.id, "id")?;
        Ok(())
    }
}

impl Operation for GetSecretOptions {
    type Output = SecretCollection;
    const NAME: &'static str = "get_secret";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::GetSecret
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        secret_path(self.secret_type.as_ref(), self.id.as_ref())
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

/// Invoke an action on a secret
///
/// `action` defaults to the action implied by `secret_action`.
#[derive(Debug, Clone, Default)]
pub struct UpdateSecretOptions {
    pub secret_type: Option<String>,
    pub id: Option<String>,
    pub action: Option<String>,
    pub secret_action: Option<SecretAction>,
    pub headers: Option<Headers>,
}

impl UpdateSecretOptions {
    pub fn new(
        secret_type: impl Into<String>,
        id: impl Into<String>,
        secret_action: SecretAction,
    ) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            id: Some(id.into()),
            action: None,
            secret_action: Some(secret_action),
            headers: None,
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Value sent as the `action` query parameter
    pub fn effective_action(&self) -> Option<&str> {
        self.action
            .as_deref()
            .or_else(|| self.secret_action.as_ref().map(SecretAction::action))
    }
}

impl Validate for UpdateSecretOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.id, "id")?;
        require(&self.secret_action, "secret_action")?;
        Ok(())
    }
}

impl Operation for UpdateSecretOptions {
    type Output = SecretCollection;
    const NAME: &'static str = "update_secret";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::UpdateSecret
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        secret_path(self.secret_type.as_ref(), self.id.as_ref())
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        self.effective_action()
            .map(|action| vec![("action", action.to_string())])
            .unwrap_or_default()
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn body(&self) -> Result<Option<Value>> {
        self.secret_action.as_ref().map(codec::encode).transpose()
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteSecretOptions {
    pub secret_type: Option<String>,
    pub id: Option<String>,
    pub headers: Option<Headers>,
}

impl DeleteSecretOptions {
    pub fn new(secret_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            id: Some(id.into()),
            headers: None,
        }
    }
}

impl Validate for DeleteSecretOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.id, "id")?;
        Ok(())
    }
}

impl Operation for DeleteSecretOptions {
    type Output = ();
    const NAME: &'static str = "delete_secret";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::DeleteSecret
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        secret_path(self.secret_type.as_ref(), self.id.as_ref())
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, _body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetSecretMetadataOptions {
    pub secret_type: Option<String>,
    pub id: Option<String>,
    pub headers: Option<Headers>,
}

impl GetSecretMetadataOptions {
    pub fn new(secret_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            id: Some(id.into()),
            headers: None,
        }
    }
}

impl Validate for GetSecretMetadataOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.id, "id")?;
        Ok(())
    }
}

impl Operation for GetSecretMetadataOptions {
    type Output = SecretMetadataCollection;
    const NAME: &'static str = "get_secret_metadata";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::GetSecretMetadata
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        secret_path(self.secret_type.as_ref(), self.id.as_ref())
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

/// Update the writable metadata of a secret; read-only fields are not sent
#[derive(Debug, Clone, Default)]
pub struct UpdateSecretMetadataOptions {
    pub secret_type: Option<String>,
    pub id: Option<String>,
    pub metadata: Option<CollectionMetadata>,
    pub resources: Option<Vec<SecretMetadata>>,
    pub headers: Option<Headers>,
}

impl UpdateSecretMetadataOptions {
    pub fn new(
        secret_type: impl Into<String>,
        id: impl Into<String>,
        metadata: CollectionMetadata,
        resources: Vec<SecretMetadata>,
    ) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            id: Some(id.into()),
            metadata: Some(metadata),
            resources: Some(resources),
            headers: None,
        }
    }
}

impl Validate for UpdateSecretMetadataOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.id, "id")?;
        require(&self.metadata, "metadata")?;
        require(&self.resources, "resources")?;
        Ok(())
    }
}

impl Operation for UpdateSecretMetadataOptions {
    type Output = SecretMetadataCollection;
    const NAME: &'static str = "update_secret_metadata";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::UpdateSecretMetadata
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        secret_path(self.secret_type.as_ref(), self.id.as_ref())
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn body(&self) -> Result<Option<Value>> {
        let writable = self
            .resources
            .as_ref()
            .map(|resources| resources.iter().map(SecretMetadata::updatable).collect::<Vec<_>>());
        envelope_body(self.metadata.as_ref(), writable.as_ref())
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        decode_json(body)
    }
}

impl_headers!(
    CreateSecretOptions,
    ListSecretsOptions,
    ListAllSecretsOptions,
    GetSecretOptions,
    UpdateSecretOptions,
    DeleteSecretOptions,
    GetSecretMetadataOptions,
    UpdateSecretMetadataOptions,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{media_types, secret_types};
    use crate::error::Error;
    use crate::models::{ArbitrarySecretResource, SecretVariant};
    use serde_json::json;

    #[test]
    fn test_create_body_omits_secret_type() {
        let options = CreateSecretOptions::new(
            secret_types::ARBITRARY,
            CollectionMetadata::new(media_types::SECRET, 1),
            vec![ArbitrarySecretResource::new("example-arbitrary-secret")
                .with_payload("secret-data")
                .into()],
        );
        let body = options.body().unwrap().unwrap();
        assert_eq!(
            body.to_string(),
            r#"{"metadata":{"collection_type":"application/vnd.ibm.secrets-manager.secret+json","collection_total":1},"resources":[{"name":"example-arbitrary-secret","payload":"secret-data"}]}"#
        );
    }

    #[test]
    fn test_create_body_rejects_colliding_extra() {
        let options = CreateSecretOptions::new(
            secret_types::ARBITRARY,
            CollectionMetadata::new(media_types::SECRET, 1),
            vec![ArbitrarySecretResource::new("x").with_extra("name", "y").into()],
        );
        assert!(matches!(options.body(), Err(Error::InvalidModel { .. })));
    }

    #[test]
    fn test_validation_order_and_names() {
        let mut options = GetSecretOptions::default();
        assert!(matches!(
            options.validate(),
            Err(Error::MissingRequiredField { name: "secret_type" })
        ));
        options.secret_type = Some("arbitrary".to_string());
        assert!(matches!(
            options.validate(),
            Err(Error::MissingRequiredField { name: "id" })
        ));
    }

    #[test]
    fn test_unknown_secret_type_is_forwarded() {
        let options = ListSecretsOptions::new("not_a_type_yet");
        assert!(options.validate().is_ok());
        assert_eq!(
            options.path_params(),
            vec![("secret_type", "not_a_type_yet".to_string())]
        );
    }

    #[test]
    fn test_update_secret_action_defaults_from_body() {
        let options = UpdateSecretOptions::new(
            secret_types::IAM_CREDENTIALS,
            "s1",
            SecretAction::delete_credentials_for_iam("ServiceId-1"),
        );
        assert_eq!(
            options.query_params(),
            vec![("action", "delete_credentials".to_string())]
        );
        assert_eq!(
            options.body().unwrap(),
            Some(json!({"service_id": "ServiceId-1"}))
        );
        let explicit = options.with_action("revoke");
        assert_eq!(explicit.effective_action(), Some("revoke"));
    }

    #[test]
    fn test_update_secret_requires_action_body() {
        let options = UpdateSecretOptions {
            secret_type: Some("arbitrary".to_string()),
            id: Some("s1".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::MissingRequiredField { name: "secret_action" })
        ));
    }

    #[test]
    fn test_list_all_repeats_group_key() {
        let options = ListAllSecretsOptions::new()
            .with_groups(["g1", "default"])
            .with_search("db")
            .with_limit(5);
        assert_eq!(
            options.query_params(),
            vec![
                ("limit", "5".to_string()),
                ("search", "db".to_string()),
                ("groups", "g1".to_string()),
                ("groups", "default".to_string()),
            ]
        );
    }

    #[test]
    fn test_metadata_update_sends_writable_fields_only() {
        let mut metadata = SecretMetadata::new("renamed");
        metadata.state = Some(1);
        metadata.crn = Some("crn:x".to_string());
        let options = UpdateSecretMetadataOptions::new(
            secret_types::ARBITRARY,
            "s1",
            CollectionMetadata::new(media_types::SECRET, 1),
            vec![metadata],
        );
        assert_eq!(
            options.body().unwrap().unwrap()["resources"],
            json!([{"name": "renamed"}])
        );
    }
}
