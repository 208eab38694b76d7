//! # Operations
//!
//! Every Secrets Manager endpoint, keyed by operation.
//!
//! Path templates use `{param}` placeholders so the same string works as an
//! axum route pattern and as input to [`crate::PathBuilder`].

/// HTTP verb of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Safe to repeat without changing server state beyond the first attempt
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, HttpMethod::Post)
    }
}

/// What a successful response carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseBody {
    /// A JSON document decoded into a typed result
    Json,
    /// No body; anything the server sends is discarded
    Empty,
}

/// Secrets Manager API operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretsManagerOperation {
    CreateSecretGroup,
    ListSecretGroups,
    GetSecretGroup,
    UpdateSecretGroupMetadata,
    DeleteSecretGroup,
    CreateSecret,
    ListSecrets,
    ListAllSecrets,
    GetSecret,
    UpdateSecret,
    DeleteSecret,
    GetSecretMetadata,
    UpdateSecretMetadata,
    PutPolicy,
    GetPolicy,
    PutConfig,
    GetConfig,
}

impl SecretsManagerOperation {
    pub const ALL: [SecretsManagerOperation; 17] = [
        SecretsManagerOperation::CreateSecretGroup,
        SecretsManagerOperation::ListSecretGroups,
        SecretsManagerOperation::GetSecretGroup,
        SecretsManagerOperation::UpdateSecretGroupMetadata,
        SecretsManagerOperation::DeleteSecretGroup,
        SecretsManagerOperation::CreateSecret,
        SecretsManagerOperation::ListSecrets,
        SecretsManagerOperation::ListAllSecrets,
        SecretsManagerOperation::GetSecret,
        SecretsManagerOperation::UpdateSecret,
        SecretsManagerOperation::DeleteSecret,
        SecretsManagerOperation::GetSecretMetadata,
        SecretsManagerOperation::UpdateSecretMetadata,
        SecretsManagerOperation::PutPolicy,
        SecretsManagerOperation::GetPolicy,
        SecretsManagerOperation::PutConfig,
        SecretsManagerOperation::GetConfig,
    ];

    /// Operation identifier used in telemetry headers and log spans
    pub fn name(&self) -> &'static str {
        match self {
            SecretsManagerOperation::CreateSecretGroup => "create_secret_group",
            SecretsManagerOperation::ListSecretGroups => "list_secret_groups",
            SecretsManagerOperation::GetSecretGroup => "get_secret_group",
            SecretsManagerOperation::UpdateSecretGroupMetadata => "update_secret_group_metadata",
            SecretsManagerOperation::DeleteSecretGroup => "delete_secret_group",
            SecretsManagerOperation::CreateSecret => "create_secret",
            SecretsManagerOperation::ListSecrets => "list_secrets",
            SecretsManagerOperation::ListAllSecrets => "list_all_secrets",
            SecretsManagerOperation::GetSecret => "get_secret",
            SecretsManagerOperation::UpdateSecret => "update_secret",
            SecretsManagerOperation::DeleteSecret => "delete_secret",
            SecretsManagerOperation::GetSecretMetadata => "get_secret_metadata",
            SecretsManagerOperation::UpdateSecretMetadata => "update_secret_metadata",
            SecretsManagerOperation::PutPolicy => "put_policy",
            SecretsManagerOperation::GetPolicy => "get_policy",
            SecretsManagerOperation::PutConfig => "put_config",
            SecretsManagerOperation::GetConfig => "get_config",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            SecretsManagerOperation::CreateSecretGroup
            | SecretsManagerOperation::CreateSecret
            | SecretsManagerOperation::UpdateSecret => HttpMethod::Post,
            SecretsManagerOperation::UpdateSecretGroupMetadata
            | SecretsManagerOperation::UpdateSecretMetadata
            | SecretsManagerOperation::PutPolicy
            | SecretsManagerOperation::PutConfig => HttpMethod::Put,
            SecretsManagerOperation::DeleteSecretGroup | SecretsManagerOperation::DeleteSecret => {
                HttpMethod::Delete
            }
            SecretsManagerOperation::ListSecretGroups
            | SecretsManagerOperation::GetSecretGroup
            | SecretsManagerOperation::ListSecrets
            | SecretsManagerOperation::ListAllSecrets
            | SecretsManagerOperation::GetSecret
            | SecretsManagerOperation::GetSecretMetadata
            | SecretsManagerOperation::GetPolicy
            | SecretsManagerOperation::GetConfig => HttpMethod::Get,
        }
    }

    /// Path template relative to the service base URL
    pub fn template(&self) -> &'static str {
        match self {
            SecretsManagerOperation::CreateSecretGroup
            | SecretsManagerOperation::ListSecretGroups => "/api/v1/secret_groups",
            SecretsManagerOperation::GetSecretGroup
            | SecretsManagerOperation::UpdateSecretGroupMetadata
            | SecretsManagerOperation::DeleteSecretGroup => "/api/v1/secret_groups/{id}",
            SecretsManagerOperation::CreateSecret | SecretsManagerOperation::ListSecrets => {
                "/api/v1/secrets/{secret_type}"
            }
            SecretsManagerOperation::ListAllSecrets => "/api/v1/secrets",
            SecretsManagerOperation::GetSecret
            | SecretsManagerOperation::UpdateSecret
            | SecretsManagerOperation::DeleteSecret => "/api/v1/secrets/{secret_type}/{id}",
            SecretsManagerOperation::GetSecretMetadata
            | SecretsManagerOperation::UpdateSecretMetadata => {
                "/api/v1/secrets/{secret_type}/{id}/metadata"
            }
            SecretsManagerOperation::PutPolicy | SecretsManagerOperation::GetPolicy => {
                "/api/v1/secrets/{secret_type}/{id}/policies"
            }
            SecretsManagerOperation::PutConfig | SecretsManagerOperation::GetConfig => {
                "/api/v1/config/{secret_type}"
            }
        }
    }

    /// Canonical success status; other 2xx codes are still accepted by clients
    pub fn success_status(&self) -> u16 {
        match self {
            SecretsManagerOperation::DeleteSecretGroup
            | SecretsManagerOperation::DeleteSecret
            | SecretsManagerOperation::PutConfig => 204,
            SecretsManagerOperation::CreateSecret => 201,
            _ => 200,
        }
    }

    pub fn response_body(&self) -> ResponseBody {
        match self.success_status() {
            204 => ResponseBody::Empty,
            _ => ResponseBody::Json,
        }
    }

    /// Whether the request carries a JSON body
    pub fn has_request_body(&self) -> bool {
        matches!(
            self,
            SecretsManagerOperation::CreateSecretGroup
                | SecretsManagerOperation::UpdateSecretGroupMetadata
                | SecretsManagerOperation::CreateSecret
                | SecretsManagerOperation::UpdateSecret
                | SecretsManagerOperation::UpdateSecretMetadata
                | SecretsManagerOperation::PutPolicy
                | SecretsManagerOperation::PutConfig
        )
    }

    /// Names of the `{param}` placeholders in template order
    pub fn path_parameters(&self) -> Vec<&'static str> {
        let template = self.template();
        template
            .split('/')
            .filter_map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
            })
            .collect()
    }
}
