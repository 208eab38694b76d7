//! # In-Memory Store
//!
//! Secret groups, secrets, policies and engine configuration held as JSON
//! objects. The store assigns server-side fields (ids, CRNs, dates, state) and
//! enforces the service's conflict rules; handlers only translate HTTP.
//!
//! Secret material lives under `secret_data` and is only returned by
//! [`Store::get_secret`] and by actions.

use crate::errors::ApiError;
use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

pub type Object = Map<String, Value>;
pub type StoreResult<T> = Result<T, ApiError>;

pub const ARBITRARY: &str = "arbitrary";
pub const USERNAME_PASSWORD: &str = "username_password";
pub const IAM_CREDENTIALS: &str = "iam_credentials";

pub const SECRET_TYPES: [&str; 3] = [ARBITRARY, USERNAME_PASSWORD, IAM_CREDENTIALS];

pub const SECRET_GROUP_TYPE: &str = "application/vnd.ibm.secrets-manager.secret.group+json";
pub const SECRET_POLICY_TYPE: &str = "application/vnd.ibm.secrets-manager.secret.policy+json";

const STATE_ACTIVE: i64 = 1;

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn crn(kind: &str, id: &str) -> String {
    format!("crn:v1:bluemix:public:secrets-manager:us-south:a/mock:mock-instance:{kind}:{id}")
}

fn text<'a>(object: &'a Object, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

fn required_name(resource: &Object) -> StoreResult<String> {
    text(resource, "name")
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("name is required"))
}

fn check_secret_type(secret_type: &str) -> StoreResult<()> {
    if SECRET_TYPES.contains(&secret_type) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "unsupported secret type: {secret_type}"
        )))
    }
}

/// `limit`/`offset` window over a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Page {
    fn apply<T: Clone>(self, items: &[T]) -> Vec<T> {
        let rest = items.iter().skip(self.offset);
        match self.limit {
            Some(limit) => rest.take(limit).cloned().collect(),
            None => rest.cloned().collect(),
        }
    }
}

/// Filters accepted by the all-secrets listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretFilter {
    pub search: Option<String>,
    pub groups: Vec<String>,
}

impl SecretFilter {
    fn matches(&self, secret: &Object) -> bool {
        let name_matches = self.search.as_deref().is_none_or(|search| {
            text(secret, "name").is_some_and(|name| name.contains(search))
        });
        let group_matches = self.groups.is_empty()
            || text(secret, "secret_group_id")
                .is_some_and(|group| self.groups.iter().any(|g| g == group));
        name_matches && group_matches
    }
}

#[derive(Debug, Default)]
pub struct Store {
    groups: Vec<Object>,
    secrets: Vec<Object>,
    /// Policies by secret id
    policies: HashMap<String, Vec<Object>>,
    /// Engine configuration by secret type
    configs: HashMap<String, Object>,
}

/// Secret as listed: everything except its material
fn redacted(secret: &Object) -> Object {
    let mut listed = secret.clone();
    listed.shift_remove("secret_data");
    listed
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // Secret groups

    pub fn create_group(&mut self, mut resource: Object) -> StoreResult<Object> {
        let name = required_name(&resource)?;
        if self
            .groups
            .iter()
            .any(|group| text(group, "name") == Some(name.as_str()))
        {
            return Err(ApiError::conflict(
                "A secret group with the same name already exists",
            ));
        }
        let timestamp = now();
        resource.insert("id".into(), json!(Uuid::new_v4().to_string()));
        resource.insert("creation_date".into(), json!(timestamp));
        resource.insert("last_update_date".into(), json!(timestamp));
        resource.insert("type".into(), json!(SECRET_GROUP_TYPE));
        self.groups.push(resource.clone());
        Ok(resource)
    }

    pub fn list_groups(&self, page: Page) -> Vec<Object> {
        page.apply(&self.groups)
    }

    fn group_mut(&mut self, id: &str) -> StoreResult<&mut Object> {
        self.groups
            .iter_mut()
            .find(|group| text(group, "id") == Some(id))
            .ok_or_else(|| ApiError::not_found(format!("secret group not found: {id}")))
    }

    pub fn get_group(&mut self, id: &str) -> StoreResult<Object> {
        self.group_mut(id).map(|group| group.clone())
    }

    pub fn update_group(&mut self, id: &str, patch: &Object) -> StoreResult<Object> {
        let group = self.group_mut(id)?;
        for key in ["name", "description"] {
            if let Some(value) = patch.get(key) {
                group.insert(key.to_string(), value.clone());
            }
        }
        group.insert("last_update_date".into(), json!(now()));
        Ok(group.clone())
    }

    pub fn delete_group(&mut self, id: &str) -> StoreResult<()> {
        self.group_mut(id)?;
        if self
            .secrets
            .iter()
            .any(|secret| text(secret, "secret_group_id") == Some(id))
        {
            return Err(ApiError::new(
                StatusCode::PRECONDITION_FAILED,
                "secret group is not empty",
            ));
        }
        self.groups.retain(|group| text(group, "id") != Some(id));
        Ok(())
    }

    // Secrets

    pub fn create_secret(&mut self, secret_type: &str, mut resource: Object) -> StoreResult<Object> {
        check_secret_type(secret_type)?;
        let name = required_name(&resource)?;
        if self.secrets.iter().any(|secret| {
            text(secret, "secret_type") == Some(secret_type)
                && text(secret, "name") == Some(name.as_str())
        }) {
            return Err(ApiError::conflict(
                "A secret with the same name already exists",
            ));
        }
        if let Some(group) = text(&resource, "secret_group_id").map(str::to_string) {
            self.group_mut(&group)?;
        }

        let mut secret_data = Object::new();
        match secret_type {
            ARBITRARY => {
                let payload = resource
                    .shift_remove("payload")
                    .ok_or_else(|| ApiError::bad_request("payload is required"))?;
                secret_data.insert("payload".into(), payload);
            }
            USERNAME_PASSWORD => {
                let username = text(&resource, "username")
                    .ok_or_else(|| ApiError::bad_request("username is required"))?
                    .to_string();
                let password = resource
                    .shift_remove("password")
                    .unwrap_or_else(|| json!(Uuid::new_v4().simple().to_string()));
                secret_data.insert("username".into(), json!(username));
                secret_data.insert("password".into(), password);
            }
            _ => {
                if !self.configs.contains_key(IAM_CREDENTIALS) {
                    return Err(ApiError::bad_request(
                        "the iam_credentials engine is not configured",
                    ));
                }
                resource
                    .entry("service_id")
                    .or_insert_with(|| json!(format!("ServiceId-{}", Uuid::new_v4())));
                secret_data.insert(
                    "api_key".into(),
                    json!(Uuid::new_v4().simple().to_string()),
                );
            }
        }

        let id = Uuid::new_v4().to_string();
        let timestamp = now();
        resource.insert("id".into(), json!(id));
        resource.insert("secret_type".into(), json!(secret_type));
        resource.insert("crn".into(), json!(crn("secret", &id)));
        resource.insert("state".into(), json!(STATE_ACTIVE));
        resource.insert("state_description".into(), json!("Active"));
        resource.insert("creation_date".into(), json!(timestamp));
        resource.insert("last_update_date".into(), json!(timestamp));
        resource.insert("created_by".into(), json!("mock-user"));
        resource.insert("versions_total".into(), json!(1));
        resource.insert("secret_data".into(), Value::Object(secret_data));

        self.secrets.push(resource.clone());
        Ok(resource)
    }

    pub fn list_secrets(
        &self,
        secret_type: Option<&str>,
        filter: &SecretFilter,
        page: Page,
    ) -> StoreResult<Vec<Object>> {
        if let Some(secret_type) = secret_type {
            check_secret_type(secret_type)?;
        }
        let matching: Vec<Object> = self
            .secrets
            .iter()
            .filter(|secret| {
                secret_type.is_none_or(|t| text(secret, "secret_type") == Some(t))
                    && filter.matches(secret)
            })
            .map(redacted)
            .collect();
        Ok(page.apply(&matching))
    }

    fn secret_mut(&mut self, secret_type: &str, id: &str) -> StoreResult<&mut Object> {
        check_secret_type(secret_type)?;
        self.secrets
            .iter_mut()
            .find(|secret| {
                text(secret, "secret_type") == Some(secret_type) && text(secret, "id") == Some(id)
            })
            .ok_or_else(|| ApiError::not_found(format!("secret not found: {id}")))
    }

    pub fn get_secret(&mut self, secret_type: &str, id: &str) -> StoreResult<Object> {
        self.secret_mut(secret_type, id).map(|secret| secret.clone())
    }

    pub fn secret_metadata(&mut self, secret_type: &str, id: &str) -> StoreResult<Object> {
        self.secret_mut(secret_type, id).map(|secret| redacted(secret))
    }

    pub fn update_metadata(
        &mut self,
        secret_type: &str,
        id: &str,
        patch: &Object,
    ) -> StoreResult<Object> {
        let secret = self.secret_mut(secret_type, id)?;
        for key in ["name", "description", "labels", "expiration_date", "ttl"] {
            if let Some(value) = patch.get(key) {
                secret.insert(key.to_string(), value.clone());
            }
        }
        secret.insert("last_update_date".into(), json!(now()));
        Ok(redacted(secret))
    }

    /// Run `action` against a secret; the updated secret includes its material
    pub fn apply_action(
        &mut self,
        secret_type: &str,
        id: &str,
        action: &str,
        body: &Object,
    ) -> StoreResult<Object> {
        let secret = self.secret_mut(secret_type, id)?;
        let data = secret
            .entry("secret_data")
            .or_insert_with(|| Value::Object(Object::new()));
        let Value::Object(data) = data else {
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "corrupt secret data",
            ));
        };

        match (secret_type, action) {
            (ARBITRARY, "rotate") => {
                let payload = body
                    .get("payload")
                    .cloned()
                    .ok_or_else(|| ApiError::bad_request("payload is required"))?;
                data.insert("payload".into(), payload);
            }
            (USERNAME_PASSWORD, "rotate") => {
                let password = body
                    .get("password")
                    .cloned()
                    .unwrap_or_else(|| json!(Uuid::new_v4().simple().to_string()));
                data.insert("password".into(), password);
            }
            (IAM_CREDENTIALS, "delete_credentials") => {
                data.shift_remove("api_key");
            }
            _ => {
                return Err(ApiError::bad_request(format!(
                    "action '{action}' is not supported for secret type {secret_type}"
                )))
            }
        }

        if action == "rotate" {
            let versions = secret
                .get("versions_total")
                .and_then(Value::as_i64)
                .unwrap_or(1);
            secret.insert("versions_total".into(), json!(versions + 1));
        }
        secret.insert("last_update_date".into(), json!(now()));
        Ok(secret.clone())
    }

    pub fn delete_secret(&mut self, secret_type: &str, id: &str) -> StoreResult<()> {
        self.secret_mut(secret_type, id)?;
        self.secrets.retain(|secret| text(secret, "id") != Some(id));
        self.policies.remove(id);
        Ok(())
    }

    // Policies

    /// Replace the rotation policies of a secret
    pub fn put_policies(
        &mut self,
        secret_type: &str,
        id: &str,
        policy: &str,
        resources: &[Value],
    ) -> StoreResult<Vec<Object>> {
        if policy != "rotation" {
            return Err(ApiError::bad_request(format!("unsupported policy: {policy}")));
        }
        if secret_type == IAM_CREDENTIALS {
            return Err(ApiError::bad_request(
                "rotation policies are not supported for iam_credentials secrets",
            ));
        }
        let secret_crn = text(self.secret_mut(secret_type, id)?, "crn")
            .unwrap_or_default()
            .to_string();

        let timestamp = now();
        let mut stored = Vec::with_capacity(resources.len());
        for resource in resources {
            let Value::Object(resource) = resource else {
                return Err(ApiError::bad_request("policy must be an object"));
            };
            let rotation = resource
                .get("rotation")
                .and_then(Value::as_object)
                .ok_or_else(|| ApiError::bad_request("rotation is required"))?;
            let interval = rotation.get("interval").and_then(Value::as_i64);
            let unit = rotation.get("unit").and_then(Value::as_str);
            if !matches!((interval, unit), (Some(1..), Some("day" | "month"))) {
                return Err(ApiError::bad_request(
                    "rotation needs a positive interval and a unit of day or month",
                ));
            }
            let mut entry = Object::new();
            entry.insert("id".into(), json!(Uuid::new_v4().to_string()));
            entry.insert("crn".into(), json!(secret_crn));
            entry.insert("creation_date".into(), json!(timestamp));
            entry.insert("created_by".into(), json!("mock-user"));
            entry.insert("last_update_date".into(), json!(timestamp));
            entry.insert("updated_by".into(), json!("mock-user"));
            entry.insert("type".into(), json!(SECRET_POLICY_TYPE));
            entry.insert("rotation".into(), Value::Object(rotation.clone()));
            stored.push(entry);
        }
        self.policies.insert(id.to_string(), stored.clone());
        Ok(stored)
    }

    pub fn get_policies(
        &mut self,
        secret_type: &str,
        id: &str,
        policy: Option<&str>,
    ) -> StoreResult<Vec<Object>> {
        self.secret_mut(secret_type, id)?;
        if let Some(policy) = policy.filter(|policy| *policy != "rotation") {
            return Err(ApiError::bad_request(format!("unsupported policy: {policy}")));
        }
        Ok(self.policies.get(id).cloned().unwrap_or_default())
    }

    // Engine configuration

    pub fn put_config(&mut self, secret_type: &str, config: &Object) -> StoreResult<()> {
        if secret_type != IAM_CREDENTIALS {
            return Err(ApiError::bad_request(format!(
                "secret type {secret_type} has no configurable engine"
            )));
        }
        let api_key = text(config, "api_key")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ApiError::bad_request("api_key is required"))?;

        let mut hasher = DefaultHasher::new();
        api_key.hash(&mut hasher);
        let mut stored = Object::new();
        stored.insert("api_key".into(), json!(api_key));
        stored.insert("api_key_hash".into(), json!(format!("{:016x}", hasher.finish())));
        self.configs.insert(secret_type.to_string(), stored);
        Ok(())
    }

    pub fn get_config(&self, secret_type: &str) -> StoreResult<Object> {
        self.configs.get(secret_type).cloned().ok_or_else(|| {
            ApiError::not_found(format!("no engine configuration for {secret_type}"))
        })
    }
}
