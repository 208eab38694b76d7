//! # Route Handlers
//!
//! Thin HTTP adapters over [`crate::store::Store`]. Bodies are parsed by hand
//! so malformed input gets the service's error envelope instead of an axum
//! rejection.

use crate::errors::ApiError;
use crate::store::{Object, Page, SecretFilter, SECRET_GROUP_TYPE, SECRET_POLICY_TYPE};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use tracing::{info, warn};

pub const SECRET_TYPE: &str = "application/vnd.ibm.secrets-manager.secret+json";

type HandlerResult = Result<Response, ApiError>;

/// Decoded query string; keys may repeat
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        Self(
            raw.map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn number(&self, key: &str) -> Result<Option<usize>, ApiError> {
        self.get(key)
            .map(|value| {
                value
                    .parse()
                    .map_err(|e| ApiError::bad_request(format!("{key} must be a non-negative integer: {e}")))
            })
            .transpose()
    }

    pub fn page(&self) -> Result<Page, ApiError> {
        Ok(Page {
            limit: self.number("limit")?,
            offset: self.number("offset")?.unwrap_or(0),
        })
    }
}

fn collection(collection_type: &str, resources: Vec<Object>) -> Value {
    json!({
        "metadata": {
            "collection_type": collection_type,
            "collection_total": resources.len()
        },
        "resources": resources
    })
}

fn respond(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn json_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))
}

fn object_body(body: &Bytes) -> Result<Object, ApiError> {
    match json_body(body)? {
        Value::Object(object) => Ok(object),
        _ => Err(ApiError::bad_request("request body must be a JSON object")),
    }
}

/// `resources` of a collection envelope body; at least one is required
fn envelope_resources(body: &Bytes) -> Result<Vec<Value>, ApiError> {
    let mut envelope = object_body(body)?;
    match envelope.shift_remove("resources") {
        Some(Value::Array(resources)) if !resources.is_empty() => Ok(resources),
        _ => Err(ApiError::bad_request("resources must be a non-empty array")),
    }
}

fn first_resource(body: &Bytes) -> Result<Object, ApiError> {
    match envelope_resources(body)?.into_iter().next() {
        Some(Value::Object(resource)) => Ok(resource),
        _ => Err(ApiError::bad_request("resource must be a JSON object")),
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// Secret groups

pub async fn create_secret_group(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let resource = first_resource(&body)?;
    let created = state.store.write().await.create_group(resource)?;
    info!(id = ?created.get("id"), "created secret group");
    Ok(respond(
        StatusCode::OK,
        collection(SECRET_GROUP_TYPE, vec![created]),
    ))
}

pub async fn list_secret_groups(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> HandlerResult {
    let page = QueryParams::parse(query.as_deref()).page()?;
    let groups = state.store.read().await.list_groups(page);
    Ok(respond(StatusCode::OK, collection(SECRET_GROUP_TYPE, groups)))
}

pub async fn get_secret_group(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let group = state.store.write().await.get_group(&id)?;
    Ok(respond(StatusCode::OK, collection(SECRET_GROUP_TYPE, vec![group])))
}

pub async fn update_secret_group_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> HandlerResult {
    let patch = first_resource(&body)?;
    let group = state.store.write().await.update_group(&id, &patch)?;
    Ok(respond(StatusCode::OK, collection(SECRET_GROUP_TYPE, vec![group])))
}

pub async fn delete_secret_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    state.store.write().await.delete_group(&id)?;
    info!(%id, "deleted secret group");
    Ok(StatusCode::NO_CONTENT.into_response())
}

// Secrets

pub async fn create_secret(
    State(state): State<AppState>,
    Path(secret_type): Path<String>,
    body: Bytes,
) -> HandlerResult {
    let resource = first_resource(&body)?;
    let created = state
        .store
        .write()
        .await
        .create_secret(&secret_type, resource)
        .inspect_err(|e| warn!(%secret_type, error = %e, "create secret rejected"))?;
    info!(%secret_type, id = ?created.get("id"), "created secret");
    Ok(respond(StatusCode::CREATED, collection(SECRET_TYPE, vec![created])))
}

pub async fn list_secrets(
    State(state): State<AppState>,
    Path(secret_type): Path<String>,
    RawQuery(query): RawQuery,
) -> HandlerResult {
    let page = QueryParams::parse(query.as_deref()).page()?;
    let secrets = state
        .store
        .read()
        .await
        .list_secrets(Some(&secret_type), &SecretFilter::default(), page)?;
    Ok(respond(StatusCode::OK, collection(SECRET_TYPE, secrets)))
}

pub async fn list_all_secrets(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> HandlerResult {
    let query = QueryParams::parse(query.as_deref());
    let filter = SecretFilter {
        search: query.get("search").map(str::to_string),
        groups: query.get_all("groups"),
    };
    let secrets = state
        .store
        .read()
        .await
        .list_secrets(None, &filter, query.page()?)?;
    Ok(respond(StatusCode::OK, collection(SECRET_TYPE, secrets)))
}

pub async fn get_secret(
    State(state): State<AppState>,
    Path((secret_type, id)): Path<(String, String)>,
) -> HandlerResult {
    let secret = state.store.write().await.get_secret(&secret_type, &id)?;
    Ok(respond(StatusCode::OK, collection(SECRET_TYPE, vec![secret])))
}

/// `POST /secrets/{secret_type}/{id}?action=...`
pub async fn update_secret(
    State(state): State<AppState>,
    Path((secret_type, id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> HandlerResult {
    let query = QueryParams::parse(query.as_deref());
    let action = query
        .get("action")
        .ok_or_else(|| ApiError::bad_request("action is required"))?;
    let body = if body.is_empty() {
        Object::new()
    } else {
        object_body(&body)?
    };
    let secret = state
        .store
        .write()
        .await
        .apply_action(&secret_type, &id, action, &body)?;
    info!(%secret_type, %id, %action, "applied secret action");
    Ok(respond(StatusCode::OK, collection(SECRET_TYPE, vec![secret])))
}

pub async fn delete_secret(
    State(state): State<AppState>,
    Path((secret_type, id)): Path<(String, String)>,
) -> HandlerResult {
    state.store.write().await.delete_secret(&secret_type, &id)?;
    info!(%secret_type, %id, "deleted secret");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn get_secret_metadata(
    State(state): State<AppState>,
    Path((secret_type, id)): Path<(String, String)>,
) -> HandlerResult {
    let metadata = state.store.write().await.secret_metadata(&secret_type, &id)?;
    Ok(respond(StatusCode::OK, collection(SECRET_TYPE, vec![metadata])))
}

pub async fn update_secret_metadata(
    State(state): State<AppState>,
    Path((secret_type, id)): Path<(String, String)>,
    body: Bytes,
) -> HandlerResult {
    let patch = first_resource(&body)?;
    let metadata = state
        .store
        .write()
        .await
        .update_metadata(&secret_type, &id, &patch)?;
    Ok(respond(StatusCode::OK, collection(SECRET_TYPE, vec![metadata])))
}

// Policies

pub async fn put_policy(
    State(state): State<AppState>,
    Path((secret_type, id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> HandlerResult {
    let query = QueryParams::parse(query.as_deref());
    let policy = query.get("policy").unwrap_or("rotation");
    let resources = envelope_resources(&body)?;
    let policies = state
        .store
        .write()
        .await
        .put_policies(&secret_type, &id, policy, &resources)?;
    Ok(respond(StatusCode::OK, collection(SECRET_POLICY_TYPE, policies)))
}

pub async fn get_policy(
    State(state): State<AppState>,
    Path((secret_type, id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> HandlerResult {
    let query = QueryParams::parse(query.as_deref());
    let policies = state
        .store
        .write()
        .await
        .get_policies(&secret_type, &id, query.get("policy"))?;
    Ok(respond(StatusCode::OK, collection(SECRET_POLICY_TYPE, policies)))
}

// Engine configuration

pub async fn put_config(
    State(state): State<AppState>,
    Path(secret_type): Path<String>,
    body: Bytes,
) -> HandlerResult {
    let config = object_body(&body)?;
    state.store.write().await.put_config(&secret_type, &config)?;
    info!(%secret_type, "configured secrets engine");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn get_config(
    State(state): State<AppState>,
    Path(secret_type): Path<String>,
) -> HandlerResult {
    let config = state.store.read().await.get_config(&secret_type)?;
    Ok(respond(StatusCode::OK, Value::Object(config)))
}
