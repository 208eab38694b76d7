//! Wire-level behavior against purpose-built servers: exact request bodies,
//! malformed responses, deadlines, cancellation and retries.

mod common;

use axum::body::Bytes;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{get, post, put};
use axum::Router;
use common::{serve, service};
use paths::ResponseBody;
use secrets_manager_sdk::auth::BasicAuthenticator;
use secrets_manager_sdk::config::ExternalConfig;
use secrets_manager_sdk::constants::{media_types, secret_types};
use secrets_manager_sdk::models::{
    ArbitrarySecretResource, CollectionMetadata, IamSecretEngineRootConfig, RotationUnit,
    SecretAction, SecretGroupMetadataUpdatable, SecretGroupResource, SecretMetadata,
    SecretPolicyRotation,
};
use secrets_manager_sdk::options::{
    CreateSecretGroupOptions, CreateSecretOptions, DeleteSecretGroupOptions, DeleteSecretOptions,
    GetConfigOptions, GetPolicyOptions, GetSecretGroupOptions, GetSecretMetadataOptions,
    GetSecretOptions, Headers, ListAllSecretsOptions, ListSecretGroupsOptions, ListSecretsOptions,
    PutConfigOptions, PutPolicyOptions, UpdateSecretGroupMetadataOptions,
    UpdateSecretMetadataOptions, UpdateSecretOptions,
};
use secrets_manager_sdk::{
    Error, Operation, RequestContext, SecretsManager, SecretsManagerOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const INVALID_JSON: &str = "} this is not valid json {";

fn json_response(status: StatusCode, body: &'static str) -> (StatusCode, HeaderMap, &'static str) {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
    (status, headers, body)
}

/// Run `$check(&service, &options)` for one valid options value per operation
macro_rules! each_operation {
    ($check:ident, $service:expr) => {{
        let service = $service;
        let secret_metadata = || CollectionMetadata::new(media_types::SECRET, 1);
        let group_metadata = || CollectionMetadata::new(media_types::SECRET_GROUP, 1);
        $check(
            service,
            &CreateSecretGroupOptions::new(group_metadata(), vec![SecretGroupResource::new("g")]),
        )
        .await;
        $check(service, &ListSecretGroupsOptions::new()).await;
        $check(service, &GetSecretGroupOptions::new("g1")).await;
        $check(
            service,
            &UpdateSecretGroupMetadataOptions::new(
                "g1",
                group_metadata(),
                vec![SecretGroupMetadataUpdatable::default().with_name("n")],
            ),
        )
        .await;
        $check(service, &DeleteSecretGroupOptions::new("g1")).await;
        $check(
            service,
            &CreateSecretOptions::new(
                secret_types::ARBITRARY,
                secret_metadata(),
                vec![ArbitrarySecretResource::new("s").with_payload("p").into()],
            ),
        )
        .await;
        $check(service, &ListSecretsOptions::new(secret_types::ARBITRARY)).await;
        $check(service, &ListAllSecretsOptions::new()).await;
        $check(service, &GetSecretOptions::new(secret_types::ARBITRARY, "s1")).await;
        $check(
            service,
            &UpdateSecretOptions::new(
                secret_types::ARBITRARY,
                "s1",
                SecretAction::rotate_arbitrary("p2"),
            ),
        )
        .await;
        $check(service, &DeleteSecretOptions::new(secret_types::ARBITRARY, "s1")).await;
        $check(
            service,
            &GetSecretMetadataOptions::new(secret_types::ARBITRARY, "s1"),
        )
        .await;
        $check(
            service,
            &UpdateSecretMetadataOptions::new(
                secret_types::ARBITRARY,
                "s1",
                secret_metadata(),
                vec![SecretMetadata::new("renamed")],
            ),
        )
        .await;
        $check(
            service,
            &PutPolicyOptions::new(
                secret_types::USERNAME_PASSWORD,
                "s1",
                CollectionMetadata::new(media_types::SECRET_POLICY, 1),
                vec![SecretPolicyRotation::new(1, RotationUnit::Month)],
            ),
        )
        .await;
        $check(
            service,
            &GetPolicyOptions::new(secret_types::USERNAME_PASSWORD, "s1"),
        )
        .await;
        $check(
            service,
            &PutConfigOptions::new(
                secret_types::IAM_CREDENTIALS,
                IamSecretEngineRootConfig::new("k").into(),
            ),
        )
        .await;
        $check(service, &GetConfigOptions::new(secret_types::IAM_CREDENTIALS)).await;
    }};
}

async fn assert_missing_options<O: Operation>(service: &SecretsManager, _options: &O) {
    let Err(err) = service.send::<O>(&RequestContext::background(), None).await else {
        panic!("{} succeeded without options", O::NAME);
    };
    assert!(
        matches!(err, Error::MissingOptions { operation } if operation == O::NAME),
        "{}: {err:?}",
        O::NAME
    );
}

async fn assert_url_missing<O: Operation>(service: &SecretsManager, options: &O) {
    let Err(err) = service.send(&RequestContext::background(), Some(options)).await else {
        panic!("{} succeeded without a service URL", O::NAME);
    };
    assert!(matches!(err, Error::ServiceUrlMissing), "{}: {err:?}", O::NAME);
}

async fn assert_decode_error<O: Operation>(service: &SecretsManager, options: &O) {
    let outcome = service.send(&RequestContext::background(), Some(options)).await;
    match options.endpoint().response_body() {
        ResponseBody::Empty => assert!(outcome.is_ok(), "{} should ignore the body", O::NAME),
        ResponseBody::Json => {
            let Err(err) = outcome else {
                panic!("{} decoded an invalid body", O::NAME);
            };
            assert!(matches!(err, Error::Decode { .. }), "{}: {err:?}", O::NAME);
            assert_eq!(err.response().map(|r| r.status().as_u16()), Some(200));
        }
    }
}

/// Server that fails the test if any request reaches it
async fn unreachable_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let url = serve(Router::new().fallback(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }))
    .await;
    (url, hits)
}

#[tokio::test]
async fn test_missing_options_for_every_operation() {
    let (url, hits) = unreachable_server().await;
    let service = service(&url);
    each_operation!(assert_missing_options, &service);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cleared_service_url_for_every_operation() {
    let (url, hits) = unreachable_server().await;
    let mut service = service(&url);
    service.set_service_url("").unwrap();
    each_operation!(assert_url_missing, &service);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_json_for_every_operation() {
    let url = serve(Router::new().fallback(|| async {
        json_response(StatusCode::OK, INVALID_JSON)
    }))
    .await;
    let service = service(&url);
    each_operation!(assert_decode_error, &service);
}

#[tokio::test]
async fn test_invalid_json_response() {
    let url = serve(Router::new().route(
        "/api/v1/secrets/{secret_type}/{id}",
        get(|| async { json_response(StatusCode::OK, INVALID_JSON) }),
    ))
    .await;
    let service = service(&url);

    let err = service
        .get_secret(&GetSecretOptions::new(secret_types::ARBITRARY, "s1"))
        .await
        .unwrap_err();

    let Error::Decode { response, .. } = &err else {
        panic!("expected a decode error, got {err:?}");
    };
    let response = response.as_deref().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text(), INVALID_JSON);
}

#[tokio::test]
async fn test_non_json_content_type_is_a_decode_error() {
    let url = serve(Router::new().route(
        "/api/v1/secret_groups/{id}",
        get(|| async { "maintenance window" }),
    ))
    .await;
    let err = service(&url)
        .get_secret_group(&GetSecretGroupOptions::new("g1"))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::Decode { .. }));
    assert_eq!(err.to_string(), "maintenance window");
}

#[tokio::test]
async fn test_wrong_shape_is_an_invalid_response() {
    let url = serve(Router::new().route(
        "/api/v1/secret_groups/{id}",
        get(|| async { json_response(StatusCode::OK, r#"{"metadata": 5}"#) }),
    ))
    .await;
    let err = service(&url)
        .get_secret_group(&GetSecretGroupOptions::new("g1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse { .. }), "{err:?}");
    assert!(err.response().is_some());
}

#[tokio::test]
async fn test_create_secret_request_on_the_wire() {
    let captured: Arc<Mutex<Option<(String, HeaderMap, String)>>> = Arc::default();
    let sink = Arc::clone(&captured);
    let url = serve(Router::new().route(
        "/api/v1/secrets/{secret_type}",
        post(move |uri: Uri, headers: HeaderMap, body: Bytes| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = Some((
                    uri.path().to_string(),
                    headers,
                    String::from_utf8_lossy(&body).into_owned(),
                ));
                json_response(
                    StatusCode::CREATED,
                    r#"{"metadata":{"collection_type":"application/vnd.ibm.secrets-manager.secret+json","collection_total":1},"resources":[{"id":"s-1","name":"example-arbitrary-secret","secret_type":"arbitrary","secret_data":{"payload":"secret-data","encoding":"text"}}]}"#,
                )
            }
        }),
    ))
    .await;
    let service = SecretsManager::with_external_config(
        SecretsManagerOptions {
            url: Some(url),
            authenticator: Some(Arc::new(BasicAuthenticator::new("user", "pass"))),
            ..Default::default()
        },
        &ExternalConfig::default(),
    )
    .unwrap();

    let options = CreateSecretOptions::new(
        secret_types::ARBITRARY,
        CollectionMetadata::new(media_types::SECRET, 1),
        vec![ArbitrarySecretResource::new("example-arbitrary-secret")
            .with_payload("secret-data")
            .into()],
    )
    .with_headers(Headers::from([(
        "X-Correlation-Id".to_string(),
        "corr-1".to_string(),
    )]));
    let created = service.create_secret(&options).await.unwrap();

    let (path, headers, body) = captured.lock().unwrap().take().unwrap();
    assert_eq!(path, "/api/v1/secrets/arbitrary");
    assert_eq!(
        body,
        r#"{"metadata":{"collection_type":"application/vnd.ibm.secrets-manager.secret+json","collection_total":1},"resources":[{"name":"example-arbitrary-secret","payload":"secret-data"}]}"#
    );
    assert_eq!(headers[CONTENT_TYPE], "application/json");
    assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjpwYXNz");
    assert_eq!(headers["x-correlation-id"], "corr-1");
    assert_eq!(
        headers["x-sdk-analytics"],
        "service_name=secrets_manager;service_version=V1;operation_id=create_secret"
    );

    let secret = created.result.resources[0].as_arbitrary().unwrap();
    let secret_data = secret.secret_data.as_ref().unwrap();
    assert_eq!(secret_data["payload"], "secret-data");
    assert_eq!(secret_data["encoding"], "text");
}

#[tokio::test]
async fn test_put_rotation_policy() {
    let captured: Arc<Mutex<Option<(String, String)>>> = Arc::default();
    let sink = Arc::clone(&captured);
    let url = serve(Router::new().route(
        "/api/v1/secrets/{secret_type}/{id}/policies",
        put(move |uri: Uri, body: Bytes| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = Some((
                    uri.to_string(),
                    String::from_utf8_lossy(&body).into_owned(),
                ));
                json_response(
                    StatusCode::OK,
                    r#"{"metadata":{"collection_type":"application/vnd.ibm.secrets-manager.secret.policy+json","collection_total":1},"resources":[{"id":"p-1","type":"application/vnd.ibm.secrets-manager.secret.policy+json","rotation":{"interval":1,"unit":"day"}}]}"#,
                )
            }
        }),
    ))
    .await;

    let options = PutPolicyOptions::new(
        secret_types::USERNAME_PASSWORD,
        "s-1",
        CollectionMetadata::new(media_types::SECRET_POLICY, 1),
        vec![SecretPolicyRotation::new(1, RotationUnit::Month)],
    );
    let response = service(&url).put_policy(&options).await.unwrap();

    let (uri, body) = captured.lock().unwrap().take().unwrap();
    assert_eq!(
        uri,
        "/api/v1/secrets/username_password/s-1/policies?policy=rotation"
    );
    assert_eq!(
        body,
        r#"{"metadata":{"collection_type":"application/vnd.ibm.secrets-manager.secret.policy+json","collection_total":1},"resources":[{"type":"application/vnd.ibm.secrets-manager.secret.policy+json","rotation":{"interval":1,"unit":"month"}}]}"#
    );

    let policy = response.result.resources[0].as_rotation().unwrap();
    assert_eq!(policy.rotation.interval, 1);
    assert_eq!(policy.rotation.unit, RotationUnit::Day);
    assert_eq!(policy.id.as_deref(), Some("p-1"));
}

async fn slow_config_server() -> String {
    serve(Router::new().route(
        "/api/v1/config/{secret_type}",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            json_response(StatusCode::OK, r#"{"api_key":"k"}"#)
        }),
    ))
    .await
}

#[tokio::test]
async fn test_deadline_exceeded_without_retries() {
    let service = service(&slow_config_server().await);
    let ctx = RequestContext::with_timeout(Duration::from_millis(80));
    let err = service
        .get_config_with_context(&ctx, &GetConfigOptions::new(secret_types::IAM_CREDENTIALS))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("deadline exceeded"), "{err}");
    assert!(err.response().is_none());
}

#[tokio::test]
async fn test_deadline_exceeded_with_retries() {
    let mut service = service(&slow_config_server().await);
    service.enable_retries(3, Duration::from_millis(10));
    let ctx = RequestContext::with_timeout(Duration::from_millis(80));
    let err = service
        .get_config_with_context(&ctx, &GetConfigOptions::new(secret_types::IAM_CREDENTIALS))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("deadline exceeded"), "{err}");
}

#[tokio::test]
async fn test_cancellation() {
    let service = service(&slow_config_server().await);
    let (ctx, handle) = RequestContext::with_cancel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });
    let err = service
        .get_config_with_context(&ctx, &GetConfigOptions::new(secret_types::IAM_CREDENTIALS))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Canceled));
    assert!(err.to_string().contains("canceled"));
}

/// Answers 503 (`Retry-After: 0`) `failures` times, then succeeds
async fn flaky_server(failures: usize) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let handler = move || {
        let counter = Arc::clone(&counter);
        async move {
            let (status, mut headers, body) = if counter.fetch_add(1, Ordering::SeqCst) < failures {
                json_response(StatusCode::SERVICE_UNAVAILABLE, r#"{"errors":[{"message":"busy"}]}"#)
            } else {
                json_response(
                    StatusCode::OK,
                    r#"{"metadata":{"collection_type":"application/vnd.ibm.secrets-manager.secret.group+json","collection_total":1},"resources":[{"id":"g1","name":"group"}]}"#,
                )
            };
            headers.insert(RETRY_AFTER, "0".parse().unwrap());
            (status, headers, body)
        }
    };
    let url = serve(Router::new().route(
        "/api/v1/secret_groups",
        get(handler.clone()).post(handler),
    ))
    .await;
    (url, hits)
}

#[tokio::test]
async fn test_idempotent_request_is_retried() {
    let (url, hits) = flaky_server(2).await;
    let mut service = service(&url);
    service.enable_retries(3, Duration::from_secs(1));

    let listed = service
        .list_secret_groups(&ListSecretGroupsOptions::new())
        .await
        .unwrap();
    assert_eq!(listed.result.resources[0].name, "group");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let (url, hits) = flaky_server(10).await;
    let mut service = service(&url);
    service.enable_retries(2, Duration::from_secs(1));

    let err = service
        .list_secret_groups(&ListSecretGroupsOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Service Unavailable");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_post_is_not_retried_after_delivery() {
    let (url, hits) = flaky_server(1).await;
    let mut service = service(&url);
    service.enable_retries(3, Duration::from_secs(1));

    let err = service
        .create_secret_group(&CreateSecretGroupOptions::new(
            CollectionMetadata::new(media_types::SECRET_GROUP, 1),
            vec![SecretGroupResource::new("group")],
        ))
        .await
        .unwrap_err();
    let Error::Http(http) = &err else {
        panic!("expected an HTTP error, got {err:?}");
    };
    assert_eq!(http.server_message(), Some("busy"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_past_deadline_fails_fast() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let url = serve(Router::new().route(
        "/api/v1/secret_groups/{id}",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let (status, mut headers, body) =
                    json_response(StatusCode::TOO_MANY_REQUESTS, "{}");
                headers.insert(RETRY_AFTER, "5".parse().unwrap());
                (status, headers, body)
            }
        }),
    ))
    .await;
    let mut service = service(&url);
    service.enable_retries(3, Duration::from_secs(30));

    let ctx = RequestContext::with_timeout(Duration::from_secs(1));
    let err = service
        .get_secret_group_with_context(&ctx, &GetSecretGroupOptions::new("g1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DeadlineExceeded));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_region() {
    let err = SecretsManager::service_url_for_region("INVALID_REGION").unwrap_err();
    assert!(matches!(err, Error::UnknownRegion(_)));
}

#[tokio::test]
async fn test_clone_talks_to_the_same_service() {
    let (url, hits) = flaky_server(0).await;
    let original = service(&url);
    let clone = original.clone();
    assert!(!clone.shares_transport_with(&original));
    clone
        .list_secret_groups(&ListSecretGroupsOptions::new())
        .await
        .unwrap();
    original
        .list_secret_groups(&ListSecretGroupsOptions::new())
        .await
        .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
