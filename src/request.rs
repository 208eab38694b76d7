//! # Request Builder
//!
//! Turns a validated options value into a concrete HTTP request. No I/O
//! happens here, so every failure is reported before anything is transmitted.

use crate::constants::{JSON_CONTENT_TYPE, SDK_ANALYTICS_HEADER, USER_AGENT};
use crate::error::{Error, Result};
use crate::operation::Operation;
use paths::{HttpMethod, PathBuilder, PathBuilderError, PathFormat};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};

/// A request ready to hand to the transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

fn method(verb: HttpMethod) -> Method {
    match verb {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .ok()
        .ok_or_else(|| Error::InvalidHeader {
            name: name.to_string(),
        })
}

/// Build the request for `options` against `service_url`
///
/// # Errors
///
/// - [`Error::ServiceUrlMissing`] when `service_url` is empty
/// - [`Error::InvalidPathParameter`] for an empty path parameter
/// - [`Error::InvalidHeader`] for a caller header that is not valid HTTP
/// - [`Error::InvalidModel`] when the body fails its collision check
pub fn build<O: Operation>(service_url: &str, options: &O) -> Result<PreparedRequest> {
    if service_url.is_empty() {
        return Err(Error::ServiceUrlMissing);
    }
    let endpoint = options.endpoint();

    let path = options
        .path_params()
        .into_iter()
        .fold(PathBuilder::new(endpoint), |builder, (name, value)| {
            builder.param(name, value)
        })
        .build(PathFormat::Http)
        .map_err(|e| match e {
            PathBuilderError::EmptyParameter(name) | PathBuilderError::MissingParameter(name) => {
                Error::InvalidPathParameter { name }
            }
            PathBuilderError::UnknownParameter(..) => Error::InvalidUrl {
                url: service_url.to_string(),
                reason: e.to_string(),
            },
        })?;

    let mut url = Url::parse(&format!("{}{path}", service_url.trim_end_matches('/'))).map_err(
        |e| Error::InvalidUrl {
            url: service_url.to_string(),
            reason: e.to_string(),
        },
    )?;

    let mut query = options.query_params();
    query.sort_by(|(a, _), (b, _)| a.cmp(b));
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &query {
            pairs.append_pair(key, value);
        }
    }

    let body = options.body()?.map(|value| value.to_string().into_bytes());

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
    if body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        HeaderName::from_static(SDK_ANALYTICS_HEADER),
        header_value(
            SDK_ANALYTICS_HEADER,
            &format!(
                "service_name=secrets_manager;service_version=V1;operation_id={}",
                endpoint.name()
            ),
        )?,
    );
    for (name, value) in options.headers().into_iter().flatten() {
        let header = HeaderName::from_bytes(name.as_bytes())
            .ok()
            .ok_or_else(|| Error::InvalidHeader { name: name.clone() })?;
        headers.insert(header, header_value(name, value)?);
    }

    Ok(PreparedRequest {
        method: method(endpoint.method()),
        url,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionMetadata, RotationUnit, SecretPolicyRotation};
    use crate::options::{
        GetSecretGroupOptions, GetSecretOptions, Headers, ListAllSecretsOptions, PutPolicyOptions,
    };

    const BASE: &str = "https://secrets-manager.example.com/";

    #[test]
    fn test_empty_service_url_fails_first() {
        let err = build("", &GetSecretGroupOptions::new("g1")).unwrap_err();
        assert!(matches!(err, Error::ServiceUrlMissing));
    }

    #[test]
    fn test_path_substitution_and_escaping() {
        let request = build(BASE, &GetSecretOptions::new("arbitrary", "a/b c")).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url.as_str(),
            "https://secrets-manager.example.com/api/v1/secrets/arbitrary/a%2Fb%20c"
        );
        assert!(request.body.is_none());
        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_empty_path_parameter_is_invalid() {
        let err = build(BASE, &GetSecretOptions::new("arbitrary", "")).unwrap_err();
        assert!(matches!(err, Error::InvalidPathParameter { name } if name == "id"));
    }

    #[test]
    fn test_query_keys_are_sorted_and_repeated() {
        let options = ListAllSecretsOptions::new()
            .with_sort_by("name")
            .with_groups(["g2", "g1"])
            .with_offset(0)
            .with_limit(10);
        let request = build(BASE, &options).unwrap();
        assert_eq!(
            request.url.query(),
            Some("groups=g2&groups=g1&limit=10&offset=0&sort_by=name")
        );
    }

    #[test]
    fn test_no_query_string_without_parameters() {
        let request = build(BASE, &GetSecretGroupOptions::new("g1")).unwrap();
        assert_eq!(request.url.query(), None);
    }

    #[test]
    fn test_default_headers_on_body_requests() {
        let options = PutPolicyOptions::new(
            "username_password",
            "s1",
            CollectionMetadata::new("application/vnd.ibm.secrets-manager.secret.policy+json", 1),
            vec![SecretPolicyRotation::new(1, RotationUnit::Day)],
        );
        let request = build(BASE, &options).unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers[ACCEPT], "application/json");
        assert!(request.headers[reqwest::header::USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("secrets-manager-rust-sdk/"));
        assert_eq!(
            request.headers[SDK_ANALYTICS_HEADER],
            "service_name=secrets_manager;service_version=V1;operation_id=put_policy"
        );
        assert_eq!(request.url.query(), Some("policy=rotation"));
    }

    #[test]
    fn test_caller_headers_override_case_insensitively() {
        let headers = Headers::from([
            ("accept".to_string(), "application/vnd.custom+json".to_string()),
            ("X-Correlation-Id".to_string(), "abc-123".to_string()),
        ]);
        let request = build(BASE, &GetSecretGroupOptions::new("g1").with_headers(headers)).unwrap();
        assert_eq!(request.headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(request.headers[ACCEPT], "application/vnd.custom+json");
        assert_eq!(request.headers["x-correlation-id"], "abc-123");
    }

    #[test]
    fn test_invalid_caller_header_is_rejected() {
        let headers = Headers::from([("bad header".to_string(), "v".to_string())]);
        let err = build(BASE, &GetSecretGroupOptions::new("g1").with_headers(headers)).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { name } if name == "bad header"));
    }
}
