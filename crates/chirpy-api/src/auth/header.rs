//! Credential extraction from the `Authorization` header
//!
//! End users present `Authorization: Bearer <token>`; the payment partner
//! presents `Authorization: ApiKey <key>`. Both go through one parser that
//! takes the expected scheme.

use axum::http::{header, HeaderMap};
use thiserror::Error;

/// Authorization schemes understood by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Access or refresh token
    Bearer,
    /// Static partner key
    ApiKey,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ApiKey => "ApiKey",
        }
    }
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header extraction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Malformed Authorization header: expected `{expected} <credential>`")]
    Malformed { expected: AuthScheme },
}

/// Extract the credential for `scheme` from the `Authorization` header
///
/// The value must be exactly two space-separated, non-empty parts and the
/// first must equal the scheme name. The credential is returned trimmed.
pub fn extract_credential(headers: &HeaderMap, scheme: AuthScheme) -> Result<String, HeaderError> {
    let malformed = HeaderError::Malformed { expected: scheme };

    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(HeaderError::Missing)?
        .to_str()
        .map_err(|_| malformed.clone())?;
    if value.is_empty() {
        return Err(HeaderError::Missing);
    }

    let parts: Vec<&str> = value.split(' ').collect();
    let [name, credential] = parts.as_slice() else {
        return Err(malformed);
    };

    let credential = credential.trim();
    if name.trim() != scheme.as_str() || credential.is_empty() {
        return Err(malformed);
    }

    Ok(credential.to_string())
}

/// Extract a bearer token (`Authorization: Bearer <token>`)
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, HeaderError> {
    extract_credential(headers, AuthScheme::Bearer)
}

/// Extract a partner API key (`Authorization: ApiKey <key>`)
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, HeaderError> {
    extract_credential(headers, AuthScheme::ApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use proptest::prelude::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc123")).unwrap(), "abc123");
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            extract_bearer(&headers_with("Basic abc123")),
            Err(HeaderError::Malformed {
                expected: AuthScheme::Bearer
            })
        );
        assert!(extract_api_key(&headers_with("Bearer abc123")).is_err());
        // scheme match is exact
        assert!(extract_bearer(&headers_with("bearer abc123")).is_err());
    }

    #[test]
    fn test_three_parts() {
        assert!(matches!(
            extract_bearer(&headers_with("this is not")),
            Err(HeaderError::Malformed { .. })
        ));
        assert!(extract_bearer(&headers_with("Bearer abc 123")).is_err());
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(HeaderError::Missing));
        assert_eq!(extract_bearer(&headers_with("")), Err(HeaderError::Missing));
    }

    #[test]
    fn test_empty_parts() {
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
        assert!(extract_bearer(&headers_with(" abc123")).is_err());
        assert!(extract_bearer(&headers_with("Bearer")).is_err());
    }

    #[test]
    fn test_extract_api_key() {
        assert_eq!(
            extract_api_key(&headers_with("ApiKey f271c81ff7084ee5b99a5091b42d486e")).unwrap(),
            "f271c81ff7084ee5b99a5091b42d486e"
        );
    }

    proptest! {
        #[test]
        fn prop_bearer_round_trip(token in "[A-Za-z0-9._-]{1,128}") {
            let headers = headers_with(&format!("Bearer {token}"));
            prop_assert_eq!(extract_bearer(&headers).unwrap(), token.clone());
            prop_assert!(extract_api_key(&headers).is_err());
        }
    }
}
