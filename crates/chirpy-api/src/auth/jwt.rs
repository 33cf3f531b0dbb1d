//! JWT token generation and validation
//!
//! Implements stateless access tokens signed with HMAC-SHA256. A token
//! carries nothing but the issuer, the user id and its validity window;
//! it is never persisted and cannot be revoked before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Issuer claim written into and required from every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// Default and maximum access token lifetime in seconds
pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer (always "chirpy")
    pub iss: String,
    /// Subject - user ID
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

/// JWT token generation and validation errors
///
/// Validation failures stay distinguishable here for logging; the HTTP layer
/// reports all of them as one generic 401.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token is not signed with HMAC")]
    InvalidAlgorithm,

    #[error("Unexpected token issuer")]
    InvalidIssuer,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token subject is missing or not a user id")]
    InvalidSubject,
}

/// Clamp a caller-requested lifetime to `(0, 1h]`
///
/// Missing or non-positive requests get the full hour.
pub fn access_token_ttl(requested_secs: Option<i64>) -> Duration {
    let secs = match requested_secs {
        Some(secs) if secs > 0 => secs.min(ACCESS_TOKEN_TTL_SECS),
        _ => ACCESS_TOKEN_TTL_SECS,
    };
    Duration::seconds(secs)
}

/// Generate an access token for `user_id` valid for `ttl` from now
///
/// # Example
///
/// ```no_run
/// use chirpy_api::auth::jwt::{generate_access_token, validate_access_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let token = generate_access_token(user_id, b"secret", Duration::hours(1))
///     .expect("Failed to generate token");
/// assert_eq!(validate_access_token(&token, b"secret").unwrap(), user_id);
/// ```
pub fn generate_access_token(
    user_id: Uuid,
    secret: &[u8],
    ttl: Duration,
) -> Result<String, JwtError> {
    generate_access_token_at(user_id, secret, ttl, Utc::now())
}

/// Generate an access token as if the current time were `now`
pub fn generate_access_token_at(
    user_id: Uuid,
    secret: &[u8],
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, JwtError> {
    let iat = now.timestamp();
    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat,
        exp: iat + ttl.num_seconds(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?;

    Ok(token)
}

/// Validate an access token and return the user id it was issued for
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<Uuid, JwtError> {
    validate_access_token_at(token, secret, Utc::now())
}

/// Validate an access token against the clock value `now`
///
/// Only HMAC algorithms are accepted. There is no leeway: a token whose
/// `exp` equals `now` is already expired.
pub fn validate_access_token_at(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<Uuid, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // expiry is compared against `now` below
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => JwtError::InvalidAlgorithm,
            ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            _ => JwtError::InvalidToken,
        })?;

    let claims = token_data.claims;
    if claims.exp <= now.timestamp() {
        return Err(JwtError::ExpiredToken);
    }

    if claims.sub.is_empty() {
        return Err(JwtError::InvalidSubject);
    }
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidSubject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"test-secret";

    fn sign(claims: &Claims, alg: Algorithm, secret: &[u8]) -> String {
        encode(&Header::new(alg), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_generate_and_validate_token() {
        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, SECRET, Duration::minutes(5))
            .expect("Failed to generate token");

        let validated = validate_access_token(&token, SECRET).expect("Failed to validate token");
        assert_eq!(validated, user_id);
    }

    #[test]
    fn test_claims_contents() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let token = generate_access_token_at(user_id, SECRET, Duration::hours(1), now).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.iss, "chirpy");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_invalid_token() {
        let result = validate_access_token("invalid.token.here", SECRET);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_access_token(Uuid::new_v4(), b"secret1", Duration::minutes(5)).unwrap();

        let result = validate_access_token(&token, b"secret2");
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_expiry_boundary() {
        let issued = Utc::now();
        let token =
            generate_access_token_at(Uuid::new_v4(), SECRET, Duration::seconds(60), issued).unwrap();

        assert!(validate_access_token_at(&token, SECRET, issued + Duration::seconds(59)).is_ok());
        assert!(matches!(
            validate_access_token_at(&token, SECRET, issued + Duration::seconds(60)),
            Err(JwtError::ExpiredToken)
        ));
        assert!(matches!(
            validate_access_token_at(&token, SECRET, issued + Duration::seconds(61)),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let token = generate_access_token(Uuid::new_v4(), SECRET, Duration::zero()).unwrap();
        assert!(matches!(
            validate_access_token(&token, SECRET),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_tampered_signature() {
        let token = generate_access_token(Uuid::new_v4(), SECRET, Duration::minutes(5)).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(validate_access_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_other_hmac_algorithms_accepted() {
        let now = Utc::now().timestamp();
        let user_id = Uuid::new_v4();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + 300,
        };

        let token = sign(&claims, Algorithm::HS512, SECRET);
        assert_eq!(validate_access_token(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        // Header claims RS256 but the body is signed with the shared secret
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + 300,
        };
        let hs = sign(&claims, Algorithm::HS256, SECRET);
        let mut parts: Vec<&str> = hs.split('.').collect();
        let forged_header = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9"; // {"alg":"RS256","typ":"JWT"}
        parts[0] = forged_header;
        let forged = parts.join(".");

        assert!(matches!(
            validate_access_token(&forged, SECRET),
            Err(JwtError::InvalidAlgorithm)
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + 300,
        };

        let token = sign(&claims, Algorithm::HS256, SECRET);
        assert!(matches!(
            validate_access_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_subject_must_be_uuid() {
        let now = Utc::now().timestamp();
        for sub in ["", "not-a-uuid"] {
            let claims = Claims {
                iss: TOKEN_ISSUER.to_string(),
                sub: sub.to_string(),
                iat: now,
                exp: now + 300,
            };
            let token = sign(&claims, Algorithm::HS256, SECRET);
            assert!(
                matches!(validate_access_token(&token, SECRET), Err(JwtError::InvalidSubject)),
                "sub = {sub:?}"
            );
        }
    }

    #[test]
    fn test_access_token_ttl_is_capped() {
        assert_eq!(access_token_ttl(None), Duration::hours(1));
        assert_eq!(access_token_ttl(Some(60)), Duration::seconds(60));
        assert_eq!(access_token_ttl(Some(7200)), Duration::hours(1));
        assert_eq!(access_token_ttl(Some(0)), Duration::hours(1));
        assert_eq!(access_token_ttl(Some(-5)), Duration::hours(1));
    }

    proptest! {
        #[test]
        fn prop_round_trip_before_expiry(
            bytes in any::<[u8; 16]>(),
            secret in proptest::collection::vec(any::<u8>(), 1..64),
            ttl in 1i64..=3600,
            elapsed in 0i64..3600,
        ) {
            prop_assume!(elapsed < ttl);
            let user_id = Uuid::from_bytes(bytes);
            let issued = Utc::now();
            let token = generate_access_token_at(user_id, &secret, Duration::seconds(ttl), issued).unwrap();

            let at = issued + Duration::seconds(elapsed);
            prop_assert_eq!(validate_access_token_at(&token, &secret, at).unwrap(), user_id);

            let expired_at = issued + Duration::seconds(ttl);
            prop_assert!(validate_access_token_at(&token, &secret, expired_at).is_err());
        }
    }
}
