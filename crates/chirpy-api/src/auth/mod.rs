//! Authentication module
//!
//! - Password hashing with Argon2
//! - Access token generation and validation (HS256 JWT)
//! - Opaque refresh token generation
//! - `Authorization` header parsing
//! - Session management over the refresh token store
//! - Request extractors for access tokens and the partner key

pub mod error;
pub mod extractor;
pub mod header;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod service;

pub use error::AuthError;
pub use extractor::{AuthenticatedUser, PartnerKey};
pub use header::{extract_api_key, extract_bearer, extract_credential, AuthScheme, HeaderError};
pub use jwt::{generate_access_token, validate_access_token, Claims, JwtError};
pub use password::{hash_password, hash_password_blocking, verify_password, PasswordError};
pub use refresh::{generate_refresh_token, EntropyError};
pub use service::{RefreshTokenState, Session, SessionManager};
