//! Refresh token generation
//!
//! Refresh tokens are opaque: 32 bytes from the operating system's CSPRNG,
//! hex-encoded to 64 lowercase characters.

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Number of random bytes in a refresh token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Days a refresh token stays valid after login
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// The random source could not produce bytes
#[derive(Debug, Error)]
#[error("Entropy source unavailable: {0}")]
pub struct EntropyError(#[from] rand::Error);

/// Generate a new refresh token
pub fn generate_refresh_token() -> Result<String, EntropyError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn test_refresh_token_format() {
        let token = generate_refresh_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(is_lower_hex(&token), "not lowercase hex: {token}");
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let tokens: std::collections::HashSet<String> = (0..100)
            .map(|_| generate_refresh_token().unwrap())
            .collect();
        assert_eq!(tokens.len(), 100);
    }
}
