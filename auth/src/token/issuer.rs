use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::AccessClaims;
use super::errors::TokenError;

/// Issues and validates signed access tokens.
///
/// Uses HS256 (HMAC with SHA-256) with a process-wide symmetric secret.
/// Tokens are stateless; validity is established purely by signature and
/// the expiry claim.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenIssuer {
    /// Create a new token issuer with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in configuration or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Issue a signed access token for a subject.
    ///
    /// The token carries the subject id, the issue timestamp, and an
    /// expiry of `issued_at + ttl`.
    ///
    /// # Arguments
    /// * `subject_id` - User identifier to encode as the subject
    /// * `ttl` - Time until the token expires
    ///
    /// # Returns
    /// Signed JWT string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject_id: i64, ttl: Duration) -> Result<String, TokenError> {
        let claims = AccessClaims::for_subject(subject_id, ttl);
        self.encode(&claims)
    }

    /// Decode and validate an access token.
    ///
    /// Checks the signature and the expiry claim.
    ///
    /// # Arguments
    /// * `token` - JWT string to validate
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Expired` - Token expiry has passed
    /// * `Invalid` - Signature mismatch or malformed token
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let validation = Validation::new(self.algorithm);

        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    fn encode(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_issue_and_validate() {
        let issuer = TokenIssuer::new(b"my_secret_key_at_least_32_bytes_long!");

        let token = issuer
            .issue(42, Duration::minutes(1))
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = issuer.validate(&token).expect("Failed to validate token");
        assert_eq!(claims.subject_id().unwrap(), 42);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_validate_invalid_token() {
        let issuer = TokenIssuer::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = issuer.validate("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issuer1 = TokenIssuer::new(b"secret1_at_least_32_bytes_long_key!");
        let issuer2 = TokenIssuer::new(b"secret2_at_least_32_bytes_long_key!");

        let token = issuer1
            .issue(42, Duration::minutes(1))
            .expect("Failed to issue token");

        let result = issuer2.validate(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let issuer = TokenIssuer::new(b"my_secret_key_at_least_32_bytes_long!");

        // Expiry well in the past, beyond the default validation leeway
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: "42".to_string(),
            iat: now - 300,
            exp: now - 120,
        };
        let token = issuer.encode(&claims).expect("Failed to encode token");

        let result = issuer.validate(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_validate_tampered_token() {
        let issuer = TokenIssuer::new(b"my_secret_key_at_least_32_bytes_long!");

        let token = issuer
            .issue(42, Duration::minutes(1))
            .expect("Failed to issue token");

        // Flip a character in the payload segment
        let mut tampered = token.into_bytes();
        let dot = tampered.iter().position(|&b| b == b'.').unwrap();
        tampered[dot + 1] = if tampered[dot + 1] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(issuer.validate(&tampered).is_err());
    }
}
