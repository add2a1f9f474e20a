use chrono::Duration;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::AccessClaims;
use crate::token::TokenError;
use crate::token::TokenIssuer;

/// Authentication coordinator combining password verification and token issuance.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and access token handling.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `token_secret` - Secret key for token signing
    pub fn new(token_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_issuer: TokenIssuer::new(token_secret),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject_id` - User identifier to encode as the token subject
    /// * `ttl` - Time until the token expires
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match the stored hash
    /// * `Token` - Token issuance failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject_id: i64,
        ttl: Duration,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_issuer.issue(subject_id, ttl)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Validate and decode an access token.
    ///
    /// # Arguments
    /// * `token` - JWT string
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `TokenError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.token_issuer.validate(token)
    }
}
