//! Authentication utilities library
//!
//! Provides the credential-handling infrastructure for the account service:
//! - Password hashing (Argon2id)
//! - Access token issuance and validation (HS256 JWT)
//! - Authentication coordination
//!
//! The service defines its own domain traits and adapts these implementations,
//! keeping credential handling out of the domain layer.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenIssuer;
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!");
//! let token = issuer.issue(42, Duration::minutes(60)).unwrap();
//! let claims = issuer.validate(&token).unwrap();
//! assert_eq!(claims.subject_id().unwrap(), 42);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth.authenticate("password123", &hash, 42, Duration::minutes(60)).unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.subject_id().unwrap(), 42);
//! ```

pub mod authenticator;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::AccessClaims;
pub use token::TokenError;
pub use token::TokenIssuer;
