use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Claims carried by an access token.
///
/// Fixed three-field structure: subject, issued-at, and expiry. Expiry is
/// always `iat + ttl`, so any verifier holding the secret can validate the
/// token without further context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user identifier, stringified)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Create claims for a subject with an expiry relative to now.
    ///
    /// # Arguments
    /// * `subject_id` - User identifier to encode as the subject
    /// * `ttl` - Time until the token expires
    pub fn for_subject(subject_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Parse the subject claim back into a user identifier.
    ///
    /// # Errors
    /// * `InvalidSubject` - Subject is not a valid integer id
    pub fn subject_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse::<i64>()
            .map_err(|e| TokenError::InvalidSubject(e.to_string()))
    }

    /// Check if the token is expired at the given timestamp.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_subject() {
        let claims = AccessClaims::for_subject(42, Duration::minutes(60));

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn test_subject_id_roundtrip() {
        let claims = AccessClaims::for_subject(42, Duration::minutes(1));
        assert_eq!(claims.subject_id().unwrap(), 42);
    }

    #[test]
    fn test_subject_id_invalid() {
        let claims = AccessClaims {
            sub: "not-a-number".to_string(),
            iat: 0,
            exp: 0,
        };

        assert!(matches!(
            claims.subject_id(),
            Err(TokenError::InvalidSubject(_))
        ));
    }

    #[test]
    fn test_is_expired() {
        let claims = AccessClaims {
            sub: "1".to_string(),
            iat: 900,
            exp: 1000,
        };

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }
}
