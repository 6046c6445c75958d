// src/models/token.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'tokens' table: one row per login session.
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    /// Opaque bearer value; also the primary key.
    pub id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// `None` means the token never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// A token is unusable from its expiry instant onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Token> for LoginResponse {
    fn from(token: Token) -> Self {
        Self {
            access_token: token.id,
            token_type: "bearer",
            expires_at: token.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: Option<DateTime<Utc>>) -> Token {
        Token {
            id: "tok".into(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn token_expires_at_exact_instant() {
        let now = Utc::now();
        assert!(token(Some(now)).is_expired_at(now));
        assert!(token(Some(now - Duration::seconds(1))).is_expired_at(now));
        assert!(!token(Some(now + Duration::seconds(1))).is_expired_at(now));
    }

    #[test]
    fn token_without_expiry_never_expires() {
        assert!(!token(None).is_expired_at(Utc::now() + Duration::days(3650)));
    }
}
