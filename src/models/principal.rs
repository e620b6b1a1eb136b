//! Authenticated principal, bearer token claims and access policies

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Capability level of a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// The verified caller of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl PrincipalClaims {
    pub fn new(user_id: i32, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            user_id,
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Encode a token. Used by tooling and tests; issuance proper lives in
    /// the identity provider.
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

/// Access requirement of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone. Anonymous callers only when `anonymous` is set.
    Public { anonymous: bool },
    /// Any authenticated caller; when an owner is given, only that user or an admin.
    AuthenticatedOwner(Option<i32>),
    Admin,
}

impl Access {
    pub fn authorize(self, caller: Option<&Principal>) -> AppResult<()> {
        match (self, caller) {
            (Access::Public { anonymous: true }, _) => Ok(()),
            (_, None) => Err(AppError::Authentication(
                "Authentication credentials were not provided".to_string(),
            )),
            (Access::Public { .. }, Some(_)) => Ok(()),
            (Access::AuthenticatedOwner(None), Some(_)) => Ok(()),
            (Access::AuthenticatedOwner(Some(owner)), Some(p)) => {
                if p.user_id == owner || p.is_admin() {
                    Ok(())
                } else {
                    Err(AppError::Authorization(
                        "This borrowing belongs to another user".to_string(),
                    ))
                }
            }
            (Access::Admin, Some(p)) => {
                if p.is_admin() {
                    Ok(())
                } else {
                    Err(AppError::Authorization(
                        "Administrator rights required".to_string(),
                    ))
                }
            }
        }
    }
}
