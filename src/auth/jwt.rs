//! JWT token handling
//!
//! Identity resolution is a pure function over the token: no session store,
//! no ambient fallback user. Token issuance belongs to the external auth
//! service; `create_token` exists for that service and for tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::domain::Identity;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secret-key-change-in-production".to_string()),
            expiration_hours: 24,
            issuer: "ev-booking".to_string(),
        }
    }
}

impl From<&SecurityConfig> for JwtConfig {
    fn from(cfg: &SecurityConfig) -> Self {
        Self {
            secret: cfg.jwt_secret.clone(),
            expiration_hours: 24,
            issuer: cfg.jwt_issuer.clone(),
        }
    }
}

/// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Contact phone
    pub mobile: String,
    /// Guest accounts are quota-limited
    #[serde(default)]
    pub is_guest: bool,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(identity: &Identity, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: identity.user_id.clone(),
            name: identity.name.clone(),
            mobile: identity.phone.clone(),
            is_guest: identity.is_guest,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }
}

/// Errors that can occur during authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authorization header is missing
    MissingToken,
    /// Token is malformed or has a bad signature
    InvalidToken,
    /// Token has expired
    TokenExpired,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Missing authorization token",
            Self::InvalidToken => "Invalid authorization token",
            Self::TokenExpired => "Authorization token expired",
        }
    }
}

/// Create a JWT token for an identity
pub fn create_token(
    identity: &Identity,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(identity, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Resolve the requester identity from a bearer token.
///
/// Pure function: token in, identity or error out.
pub fn resolve_identity(token: &str, config: &JwtConfig) -> Result<Identity, AuthError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    let claims = data.claims;
    Ok(Identity {
        user_id: claims.sub,
        name: claims.name,
        phone: claims.mobile,
        is_guest: claims.is_guest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "ev-booking".to_string(),
        }
    }

    #[test]
    fn token_roundtrip_preserves_identity() {
        let config = test_config();
        let identity = Identity::new("U001", "Asha", "9990001111", false);

        let token = create_token(&identity, &config).unwrap();
        let resolved = resolve_identity(&token, &config).unwrap();

        assert_eq!(resolved.user_id, "U001");
        assert_eq!(resolved.name, "Asha");
        assert_eq!(resolved.phone, "9990001111");
        assert!(!resolved.is_guest);
    }

    #[test]
    fn guest_flag_survives_roundtrip() {
        let config = test_config();
        let identity = Identity::new("guest-42", "Guest User", "0000000000", true);

        let token = create_token(&identity, &config).unwrap();
        let resolved = resolve_identity(&token, &config).unwrap();
        assert!(resolved.is_guest);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let config = test_config();
        assert_eq!(
            resolve_identity("not-a-token", &config),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let identity = Identity::new("U001", "Asha", "9990001111", false);
        let token = create_token(&identity, &config).unwrap();

        let other = JwtConfig {
            secret: "different-secret".to_string(),
            ..test_config()
        };
        assert_eq!(
            resolve_identity(&token, &other),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let config = test_config();
        let identity = Identity::new("U001", "Asha", "9990001111", false);
        let token = create_token(&identity, &config).unwrap();

        let other = JwtConfig {
            issuer: "someone-else".to_string(),
            ..test_config()
        };
        assert!(resolve_identity(&token, &other).is_err());
    }
}
