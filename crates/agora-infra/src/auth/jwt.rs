//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_core::ports::{AuthError, TokenClaims, TokenKind, TokenService};

const DEFAULT_ACCESS_SECRET: &str = "change-me-in-production";
const DEFAULT_REFRESH_SECRET: &str = "change-me-too-in-production";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: DEFAULT_ACCESS_SECRET.to_string(),
            refresh_secret: DEFAULT_REFRESH_SECRET.to_string(),
            access_ttl: TimeDelta::hours(1),
            refresh_ttl: TimeDelta::days(7),
            issuer: "agora-api".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let access_secret = secret_from_env("JWT_SECRET", DEFAULT_ACCESS_SECRET);
        let refresh_secret = secret_from_env("REFRESH_SECRET", DEFAULT_REFRESH_SECRET);

        Self {
            access_secret,
            refresh_secret,
            access_ttl: ttl_from_env("JWT_ACCESS_TTL_SECS").unwrap_or(defaults.access_ttl),
            refresh_ttl: ttl_from_env("JWT_REFRESH_TTL_SECS").unwrap_or(defaults.refresh_ttl),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

fn secret_from_env(var: &str, default: &str) -> String {
    let secret = std::env::var(var).unwrap_or_else(|_| default.to_string());

    // Warn if using default secret in production
    if secret == default {
        let is_production = std::env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        if is_production {
            tracing::error!(
                variable = var,
                "SECURITY: Using default token secret in production!"
            );
        } else {
            tracing::warn!(variable = var, "Using default token secret. Set it for production use.");
        }
    }

    secret
}

fn ttl_from_env(var: &str) -> Option<TimeDelta> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(TimeDelta::seconds)
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    typ: String, // token kind
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT-based token service with separate keys for access and refresh tokens.
pub struct JwtTokenService {
    access: Keys,
    refresh: Keys,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            access: Keys::from_secret(&config.access_secret),
            refresh: Keys::from_secret(&config.refresh_secret),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    fn keys(&self, kind: TokenKind) -> &Keys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn ttl(&self, kind: TokenKind) -> TimeDelta {
        match kind {
            TokenKind::Access => self.config.access_ttl,
            TokenKind::Refresh => self.config.refresh_ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.ttl(kind);

        let claims = Claims {
            sub: user_id.to_string(),
            typ: kind.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.keys(kind).encoding)
            .map_err(|e| AuthError::SigningError(e.to_string()))
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.keys(kind).decoding, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        if token_data.claims.typ != kind.as_str() {
            return Err(AuthError::InvalidToken(format!("Expected {} token", kind)));
        }

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            kind,
            exp: token_data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_ttl: TimeDelta::hours(1),
            refresh_ttl: TimeDelta::days(7),
            issuer: "test-issuer".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let service = JwtTokenService::new(test_config());
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, TokenKind::Access).unwrap();
        let claims = service.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_token_lifetimes() {
        let service = JwtTokenService::new(test_config());
        let pair = service.issue_pair(Uuid::new_v4()).unwrap();
        let now = Utc::now().timestamp();

        let access = service.verify(&pair.access_token, TokenKind::Access).unwrap();
        let refresh = service.verify(&pair.refresh_token, TokenKind::Refresh).unwrap();

        assert!((access.exp - now - 3600).abs() <= 5);
        assert!((refresh.exp - now - 7 * 24 * 3600).abs() <= 5);
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let service = JwtTokenService::new(test_config());
        let pair = service.issue_pair(Uuid::new_v4()).unwrap();

        let result = service.verify(&pair.refresh_token, TokenKind::Access);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));

        let result = service.verify(&pair.access_token, TokenKind::Refresh);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_kind_checked_even_with_shared_secret() {
        let service = JwtTokenService::new(JwtConfig {
            access_secret: "shared".to_string(),
            refresh_secret: "shared".to_string(),
            ..test_config()
        });
        let token = service.issue(Uuid::new_v4(), TokenKind::Refresh).unwrap();

        let result = service.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtTokenService::new(test_config());

        let result = service.verify("invalid-token", TokenKind::Access);

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtTokenService::new(JwtConfig {
            access_ttl: TimeDelta::minutes(-5),
            ..test_config()
        });
        let token = service.issue(Uuid::new_v4(), TokenKind::Access).unwrap();

        let result = service.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let service2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = service1.issue(Uuid::new_v4(), TokenKind::Access).unwrap();

        assert!(service2.verify(&token, TokenKind::Access).is_err());
    }
}
