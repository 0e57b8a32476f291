//! Registration, login and token refresh.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::{DomainError, DomainResult, RepoError};
use crate::ports::{AuthError, PasswordService, TokenKind, TokenPair, TokenService, UserRepository};

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// A user together with a freshly issued token pair.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

/// Emails are matched case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    pub async fn register(&self, registration: Registration) -> DomainResult<Session> {
        let email = normalize_email(&registration.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(user_exists());
        }

        let password_hash = self.passwords.hash(&registration.password)?;
        // A concurrent registration can still win the unique key after the lookup.
        let user = self
            .users
            .insert(User::new(email, password_hash, registration.role))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => user_exists(),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        let tokens = self.tokens.issue_pair(user.id)?;
        Ok(Session { user, tokens })
    }

    /// Unknown emails and wrong passwords fail identically.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<Session> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.tokens.issue_pair(user.id)?;
        Ok(Session { user, tokens })
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.load_subject(claims.user_id).await?;

        Ok(self.tokens.issue_pair(user.id)?)
    }

    /// Resolve the user behind an access token.
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<User> {
        let claims = self.tokens.verify(access_token, TokenKind::Access)?;
        self.load_subject(claims.user_id).await
    }

    async fn load_subject(&self, user_id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Unknown subject".to_string()).into())
    }
}

fn user_exists() -> DomainError {
    DomainError::Conflict("User already exists".to_string())
}
