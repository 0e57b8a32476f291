use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use agora_core::DomainError;
use agora_core::domain::{Role, User};
use agora_core::error::RepoError;
use agora_core::ports::{AuthError, BaseRepository, TokenKind, TokenService, UserRepository};
use agora_core::services::{AuthService, Registration};
use agora_infra::{
    Argon2PasswordService, InMemoryUserRepository, JwtConfig, JwtTokenService, PasswordHashConfig,
};

fn setup() -> (AuthService, Arc<JwtTokenService>) {
    setup_with(Arc::new(InMemoryUserRepository::new()))
}

fn setup_with(users: Arc<dyn UserRepository>) -> (AuthService, Arc<JwtTokenService>) {
    let tokens = Arc::new(JwtTokenService::new(JwtConfig::default()));
    let passwords = Argon2PasswordService::with_config(PasswordHashConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();

    let service = AuthService::new(users, tokens.clone(), Arc::new(passwords));
    (service, tokens)
}

/// A user store whose email lookup always misses, as when two registrations
/// both check before either has inserted.
#[derive(Default)]
struct StaleEmailLookup {
    inner: InMemoryUserRepository,
}

#[async_trait]
impl BaseRepository<User, Uuid> for StaleEmailLookup {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        self.inner.insert(user).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl UserRepository for StaleEmailLookup {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepoError> {
        Ok(None)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        self.inner.find_many(ids).await
    }
}

fn registration(email: &str, role: Option<Role>) -> Registration {
    Registration {
        email: email.to_string(),
        password: "secret123".to_string(),
        role,
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let (service, tokens) = setup();

    let registered = service
        .register(registration("Jane@Example.com", None))
        .await
        .unwrap();
    assert_eq!(registered.user.email, "jane@example.com");
    assert_eq!(registered.user.role, Role::User);

    let session = service.login("jane@example.com", "secret123").await.unwrap();
    assert_eq!(session.user.id, registered.user.id);

    let claims = tokens
        .verify(&session.tokens.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.user_id, registered.user.id);
}

#[tokio::test]
async fn test_register_keeps_requested_role() {
    let (service, _) = setup();

    let session = service
        .register(registration("mod@example.com", Some(Role::Moderator)))
        .await
        .unwrap();

    assert_eq!(session.user.role, Role::Moderator);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (service, _) = setup();
    service
        .register(registration("jane@example.com", None))
        .await
        .unwrap();

    let result = service
        .register(registration(" JANE@example.com", None))
        .await;

    assert!(matches!(result, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (service, _) = setup();
    service
        .register(registration("jane@example.com", None))
        .await
        .unwrap();

    let unknown = service.login("nobody@example.com", "secret123").await;
    let wrong = service.login("jane@example.com", "wrong-password").await;

    assert!(matches!(
        unknown,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
    assert!(matches!(
        wrong,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let (service, tokens) = setup();
    let session = service
        .register(registration("jane@example.com", None))
        .await
        .unwrap();

    let pair = service
        .refresh(&session.tokens.refresh_token)
        .await
        .unwrap();

    let claims = tokens.verify(&pair.access_token, TokenKind::Access).unwrap();
    assert_eq!(claims.user_id, session.user.id);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (service, _) = setup();
    let session = service
        .register(registration("jane@example.com", None))
        .await
        .unwrap();

    let result = service.refresh(&session.tokens.access_token).await;

    assert!(matches!(result, Err(DomainError::Auth(_))));
}

#[tokio::test]
async fn test_authenticate_resolves_user() {
    let (service, _) = setup();
    let session = service
        .register(registration("jane@example.com", None))
        .await
        .unwrap();

    let user = service
        .authenticate(&session.tokens.access_token)
        .await
        .unwrap();
    assert_eq!(user.id, session.user.id);

    assert!(service.authenticate("garbage").await.is_err());
}

#[tokio::test]
async fn test_unique_key_race_reports_existing_user() {
    let (service, _) = setup_with(Arc::new(StaleEmailLookup::default()));
    service
        .register(registration("jane@example.com", None))
        .await
        .unwrap();

    let result = service
        .register(registration("jane@example.com", None))
        .await;

    match result {
        Err(DomainError::Conflict(message)) => assert_eq!(message, "User already exists"),
        other => panic!("expected conflict, got {other:?}"),
    }
}
