//! Authentication extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use agora_core::domain::{Actor, Role};
use agora_core::policy::has_role;
use agora_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.0.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub Actor);

pub const INSUFFICIENT_ROLE: &str = "Access denied: Insufficient role";

impl Identity {
    /// Passes the identity through when its role is one of `allowed`, 403 otherwise.
    pub fn require_roles(self, allowed: &[Role]) -> Result<Self, AppError> {
        if has_role(&self.0, allowed) {
            Ok(self)
        } else {
            tracing::debug!(user_id = %self.0.id, role = %self.0.role, "Role not permitted");
            Err(AppError::Forbidden(INSUFFICIENT_ROLE.to_string()))
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::MissingAuth),
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let Some(state) = state else {
                return Err(AppError::internal("AppState not registered as app data"));
            };

            let user = state.auth.authenticate(&token?).await?;
            Ok(Identity(Actor::from(&user)))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn bearer_token_requires_scheme() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Token abc"))
            .to_http_request();
        assert!(matches!(bearer_token(&req), Err(AuthError::MissingAuth)));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc");
    }

    fn identity(role: Role) -> Identity {
        Identity(Actor {
            id: uuid::Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
        })
    }

    #[test]
    fn require_roles_admits_listed_role() {
        let allowed = [Role::Admin, Role::Moderator];
        assert!(identity(Role::Admin).require_roles(&allowed).is_ok());
    }

    #[test]
    fn require_roles_rejects_unlisted_role() {
        let allowed = [Role::Admin, Role::Moderator];

        match identity(Role::User).require_roles(&allowed) {
            Err(AppError::Forbidden(message)) => assert_eq!(message, INSUFFICIENT_ROLE),
            other => panic!("expected 403, got {other:?}"),
        }
    }

    #[test]
    fn missing_header_is_missing_auth() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(bearer_token(&req), Err(AuthError::MissingAuth)));
    }
}
