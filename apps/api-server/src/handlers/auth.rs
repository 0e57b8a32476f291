//! Authentication handlers.

use std::str::FromStr;

use actix_web::{HttpResponse, web};
use validator::Validate;

use agora_core::domain::Role;
use agora_core::services::{Registration, Session};
use agora_shared::dto::{
    AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, TokenPairResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn auth_response(session: Session, with_role: bool) -> AuthResponse {
    AuthResponse {
        id: session.user.id,
        role: with_role.then(|| session.user.role.to_string()),
        email: session.user.email,
        access_token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()
        .map_err(|e| AppError::validation(&e, "body"))?;

    let role = req
        .role
        .as_deref()
        .map(Role::from_str)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let session = state
        .auth
        .register(Registration {
            email: req.email,
            password: req.password,
            role,
        })
        .await?;

    Ok(HttpResponse::Created().json(auth_response(session, false)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()
        .map_err(|e| AppError::validation(&e, "body"))?;

    let session = state.auth.login(&req.email, &req.password).await?;

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok(HttpResponse::Ok().json(auth_response(session, true)))
}

/// POST /api/auth/refresh-token
pub async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()
        .map_err(|e| AppError::validation(&e, "body"))?;

    let tokens = state.auth.refresh(&req.token).await?;

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}
