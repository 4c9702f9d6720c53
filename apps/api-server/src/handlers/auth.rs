//! Registration and login handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use ripple_core::domain::User;
use ripple_core::error::RepoError;
use ripple_core::ports::{PasswordService, TokenService};
use ripple_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
    }
}

/// POST /api/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username must not be empty".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Fast duplicate check; the unique indexes still arbitrate races.
    if state
        .users
        .find_by_email_or_username(&req.email, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "Email or username already taken".to_string(),
        ));
    }

    let password_hash = password_service.hash(&req.password)?;

    let user = User::new(req.email, req.username, password_hash);
    let saved = state.users.insert(user).await.map_err(|e| match e {
        RepoError::Constraint(_) => {
            AppError::BadRequest("Email or username already taken".to_string())
        }
        other => other.into(),
    })?;

    let token = token_service.generate_token(saved.id, &saved.username)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        user: user_response(&saved),
        token,
    }))
}

/// POST /api/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // One failure path for unknown email and wrong password alike
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = token_service.generate_token(user.id, &user.username)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: user_response(&user),
        token,
    }))
}
