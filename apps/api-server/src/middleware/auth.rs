//! Authentication extractor.
//!
//! All credential failures - missing header, malformed or expired token,
//! or a token whose subject no longer exists - collapse into the same
//! uniform 401 response, so a caller can never tell which check failed.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use std::sync::Arc;

use ripple_core::ports::{AuthError, TokenService};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
///
/// Engagement writes always act as this identity - there is no way to
/// toggle a like or follow on another account's behalf.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let token_service = req
                .app_data::<web::Data<Arc<dyn TokenService>>>()
                .ok_or_else(|| {
                    tracing::error!("TokenService not found in app data");
                    AppError::Internal("server configuration error".to_string())
                })?;
            let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
                tracing::error!("AppState not found in app data");
                AppError::Internal("server configuration error".to_string())
            })?;

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .ok_or(AuthError::MissingAuth)
                .map_err(AppError::from)?;

            let claims = token_service
                .validate_token(token)
                .map_err(AppError::from)?;

            // The subject must still exist; a token outliving its account
            // is just another invalid credential.
            let user = state
                .users
                .find_by_id(claims.user_id)
                .await?
                .ok_or(AuthError::UnknownSubject)
                .map_err(AppError::from)?;

            Ok(Identity {
                user_id: user.id,
                username: user.username,
            })
        })
    }
}
