use crate::domain::user::{LoginRequest, RegisterRequest, Role};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::middleware::TOKEN_COOKIE;
use actix_web::cookie::Cookie;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{error, info, instrument};

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub role: Role,
    pub name: Option<String>,
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");

    let user = state
        .auth_service
        .register_user(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;

    info!(user_id = %user.id, "User registered successfully");
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "user created".to_string(),
    }))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let (token, user) = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to login");
            ApiError::from(e)
        })?;

    // The token travels as an http-only cookie; the body only carries the
    // display identity.
    let cookie = Cookie::build(TOKEN_COOKIE, token)
        .http_only(true)
        .path("/")
        .finish();

    info!("Login successful");
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        role: user.role,
        name: user.name,
    }))
}
