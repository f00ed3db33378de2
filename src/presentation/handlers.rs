use crate::application::auth_service::AuthService;
use crate::application::ticket_service::TicketService;
use crate::data::ticket_repository::InMemoryTicketRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::ticket::CreateTicket;
use crate::domain::user::{Role, User};
use crate::infrastructure::security::{AuthError, AuthenticatedUser};
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// AppState holding the services
pub struct AppState {
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
    pub ticket_service: TicketService<InMemoryTicketRepository>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("User with this email already exists")]
    DuplicateIdentity,
    #[error("Invalid email or password")]
    InvalidCredential,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateIdentity => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredential => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        match self {
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
            _ => warn!(error = %error_msg, status = %status, "Request failed"),
        }

        HttpResponse::build(status).json(ErrorResponse {
            details: serde_json::json!({ "message": &error_msg }),
            error: error_msg,
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::DuplicateIdentity) => ApiError::DuplicateIdentity,
            Some(DomainError::InvalidCredential) => ApiError::InvalidCredential,
            Some(DomainError::Unauthenticated) => ApiError::Unauthenticated,
            Some(DomainError::Forbidden) => ApiError::Forbidden,
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => ApiError::Unauthenticated,
            AuthError::Forbidden => ApiError::Forbidden,
        }
    }
}

// AuthenticatedUser extractor: the guard middleware verified the token and
// stashed the claims in request extensions.
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move { user.ok_or(ApiError::Unauthenticated) })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

/// User record as exposed to admins. The password hash never leaves the
/// store.
#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, user, req), fields(user_id = %user.user_id))]
pub async fn create_ticket(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateTicket>,
) -> Result<HttpResponse, ApiError> {
    info!(title = %req.title, "Creating ticket");
    let ticket = state
        .ticket_service
        .create_ticket(&user, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create ticket");
            ApiError::from(e)
        })?;
    info!(ticket_id = ticket.id, "Ticket created successfully");
    Ok(HttpResponse::Ok().json(ticket))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn my_tickets(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let tickets = state
        .ticket_service
        .tickets_for(&user.user_id)
        .await
        .map_err(ApiError::from)?;
    Ok(HttpResponse::Ok().json(tickets))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn review_tickets(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let tickets = state
        .ticket_service
        .all_tickets()
        .await
        .map_err(ApiError::from)?;
    info!(count = tickets.len(), "Tickets listed for review");
    Ok(HttpResponse::Ok().json(tickets))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_users(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let users: Vec<UserSummary> = state
        .auth_service
        .list_users()
        .await
        .map_err(ApiError::from)?
        .into_iter()
        .map(UserSummary::from)
        .collect();
    info!(count = users.len(), "Users listed");
    Ok(HttpResponse::Ok().json(users))
}
