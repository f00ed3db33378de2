use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::security::{hash_password, issue_token, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    jwt_secret: String,
    token_ttl_secs: u64,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, jwt_secret: String, token_ttl_secs: u64) -> Self {
        Self {
            user_repository,
            jwt_secret,
            token_ttl_secs,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register_user(&self, req: RegisterRequest) -> Result<User> {
        trace!("Starting user registration");

        if req.email.trim().is_empty() {
            return Err(DomainError::Validation("email must not be empty".to_string()).into());
        }
        if req.password.is_empty() {
            return Err(DomainError::Validation("password must not be empty".to_string()).into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role.unwrap_or_default(),
        };

        debug!(user_id = %user.id, "Saving user to repository");
        // The store rejects duplicate emails; no pre-check here, so the
        // uniqueness decision is made under its write guard.
        self.user_repository.create_user(user.clone()).await?;

        info!(
            user_id = %user.id,
            email = %user.email,
            role = %user.role,
            "User registered successfully"
        );

        Ok(user)
    }

    /// Verifies the credentials and issues a signed token. Unknown email and
    /// wrong password fail identically, so a caller cannot probe which
    /// addresses are registered.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<(String, User)> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "User not found during login");
                DomainError::InvalidCredential
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::InvalidCredential.into());
        }

        let token = issue_token(&user, &self.jwt_secret, self.token_ttl_secs).map_err(|e| {
            error!(error = %e, "Failed to issue token");
            DomainError::Internal(format!("Failed to issue token: {}", e))
        })?;

        info!(user_id = %user.id, role = %user.role, "Login successful");

        Ok((token, user))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repository.list_users().await
    }
}
