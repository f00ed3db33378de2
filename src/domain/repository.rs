use crate::domain::ticket::Ticket;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. Fails with `DomainError::DuplicateIdentity` when
    /// the email is already taken; the existence check and the insert must
    /// happen under one write guard so concurrent registration of the same
    /// email cannot produce two records.
    async fn create_user(&self, user: User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn save(&self, ticket: Ticket) -> Result<()>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Ticket>>;
    async fn list_all(&self) -> Result<Vec<Ticket>>;
}
