use crate::domain::repository::TicketRepository;
use crate::domain::ticket::{CreateTicket, Ticket};
use crate::infrastructure::security::AuthenticatedUser;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

pub struct TicketService<R: TicketRepository> {
    repository: Arc<R>,
}

impl<R: TicketRepository> TicketService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a ticket owned by the authenticated caller. The owner comes
    /// from the verified claims, not from the request body.
    pub async fn create_ticket(
        &self,
        user: &AuthenticatedUser,
        req: CreateTicket,
    ) -> Result<Ticket> {
        let ticket = Ticket {
            id: fastrand::u32(..),
            title: req.title,
            desc: req.desc,
            kind: req.kind,
            status: "pending".to_string(),
            user_id: user.user_id.clone(),
            created_at: Utc::now(),
        };
        self.repository.save(ticket.clone()).await?;
        Ok(ticket)
    }

    pub async fn tickets_for(&self, user_id: &str) -> Result<Vec<Ticket>> {
        self.repository.find_by_user(user_id).await
    }

    pub async fn all_tickets(&self) -> Result<Vec<Ticket>> {
        self.repository.list_all().await
    }
}
