use crate::domain::repository::TicketRepository;
use crate::domain::ticket::Ticket;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct InMemoryTicketRepository {
    storage: Arc<RwLock<HashMap<u32, Ticket>>>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTicketRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn save(&self, ticket: Ticket) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(ticket.id, ticket);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Ticket>> {
        let storage = self.storage.read().await;
        let mut tickets: Vec<Ticket> = storage
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.created_at);
        Ok(tickets)
    }

    async fn list_all(&self) -> Result<Vec<Ticket>> {
        let storage = self.storage.read().await;
        let mut tickets: Vec<Ticket> = storage.values().cloned().collect();
        tickets.sort_by_key(|t| t.created_at);
        Ok(tickets)
    }
}
