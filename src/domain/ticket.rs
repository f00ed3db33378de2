use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thin record kept behind the auth gate. The owner is always taken from the
/// verified token claims, never from the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u32,
    pub title: String,
    pub desc: String,
    /// Free-form category: "task", "support", "purchase".
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: String,
}
