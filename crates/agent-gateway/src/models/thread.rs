use serde::{Deserialize, Serialize};

/// A conversation context on the remote service, created once per ask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationThread {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}
