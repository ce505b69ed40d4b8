use super::content::ContentBlock;
use crate::errors::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message as stored on a remote thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// The first content block, which holds the reply text for agent messages
    pub fn first_content(&self) -> GatewayResult<&ContentBlock> {
        self.content.first().ok_or_else(|| {
            GatewayError::MalformedContent(format!("message '{}' has no content", self.id))
        })
    }
}

/// Body of a create-message call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
}

impl NewMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        NewMessage {
            role: Role::User,
            content: content.into(),
        }
    }
}
