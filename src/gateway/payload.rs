use serde::{Deserialize, Serialize};

use crate::chatlog::LogEntry;

pub const MISSING_FIELDS: &str = "Missing required fields.";
pub const INVALID_MESSAGES_LENGTH: &str = "Invalid messages length.";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizeRequest {
    pub query: String,
    #[serde(default)]
    pub cut: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisitRequest {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogRequest {
    pub user_id: String,
    pub chat_id: String,
    pub messages: Vec<LogMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogMessage {
    pub timestamp: i64,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl LogRequest {
    pub fn into_entries(self, client_ip: &str) -> Vec<LogEntry> {
        let LogRequest {
            user_id,
            chat_id,
            messages,
        } = self;

        messages
            .into_iter()
            .map(|m| LogEntry {
                user_id: user_id.clone(),
                chat_id: chat_id.clone(),
                client_ip: client_ip.to_string(),
                timestamp: m.timestamp,
                model: m.model,
                completed: m.completed,
                role: m.role,
                content: m.content,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogResponse {
    pub success: bool,
}
