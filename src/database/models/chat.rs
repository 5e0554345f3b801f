use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::enums::ChatRole;

/// Assistant conversation session
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::chat_sessions)]
#[diesel(primary_key(id))]
pub struct ChatSession {
    pub id: Uuid,

    /// Owning account; sessions are private to their owner
    pub user_id: i64,

    /// Derived from the first user message
    pub title: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New session for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::chat_sessions)]
pub struct NewChatSession {
    pub id: Uuid,
    pub user_id: i64,
    pub title: Option<String>,
}

impl NewChatSession {
    pub fn new(user_id: i64, title: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
        }
    }
}

/// Single message within a session
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::chat_messages)]
#[diesel(primary_key(id))]
pub struct ChatMessage {
    pub id: i64,

    pub session_id: Uuid,

    pub role: ChatRole,

    pub content: String,

    /// Vendor model that produced an assistant message
    pub model: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// New message for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::chat_messages)]
pub struct NewChatMessage {
    pub session_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub model: Option<String>,
}

impl NewChatMessage {
    pub fn user(session_id: Uuid, content: String) -> Self {
        Self {
            session_id,
            role: ChatRole::User,
            content,
            model: None,
        }
    }

    pub fn assistant(session_id: Uuid, content: String, model: String) -> Self {
        Self {
            session_id,
            role: ChatRole::Assistant,
            content,
            model: Some(model),
        }
    }
}
