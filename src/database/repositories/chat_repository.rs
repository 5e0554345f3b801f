use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{ChatMessage, ChatSession, NewChatMessage, NewChatSession};
use crate::database::schema::{chat_messages, chat_sessions};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

/// Chat repository trait - session and message persistence
#[async_trait::async_trait]
pub trait ChatRepository: Send + Sync {
    /// Create a new session
    fn create_session(&self, session: NewChatSession) -> Result<ChatSession, DatabaseError>;

    /// Find a session by ID
    fn find_session(&self, id: Uuid) -> Result<Option<ChatSession>, DatabaseError>;

    /// Sessions for one account, most recently touched first
    fn list_sessions_for_user(&self, user_id: i64) -> Result<Vec<ChatSession>, DatabaseError>;

    /// Append a message and bump the session timestamp
    fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage, DatabaseError>;

    /// All messages of a session, chronological
    fn get_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, DatabaseError>;

    /// Delete a session and its messages
    fn delete_session(&self, id: Uuid) -> Result<usize, DatabaseError>;
}

/// Concrete implementation of ChatRepository
pub struct ChatRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl ChatRepositoryImpl {
    /// Create new chat repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

#[async_trait::async_trait]
impl ChatRepository for ChatRepositoryImpl {
    fn create_session(&self, session: NewChatSession) -> Result<ChatSession, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(chat_sessions::table)
            .values(&session)
            .get_result::<ChatSession>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_session(&self, id: Uuid) -> Result<Option<ChatSession>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        chat_sessions::table
            .find(id)
            .first::<ChatSession>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn list_sessions_for_user(&self, user_id: i64) -> Result<Vec<ChatSession>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        chat_sessions::table
            .filter(chat_sessions::user_id.eq(user_id))
            .order(chat_sessions::updated_at.desc())
            .load::<ChatSession>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction(|conn| {
            let stored = diesel::insert_into(chat_messages::table)
                .values(&message)
                .get_result::<ChatMessage>(conn)?;

            diesel::update(chat_sessions::table.find(message.session_id))
                .set(chat_sessions::updated_at.eq(diesel::dsl::now))
                .execute(conn)?;

            Ok::<_, diesel::result::Error>(stored)
        })
        .map_err(DatabaseError::from)
    }

    fn get_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        chat_messages::table
            .filter(chat_messages::session_id.eq(session_id))
            .order(chat_messages::created_at.asc())
            .load::<ChatMessage>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn delete_session(&self, id: Uuid) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction(|conn| {
            diesel::delete(chat_messages::table.filter(chat_messages::session_id.eq(id)))
                .execute(conn)?;

            diesel::delete(chat_sessions::table.find(id)).execute(conn)
        })
        .map_err(DatabaseError::from)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[ignore]
    fn test_chat_repository() {
        // Tests require actual database connection - skip in CI
    }
}
