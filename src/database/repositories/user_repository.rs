use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{NewUser, User};
use crate::database::schema::users;
use diesel::prelude::*;
use std::sync::Arc;

/// User repository trait - defines interface for account operations
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account
    fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError>;

    /// Find account by email
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Find an active account by API key hash
    fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DatabaseError>;

    /// Find account by ID
    fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    /// Get all accounts
    fn get_all(&self) -> Result<Vec<User>, DatabaseError>;

    /// Activate or deactivate an account
    fn set_active(&self, id: i64, active: bool) -> Result<usize, DatabaseError>;

    /// Delete an account
    fn delete(&self, id: i64) -> Result<usize, DatabaseError>;
}

/// Concrete implementation of UserRepository
pub struct UserRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl UserRepositoryImpl {
    /// Create new user repository with connection provider
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
impl UserRepository for UserRepositoryImpl {
    fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<User>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .filter(users::api_key_hash.eq(hash))
            .filter(users::is_active.eq(true))
            .first::<User>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .find(id)
            .first::<User>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn get_all(&self) -> Result<Vec<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .order(users::created_at.asc())
            .load::<User>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn set_active(&self, id: i64, active: bool) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(users::table.find(id))
            .set(users::is_active.eq(active))
            .execute(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn delete(&self, id: i64) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let deleted = diesel::delete(users::table.find(id)).execute(&mut conn)?;

        tracing::info!("Deleted user {}", id);

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[ignore]
    fn test_user_repository() {
        // Tests require actual database connection - skip in CI
    }
}
