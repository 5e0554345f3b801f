use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::enums::UserRole;

/// Account entity
///
/// The API key itself is never stored, only its SHA-256 hex digest. The
/// hash column therefore never leaves the database layer unredacted.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::users)]
#[diesel(primary_key(id))]
pub struct User {
    /// Auto-incrementing ID
    pub id: i64,

    /// Unique login email
    pub email: String,

    /// Name shown in the UI
    pub display_name: String,

    /// Authorization role
    pub role: UserRole,

    /// SHA-256 hex digest of the account API key
    #[serde(skip_serializing)]
    pub api_key_hash: String,

    /// Deactivated accounts fail authentication without being deleted
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New account for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::users)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub api_key_hash: String,
    pub is_active: bool,
}

impl NewUser {
    pub fn new(email: String, display_name: String, role: UserRole, api_key_hash: String) -> Self {
        Self {
            email,
            display_name,
            role,
            api_key_hash,
            is_active: true,
        }
    }
}

impl User {
    /// Whether this account may call admin-only endpoints
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
