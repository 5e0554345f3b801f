use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::enums::LeadStatus;
use crate::database::models::{Lead, LeadChangeset, NewLead};
use crate::database::schema::leads;
use diesel::prelude::*;
use std::sync::Arc;

/// Lead repository trait - defines interface for CRM operations
///
/// Import paths use `upsert_batch`, which dedupes on the tax_id natural
/// key; rows without a tax id are always inserted.
#[async_trait::async_trait]
pub trait LeadRepository: Send + Sync {
    /// Insert a single lead; unique violation on tax_id bubbles up
    fn insert(&self, new_lead: NewLead) -> Result<Lead, DatabaseError>;

    /// Batch insert leads, skipping tax_id duplicates
    fn upsert_batch(&self, new_leads: Vec<NewLead>) -> Result<usize, DatabaseError>;

    /// Find lead by ID
    fn find_by_id(&self, id: i64) -> Result<Option<Lead>, DatabaseError>;

    /// Find lead by tax id
    fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Lead>, DatabaseError>;

    /// List leads, newest first, optionally filtered by status
    fn list(
        &self,
        status: Option<LeadStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lead>, DatabaseError>;

    /// Apply a partial update
    fn update(&self, id: i64, changes: LeadChangeset) -> Result<Lead, DatabaseError>;

    /// Move a lead through the pipeline
    fn set_status(&self, id: i64, status: LeadStatus) -> Result<Lead, DatabaseError>;

    /// Store geocoded coordinates
    fn set_coordinates(&self, id: i64, lat: f64, lon: f64) -> Result<Lead, DatabaseError>;

    /// Delete a lead
    fn delete(&self, id: i64) -> Result<usize, DatabaseError>;

    /// Pipeline counts per status
    fn count_by_status(&self) -> Result<Vec<(LeadStatus, i64)>, DatabaseError>;

    /// All leads that have been geocoded (route planner input)
    fn with_coordinates(&self) -> Result<Vec<Lead>, DatabaseError>;
}

/// Concrete implementation of LeadRepository
pub struct LeadRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl LeadRepositoryImpl {
    /// Create new lead repository with connection provider
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
impl LeadRepository for LeadRepositoryImpl {
    fn insert(&self, new_lead: NewLead) -> Result<Lead, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(leads::table)
            .values(&new_lead)
            .get_result::<Lead>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn upsert_batch(&self, new_leads: Vec<NewLead>) -> Result<usize, DatabaseError> {
        if new_leads.is_empty() {
            return Ok(0);
        }

        let mut conn = (self.get_conn)()?;

        // NULL tax ids never conflict, so un-keyed leads always insert
        let inserted = diesel::insert_into(leads::table)
            .values(&new_leads)
            .on_conflict(leads::tax_id)
            .do_nothing()
            .execute(&mut conn)?;

        tracing::debug!(
            "Batch inserted {} leads (attempted {})",
            inserted,
            new_leads.len()
        );

        Ok(inserted)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Lead>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        leads::table
            .find(id)
            .first::<Lead>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Lead>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        leads::table
            .filter(leads::tax_id.eq(tax_id))
            .first::<Lead>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn list(
        &self,
        status: Option<LeadStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lead>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let mut query = leads::table
            .order(leads::created_at.desc())
            .limit(limit)
            .offset(offset)
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(leads::status.eq(status));
        }

        query.load::<Lead>(&mut conn).map_err(DatabaseError::from)
    }

    fn update(&self, id: i64, changes: LeadChangeset) -> Result<Lead, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(leads::table.find(id))
            .set((&changes, leads::updated_at.eq(diesel::dsl::now)))
            .get_result::<Lead>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn set_status(&self, id: i64, status: LeadStatus) -> Result<Lead, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(leads::table.find(id))
            .set((
                leads::status.eq(status),
                leads::updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Lead>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn set_coordinates(&self, id: i64, lat: f64, lon: f64) -> Result<Lead, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(leads::table.find(id))
            .set((
                leads::lat.eq(lat),
                leads::lon.eq(lon),
                leads::updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Lead>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn delete(&self, id: i64) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let deleted = diesel::delete(leads::table.find(id)).execute(&mut conn)?;

        tracing::info!("Deleted lead {}", id);

        Ok(deleted)
    }

    fn count_by_status(&self) -> Result<Vec<(LeadStatus, i64)>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        leads::table
            .group_by(leads::status)
            .select((leads::status, diesel::dsl::count_star()))
            .load::<(LeadStatus, i64)>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn with_coordinates(&self) -> Result<Vec<Lead>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        leads::table
            .filter(leads::lat.is_not_null())
            .filter(leads::lon.is_not_null())
            .load::<Lead>(&mut conn)
            .map_err(DatabaseError::from)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[ignore]
    fn test_lead_repository() {
        // Tests require actual database connection - skip in CI
    }
}
