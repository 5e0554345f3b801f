use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{DailyAverage, EnergyPrice, NewEnergyPrice};
use crate::database::schema::energy_prices;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::upsert::excluded;
use std::sync::Arc;

/// RDN price repository trait
///
/// Focused on idempotent batch imports and date-range reads for the
/// analytics endpoints
#[async_trait::async_trait]
pub trait EnergyPriceRepository: Send + Sync {
    /// Batch upsert hourly ticks; re-imports overwrite on (date, hour)
    fn upsert_batch(&self, ticks: Vec<NewEnergyPrice>) -> Result<usize, DatabaseError>;

    /// Get hourly ticks within a date range, chronological
    fn get_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<EnergyPrice>, DatabaseError>;

    /// Daily average/max/min aggregated in SQL, chronological
    fn get_daily_averages(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAverage>, DatabaseError>;

    /// Most recent delivery date in the store
    fn latest_date(&self) -> Result<Option<NaiveDate>, DatabaseError>;
}

/// Concrete implementation of EnergyPriceRepository
pub struct EnergyPriceRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl EnergyPriceRepositoryImpl {
    /// Create new RDN price repository with connection provider
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
impl EnergyPriceRepository for EnergyPriceRepositoryImpl {
    fn upsert_batch(&self, ticks: Vec<NewEnergyPrice>) -> Result<usize, DatabaseError> {
        if ticks.is_empty() {
            return Ok(0);
        }

        let mut conn = (self.get_conn)()?;

        // Vendor corrections republish the same (date, hour) with a new
        // price, so conflicts update rather than skip
        let upserted = diesel::insert_into(energy_prices::table)
            .values(&ticks)
            .on_conflict((energy_prices::price_date, energy_prices::hour))
            .do_update()
            .set((
                energy_prices::price.eq(excluded(energy_prices::price)),
                energy_prices::volume.eq(excluded(energy_prices::volume)),
            ))
            .execute(&mut conn)?;

        tracing::debug!("Upserted {} RDN ticks", upserted);

        Ok(upserted)
    }

    fn get_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<EnergyPrice>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        energy_prices::table
            .filter(energy_prices::price_date.ge(from))
            .filter(energy_prices::price_date.le(to))
            .order((energy_prices::price_date.asc(), energy_prices::hour.asc()))
            .load::<EnergyPrice>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn get_daily_averages(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAverage>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::sql_query(
            "SELECT price_date, \
                    AVG(price) AS avg_price, \
                    MAX(price) AS max_price, \
                    MIN(price) AS min_price \
             FROM energy_prices \
             WHERE price_date BETWEEN $1 AND $2 \
             GROUP BY price_date \
             ORDER BY price_date",
        )
        .bind::<diesel::sql_types::Date, _>(from)
        .bind::<diesel::sql_types::Date, _>(to)
        .load::<DailyAverage>(&mut conn)
        .map_err(DatabaseError::from)
    }

    fn latest_date(&self) -> Result<Option<NaiveDate>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        energy_prices::table
            .select(energy_prices::price_date)
            .order(energy_prices::price_date.desc())
            .first::<NaiveDate>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[ignore]
    fn test_energy_price_repository() {
        // Tests require actual database connection - skip in CI
    }
}
