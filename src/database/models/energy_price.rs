use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Hourly day-ahead (RDN) price tick
///
/// One row per (price_date, hour); the unique index makes re-imports
/// idempotent.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::energy_prices)]
#[diesel(primary_key(id))]
pub struct EnergyPrice {
    /// Auto-incrementing ID
    pub id: i64,

    /// Delivery date
    pub price_date: NaiveDate,

    /// Delivery hour, 0..=23
    pub hour: i32,

    /// Clearing price in PLN/MWh
    #[schema(value_type = String, example = "412.50")]
    pub price: Decimal,

    /// Traded volume in MWh
    #[schema(value_type = Option<String>, example = "18250.0")]
    pub volume: Option<Decimal>,

    pub created_at: DateTime<Utc>,
}

/// New RDN tick for batch insertion
#[derive(Debug, Clone, Insertable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::energy_prices)]
pub struct NewEnergyPrice {
    pub price_date: NaiveDate,
    pub hour: i32,
    #[schema(value_type = String, example = "412.50")]
    pub price: Decimal,
    #[schema(value_type = Option<String>, example = "18250.0")]
    pub volume: Option<Decimal>,
}

impl NewEnergyPrice {
    pub fn new(price_date: NaiveDate, hour: i32, price: Decimal, volume: Option<Decimal>) -> Self {
        Self {
            price_date,
            hour,
            price,
            volume,
        }
    }
}

/// Daily average over the hourly RDN series, computed in SQL
#[derive(Debug, Clone, QueryableByName, Serialize, Deserialize, ToSchema)]
pub struct DailyAverage {
    #[diesel(sql_type = diesel::sql_types::Date)]
    pub price_date: NaiveDate,

    #[diesel(sql_type = diesel::sql_types::Numeric)]
    #[schema(value_type = String, example = "398.73")]
    pub avg_price: Decimal,

    #[diesel(sql_type = diesel::sql_types::Numeric)]
    #[schema(value_type = String, example = "512.00")]
    pub max_price: Decimal,

    #[diesel(sql_type = diesel::sql_types::Numeric)]
    #[schema(value_type = String, example = "301.10")]
    pub min_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_energy_price() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
        let tick = NewEnergyPrice::new(date, 13, dec!(421.07), Some(dec!(17300)));
        assert_eq!(tick.hour, 13);
        assert_eq!(tick.price, dec!(421.07));
    }
}
