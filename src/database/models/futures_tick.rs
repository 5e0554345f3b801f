use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Daily futures-contract settlement tick
///
/// One row per (contract, price_date). Vendor exports carry only the
/// settlement for thinly-traded contracts, so OHLC fields are optional.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::futures_ticks)]
#[diesel(primary_key(id))]
pub struct FuturesTick {
    /// Auto-incrementing ID
    pub id: i64,

    /// Contract code, e.g. BASE_Y-26
    pub contract: String,

    /// Trading date
    pub price_date: NaiveDate,

    /// Settlement price in PLN/MWh
    #[schema(value_type = String, example = "455.25")]
    pub settlement: Decimal,

    #[schema(value_type = Option<String>, example = "452.00")]
    pub open_price: Option<Decimal>,

    #[schema(value_type = Option<String>, example = "457.75")]
    pub high_price: Option<Decimal>,

    #[schema(value_type = Option<String>, example = "451.30")]
    pub low_price: Option<Decimal>,

    /// Traded volume in contracts
    #[schema(value_type = Option<String>, example = "820")]
    pub volume: Option<Decimal>,

    pub open_interest: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// New futures tick for batch insertion
#[derive(Debug, Clone, Insertable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::futures_ticks)]
pub struct NewFuturesTick {
    pub contract: String,
    pub price_date: NaiveDate,
    #[schema(value_type = String, example = "455.25")]
    pub settlement: Decimal,
    #[schema(value_type = Option<String>)]
    pub open_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub high_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub low_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub volume: Option<Decimal>,
    pub open_interest: Option<i64>,
}

impl NewFuturesTick {
    /// Settlement-only tick, the common case in vendor exports
    pub fn settlement_only(contract: String, price_date: NaiveDate, settlement: Decimal) -> Self {
        Self {
            contract,
            price_date,
            settlement,
            open_price: None,
            high_price: None,
            low_price: None,
            volume: None,
            open_interest: None,
        }
    }
}

impl FuturesTick {
    /// Intraday range when the vendor supplied highs and lows
    pub fn range(&self) -> Option<Decimal> {
        match (self.high_price, self.low_price) {
            (Some(high), Some(low)) => Some(high - low),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settlement_only_has_no_range() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let tick =
            NewFuturesTick::settlement_only("BASE_Y-26".to_string(), date, dec!(460.00));
        assert!(tick.high_price.is_none());
        assert!(tick.low_price.is_none());
    }
}
