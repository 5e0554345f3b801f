use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::database::models::FuturesTick;

/// Calendar spread point: near minus far settlement on one trading date
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarSpreadPoint {
    pub price_date: NaiveDate,

    #[schema(value_type = String, example = "455.25")]
    pub near_settlement: Decimal,

    #[schema(value_type = String, example = "431.00")]
    pub far_settlement: Decimal,

    /// near - far; positive means the near contract trades rich
    #[schema(value_type = String, example = "24.25")]
    pub spread: Decimal,
}

/// Calendar spread over the date intersection of two settlement series
///
/// Dates present in only one series are dropped; output is chronological.
pub fn calendar_spread(near: &[FuturesTick], far: &[FuturesTick]) -> Vec<CalendarSpreadPoint> {
    let far_by_date: BTreeMap<NaiveDate, Decimal> = far
        .iter()
        .map(|tick| (tick.price_date, tick.settlement))
        .collect();

    let mut points: Vec<CalendarSpreadPoint> = near
        .iter()
        .filter_map(|tick| {
            far_by_date.get(&tick.price_date).map(|far_settlement| CalendarSpreadPoint {
                price_date: tick.price_date,
                near_settlement: tick.settlement,
                far_settlement: *far_settlement,
                spread: tick.settlement - *far_settlement,
            })
        })
        .collect();

    points.sort_by_key(|p| p.price_date);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn tick(contract: &str, date: (i32, u32, u32), settlement: Decimal) -> FuturesTick {
        FuturesTick {
            id: 0,
            contract: contract.to_string(),
            price_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            settlement,
            open_price: None,
            high_price: None,
            low_price: None,
            volume: None,
            open_interest: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_spread_over_date_intersection() {
        let near = vec![
            tick("BASE_Y-26", (2025, 3, 3), dec!(460.00)),
            tick("BASE_Y-26", (2025, 3, 4), dec!(462.50)),
            tick("BASE_Y-26", (2025, 3, 5), dec!(458.00)),
        ];
        let far = vec![
            tick("BASE_Y-27", (2025, 3, 4), dec!(440.00)),
            tick("BASE_Y-27", (2025, 3, 5), dec!(441.25)),
            tick("BASE_Y-27", (2025, 3, 6), dec!(439.00)),
        ];

        let points = calendar_spread(&near, &far);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price_date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(points[0].spread, dec!(22.50));
        assert_eq!(points[1].spread, dec!(16.75));
    }

    #[test]
    fn test_spread_empty_when_no_overlap() {
        let near = vec![tick("BASE_Q-26", (2025, 1, 2), dec!(400))];
        let far = vec![tick("BASE_Q-27", (2025, 1, 3), dec!(390))];

        assert!(calendar_spread(&near, &far).is_empty());
    }
}
