use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::auth::AuthUser;
use super::error::ApiError;
use super::responses::*;
use super::state::AppState;
use crate::analytics::{self, calendar_spread};
use crate::database::models::{DailyAverage, EnergyPrice, FuturesTick};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DateRangeQuery {
    /// Start date (YYYY-MM-DD); defaults to 7 days back
    pub from: Option<String>,
    /// End date (YYYY-MM-DD); defaults to today
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct IndicatorQuery {
    /// Start date (YYYY-MM-DD); defaults to 180 days back
    pub from: Option<String>,
    /// End date (YYYY-MM-DD); defaults to today
    pub to: Option<String>,
    /// Indicator lookback window
    #[serde(default = "default_period")]
    pub period: usize,
}

fn default_period() -> usize {
    14
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SpreadQuery {
    /// Near contract code, e.g. BASE_Y-26
    pub near: String,
    /// Far contract code, e.g. BASE_Y-27
    pub far: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Get hourly RDN prices
#[utoipa::path(
    get,
    path = "/api/v1/market/rdn",
    tag = "market",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Hourly RDN ticks", body = Vec<EnergyPrice>),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_rdn_prices(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<Vec<EnergyPrice>>, ApiError> {
    let (from, to) = resolve_range(params.from.as_deref(), params.to.as_deref(), 7)?;

    Ok(Json(state.energy_prices.get_range(from, to)?))
}

/// Get daily RDN averages
#[utoipa::path(
    get,
    path = "/api/v1/market/rdn/daily",
    tag = "market",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Daily average/max/min prices", body = Vec<DailyAverage>),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_rdn_daily(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<Vec<DailyAverage>>, ApiError> {
    let (from, to) = resolve_range(params.from.as_deref(), params.to.as_deref(), 180)?;

    Ok(Json(state.energy_prices.get_daily_averages(from, to)?))
}

/// SMA/RSI/ATR over the daily RDN averages
///
/// The hourly series is too noisy for momentum indicators, so the
/// overlay runs on daily aggregates; daily max/min stand in for
/// high/low in the ATR true range.
#[utoipa::path(
    get,
    path = "/api/v1/market/rdn/indicators",
    tag = "market",
    params(IndicatorQuery),
    responses(
        (status = 200, description = "Indicator overlay", body = IndicatorSeriesResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_rdn_indicators(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<IndicatorQuery>,
) -> Result<Json<IndicatorSeriesResponse>, ApiError> {
    let (from, to) = resolve_range(params.from.as_deref(), params.to.as_deref(), 180)?;
    let period = validate_period(params.period)?;

    let daily = state.energy_prices.get_daily_averages(from, to)?;

    let closes: Vec<Decimal> = daily.iter().map(|d| d.avg_price).collect();
    let highs: Vec<Option<Decimal>> = daily.iter().map(|d| Some(d.max_price)).collect();
    let lows: Vec<Option<Decimal>> = daily.iter().map(|d| Some(d.min_price)).collect();
    let dates: Vec<NaiveDate> = daily.iter().map(|d| d.price_date).collect();

    Ok(Json(indicator_series(&dates, &closes, &highs, &lows, period)))
}

/// List futures contracts present in the store
#[utoipa::path(
    get,
    path = "/api/v1/market/futures",
    tag = "market",
    responses(
        (status = 200, description = "Contract codes", body = ContractListResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ContractListResponse>, ApiError> {
    let contracts = state.futures.list_contracts()?;

    Ok(Json(ContractListResponse { contracts }))
}

/// Get the settlement series for a contract
#[utoipa::path(
    get,
    path = "/api/v1/market/futures/{contract}",
    tag = "market",
    params(
        ("contract" = String, Path, description = "Contract code, e.g. BASE_Y-26"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Daily settlements", body = Vec<FuturesTick>),
        (status = 404, description = "Unknown contract", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_futures_series(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(contract): Path<String>,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<Vec<FuturesTick>>, ApiError> {
    let (from, to) = resolve_range(params.from.as_deref(), params.to.as_deref(), 180)?;

    let series = state.futures.get_series(&contract, from, to)?;
    if series.is_empty() {
        return Err(ApiError::NotFound(format!("contract {}", contract)));
    }

    Ok(Json(series))
}

/// SMA/RSI/ATR over a contract's settlement series
#[utoipa::path(
    get,
    path = "/api/v1/market/futures/{contract}/indicators",
    tag = "market",
    params(
        ("contract" = String, Path, description = "Contract code"),
        IndicatorQuery
    ),
    responses(
        (status = 200, description = "Indicator overlay", body = IndicatorSeriesResponse),
        (status = 404, description = "Unknown contract", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_futures_indicators(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(contract): Path<String>,
    Query(params): Query<IndicatorQuery>,
) -> Result<Json<IndicatorSeriesResponse>, ApiError> {
    let (from, to) = resolve_range(params.from.as_deref(), params.to.as_deref(), 180)?;
    let period = validate_period(params.period)?;

    let series = state.futures.get_series(&contract, from, to)?;
    if series.is_empty() {
        return Err(ApiError::NotFound(format!("contract {}", contract)));
    }

    let closes: Vec<Decimal> = series.iter().map(|t| t.settlement).collect();
    let highs: Vec<Option<Decimal>> = series.iter().map(|t| t.high_price).collect();
    let lows: Vec<Option<Decimal>> = series.iter().map(|t| t.low_price).collect();
    let dates: Vec<NaiveDate> = series.iter().map(|t| t.price_date).collect();

    Ok(Json(indicator_series(&dates, &closes, &highs, &lows, period)))
}

/// Latest settlement for a contract
#[utoipa::path(
    get,
    path = "/api/v1/market/futures/{contract}/latest",
    tag = "market",
    params(("contract" = String, Path, description = "Contract code")),
    responses(
        (status = 200, description = "Latest settlement", body = FuturesTick),
        (status = 404, description = "Unknown contract", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_latest_settlement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(contract): Path<String>,
) -> Result<Json<FuturesTick>, ApiError> {
    state
        .futures
        .get_latest(&contract)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("contract {}", contract)))
}

/// Calendar spread between two contracts
#[utoipa::path(
    get,
    path = "/api/v1/market/futures/spread",
    tag = "market",
    params(SpreadQuery),
    responses(
        (status = 200, description = "Date-aligned spread series", body = SpreadResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_futures_spread(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<SpreadQuery>,
) -> Result<Json<SpreadResponse>, ApiError> {
    if params.near == params.far {
        return Err(ApiError::BadRequest(
            "near and far must be different contracts".to_string(),
        ));
    }

    let (from, to) = resolve_range(params.from.as_deref(), params.to.as_deref(), 180)?;

    let near_series = state.futures.get_series(&params.near, from, to)?;
    let far_series = state.futures.get_series(&params.far, from, to)?;

    Ok(Json(SpreadResponse {
        near: params.near,
        far: params.far,
        points: calendar_spread(&near_series, &far_series),
    }))
}

/// Zip the indicator vectors into dated points
fn indicator_series(
    dates: &[NaiveDate],
    closes: &[Decimal],
    highs: &[Option<Decimal>],
    lows: &[Option<Decimal>],
    period: usize,
) -> IndicatorSeriesResponse {
    let sma = analytics::sma(closes, period);
    let rsi = analytics::rsi(closes, period);
    let atr = analytics::atr(highs, lows, closes, period);

    let points = dates
        .iter()
        .enumerate()
        .map(|(i, date)| IndicatorPoint {
            price_date: *date,
            close: closes[i],
            sma: sma[i],
            rsi: rsi[i],
            atr: atr[i],
        })
        .collect();

    IndicatorSeriesResponse { period, points }
}

fn validate_period(period: usize) -> Result<usize, ApiError> {
    if (2..=200).contains(&period) {
        Ok(period)
    } else {
        Err(ApiError::BadRequest(format!(
            "period {} out of range (2..=200)",
            period
        )))
    }
}

/// Parse optional from/to, defaulting to the trailing `default_days`
fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    default_days: i64,
) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let today = chrono::Utc::now().date_naive();

    let to = match to {
        Some(raw) => parse_date_param(raw, "to")?,
        None => today,
    };
    let from = match from {
        Some(raw) => parse_date_param(raw, "from")?,
        None => to - chrono::Duration::days(default_days),
    };

    if from > to {
        return Err(ApiError::BadRequest(format!(
            "'from' ({}) is after 'to' ({})",
            from, to
        )));
    }

    Ok((from, to))
}

fn parse_date_param(raw: &str, name: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid '{}' date: {}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolve_range_defaults() {
        let (from, to) = resolve_range(None, None, 7).unwrap();
        assert_eq!(to - from, chrono::Duration::days(7));
    }

    #[test]
    fn test_resolve_range_rejects_inverted() {
        let err = resolve_range(Some("2025-06-10"), Some("2025-06-01"), 7);
        assert!(err.is_err());
    }

    #[test]
    fn test_resolve_range_rejects_garbage() {
        assert!(resolve_range(Some("12/06/2025"), None, 7).is_err());
    }

    #[test]
    fn test_validate_period() {
        assert!(validate_period(14).is_ok());
        assert!(validate_period(1).is_err());
        assert!(validate_period(500).is_err());
    }

    #[test]
    fn test_indicator_series_alignment() {
        let dates: Vec<NaiveDate> = (1..=4)
            .map(|d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
            .collect();
        let closes = vec![dec!(1), dec!(2), dec!(3), dec!(4)];
        let none = vec![None; 4];

        let series = indicator_series(&dates, &closes, &none, &none, 2);

        assert_eq!(series.points.len(), 4);
        assert_eq!(series.points[0].sma, None);
        assert_eq!(series.points[1].sma, Some(dec!(1.5)));
        assert_eq!(series.points[3].close, dec!(4));
    }
}
