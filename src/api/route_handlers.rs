use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::auth::AuthUser;
use super::error::ApiError;
use super::responses::*;
use super::state::AppState;
use crate::geo;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct GeocodeQuery {
    /// Free-form address
    pub q: String,
}

/// Forward-geocode an address
#[utoipa::path(
    get,
    path = "/api/v1/routes/geocode",
    tag = "routes",
    params(GeocodeQuery),
    responses(
        (status = 200, description = "Best candidate", body = GeocodeResponse),
        (status = 404, description = "No candidate found", body = ErrorResponse),
        (status = 502, description = "Vendor failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn geocode(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    if params.q.trim().is_empty() {
        return Err(ApiError::BadRequest("query 'q' is required".to_string()));
    }

    let address = state
        .geocoding
        .geocode(&params.q)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("no candidate for '{}'", params.q)))?;

    Ok(Json(GeocodeResponse {
        query: params.q,
        formatted: address.formatted,
        lat: address.point.lat,
        lon: address.point.lon,
    }))
}

/// Plan a field-visit route
///
/// Each waypoint address is geocoded in order; the response carries the
/// resolved legs, the total great-circle length, and geocoded leads
/// inside the corridor as visit suggestions.
#[utoipa::path(
    post,
    path = "/api/v1/routes/plan",
    tag = "routes",
    request_body = RoutePlanRequest,
    responses(
        (status = 200, description = "Planned route", body = RoutePlanResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "A waypoint could not be resolved", body = ErrorResponse),
        (status = 502, description = "Vendor failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn plan_route(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(request): Json<RoutePlanRequest>,
) -> Result<Json<RoutePlanResponse>, ApiError> {
    if request.waypoints.len() < 2 {
        return Err(ApiError::BadRequest(
            "at least two waypoints are required".to_string(),
        ));
    }
    if !(request.corridor_km > 0.0 && request.corridor_km <= 100.0) {
        return Err(ApiError::BadRequest(
            "corridor_km must be in (0, 100]".to_string(),
        ));
    }

    let mut legs = Vec::with_capacity(request.waypoints.len());
    let mut points = Vec::with_capacity(request.waypoints.len());

    for waypoint in &request.waypoints {
        let address = state
            .geocoding
            .geocode(waypoint)
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?
            .ok_or_else(|| ApiError::NotFound(format!("no candidate for '{}'", waypoint)))?;

        points.push(address.point);
        legs.push(RouteLeg {
            query: waypoint.clone(),
            formatted: address.formatted,
            lat: address.point.lat,
            lon: address.point.lon,
        });
    }

    let total_km = geo::route_length_km(&points);

    let candidates = state.leads.with_coordinates()?;
    let suggestions = geo::leads_near_route(candidates, &points, request.corridor_km);

    tracing::info!(
        "Planned route with {} waypoints, {:.1} km, {} suggestions",
        legs.len(),
        total_km,
        suggestions.len()
    );

    Ok(Json(RoutePlanResponse {
        legs,
        total_km,
        suggestions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_plan_request_defaults() {
        let request: RoutePlanRequest =
            serde_json::from_str(r#"{"waypoints": ["Warszawa", "Radom"]}"#).unwrap();
        assert_eq!(request.corridor_km, 10.0);
    }
}
