use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::auth::{AdminUser, AuthUser};
use super::error::ApiError;
use super::responses::*;
use super::state::AppState;
use crate::database::enums::{LeadSource, LeadStatus};
use crate::database::models::{Lead, LeadChangeset, NewLead};
use crate::geo::{self, GeoPoint};
use crate::ingest::csv_import::normalize_tax_id;
use crate::ingest::LeadDraftParser;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LeadListQuery {
    /// Filter by pipeline status
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

fn default_radius_km() -> f64 {
    25.0
}

/// List leads
#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "leads",
    params(LeadListQuery),
    responses(
        (status = 200, description = "Leads, newest first", body = LeadListResponse),
        (status = 400, description = "Invalid status filter", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_leads(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<LeadListQuery>,
) -> Result<Json<LeadListResponse>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|raw| {
            LeadStatus::from_str(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid status '{}'", raw)))
        })
        .transpose()?;

    let limit = params.limit.clamp(1, 1000);
    let leads = state.leads.list(status, limit, params.offset.max(0))?;
    let count = leads.len();

    Ok(Json(LeadListResponse { leads, count }))
}

/// Create a lead
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = Lead),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Duplicate tax id", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_lead(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    if request.company_name.trim().is_empty() {
        return Err(ApiError::BadRequest("company_name is required".to_string()));
    }

    let tax_id = request
        .tax_id
        .as_deref()
        .map(|raw| {
            normalize_tax_id(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid tax id '{}'", raw)))
        })
        .transpose()?;

    if let Some(tax_id) = &tax_id {
        if let Some(existing) = state.leads.find_by_tax_id(tax_id)? {
            return Err(ApiError::Conflict(format!(
                "lead {} already holds tax id {}",
                existing.id, tax_id
            )));
        }
    }

    let new_lead = NewLead {
        company_name: request.company_name.trim().to_string(),
        tax_id,
        email: request.email,
        phone: request.phone,
        street: request.street,
        city: request.city,
        postal_code: request.postal_code,
        lat: None,
        lon: None,
        status: LeadStatus::New,
        source: LeadSource::Manual,
        annual_volume_mwh: request.annual_volume_mwh,
        contract_end_date: request.contract_end_date,
        notes: request.notes,
        owner_id: Some(user.id),
    };

    let lead = state.leads.insert(new_lead).map_err(|e| {
        if e.is_unique_violation() {
            ApiError::Conflict("a lead with this tax id already exists".to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// Get a lead
#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead details", body = Lead),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_lead(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Lead>, ApiError> {
    state
        .leads
        .find_by_id(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))
}

/// Update a lead
#[utoipa::path(
    put,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead ID")),
    request_body = LeadChangeset,
    responses(
        (status = 200, description = "Updated lead", body = Lead),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_lead(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(changes): Json<LeadChangeset>,
) -> Result<Json<Lead>, ApiError> {
    ensure_lead_exists(&state, id)?;

    Ok(Json(state.leads.update(id, changes)?))
}

/// Move a lead through the pipeline
#[utoipa::path(
    put,
    path = "/api/v1/leads/{id}/status",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated lead", body = Lead),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_lead_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Lead>, ApiError> {
    ensure_lead_exists(&state, id)?;

    Ok(Json(state.leads.set_status(id, request.status)?))
}

/// Delete a lead (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead ID")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_lead(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.leads.delete(id)? == 0 {
        return Err(ApiError::NotFound(format!("lead {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Pipeline counts per status
#[utoipa::path(
    get,
    path = "/api/v1/leads/pipeline",
    tag = "leads",
    responses(
        (status = 200, description = "Counts per status", body = PipelineResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_pipeline(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<PipelineResponse>, ApiError> {
    let counts: Vec<PipelineEntry> = state
        .leads
        .count_by_status()?
        .into_iter()
        .map(|(status, count)| PipelineEntry { status, count })
        .collect();
    let total = counts.iter().map(|entry| entry.count).sum();

    Ok(Json(PipelineResponse { counts, total }))
}

/// Enrich a lead from the statistical registry, then geocode it
///
/// Registry fields only fill gaps; data a rep typed in wins. A registry
/// miss is a 404, a vendor outage is a 502.
#[utoipa::path(
    post,
    path = "/api/v1/leads/{id}/enrich",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Enriched lead", body = EnrichResponse),
        (status = 400, description = "Lead has no tax id", body = ErrorResponse),
        (status = 404, description = "Lead or registry entry not found", body = ErrorResponse),
        (status = 502, description = "Vendor failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn enrich_lead(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<EnrichResponse>, ApiError> {
    let lead = state
        .leads
        .find_by_id(id)?
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))?;

    let tax_id = lead
        .tax_id
        .clone()
        .ok_or_else(|| ApiError::BadRequest("lead has no tax id to enrich from".to_string()))?;

    let company = state
        .registry
        .lookup(&tax_id)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("registry entry for tax id {}", tax_id)))?;

    let changes = LeadChangeset {
        street: lead.street.clone().or_else(|| company.address.clone()),
        ..Default::default()
    };
    let mut lead = state.leads.update(id, changes)?;

    // Geocoding failure downgrades to an un-geocoded enrichment
    let mut geocoded = false;
    if let Some(query) = lead.address_line() {
        match state.geocoding.geocode(&query).await {
            Ok(Some(address)) => {
                lead = state
                    .leads
                    .set_coordinates(id, address.point.lat, address.point.lon)?;
                geocoded = true;
            }
            Ok(None) => {
                tracing::warn!("No geocoding candidate for lead {}: '{}'", id, query);
            }
            Err(e) => {
                tracing::warn!("Geocoding failed for lead {}: {}", id, e);
            }
        }
    }

    Ok(Json(EnrichResponse {
        lead,
        registry: Some(RegistryInfo {
            name: company.name,
            address: company.address,
            activity_code: company.activity_code,
            vat_active: company.vat_active,
        }),
        geocoded,
    }))
}

/// Geocoded leads within a radius of a point
#[utoipa::path(
    get,
    path = "/api/v1/leads/nearby",
    tag = "leads",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Leads nearest first", body = Vec<LeadDistance>),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn nearby_leads(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<NearbyQuery>,
) -> Result<Json<Vec<geo::LeadDistance>>, ApiError> {
    let center = GeoPoint::new(params.lat, params.lon)
        .ok_or_else(|| ApiError::BadRequest("coordinates out of range".to_string()))?;

    if !(params.radius_km > 0.0 && params.radius_km <= 500.0) {
        return Err(ApiError::BadRequest(
            "radius_km must be in (0, 500]".to_string(),
        ));
    }

    let candidates = state.leads.with_coordinates()?;

    Ok(Json(geo::leads_within_radius(
        candidates,
        center,
        params.radius_km,
    )))
}

/// OCR a business card or letterhead into a draft lead
///
/// The draft is not persisted; the UI submits the reviewed draft through
/// POST /leads.
#[utoipa::path(
    post,
    path = "/api/v1/leads/scan",
    tag = "leads",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Draft lead", body = ScanResponse),
        (status = 400, description = "Nothing usable recognised", body = ErrorResponse),
        (status = 502, description = "OCR vendor failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn scan_lead(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    if request.image_base64.is_empty() {
        return Err(ApiError::BadRequest("image_base64 is required".to_string()));
    }

    let raw_text = state
        .vision
        .extract_text(&request.image_base64)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let draft = LeadDraftParser::new()
        .parse(&raw_text)
        .ok_or_else(|| ApiError::BadRequest("no usable text recognised".to_string()))?;

    Ok(Json(ScanResponse { draft, raw_text }))
}

fn ensure_lead_exists(state: &AppState, id: i64) -> Result<(), ApiError> {
    state
        .leads
        .find_by_id(id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))
}
