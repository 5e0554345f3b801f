use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use super::auth::{AuthUser, CronGuard};
use super::error::ApiError;
use super::responses::*;
use super::state::AppState;
use crate::database::enums::LeadSource;
use crate::ingest::csv_import::{
    decode_csv_bytes, parse_futures_csv, parse_leads_csv, parse_rdn_csv,
};
use crate::ingest::ImportOutcome;

/// Upload an hourly RDN CSV
#[utoipa::path(
    post,
    path = "/api/v1/import/rdn",
    tag = "imports",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import outcome", body = ImportResponse),
        (status = 400, description = "Unparseable upload", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn import_rdn(
    State(state): State<AppState>,
    _auth: AuthUser,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let text = decode_csv_bytes(&body);
    let (ticks, errors) =
        parse_rdn_csv(&text).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let attempted = ticks.len();
    let imported = state.energy_prices.upsert_batch(ticks)?;

    Ok(Json(ImportResponse {
        outcome: ImportOutcome {
            imported,
            skipped: attempted - imported,
            errors,
        },
    }))
}

/// Upload a futures settlement CSV
#[utoipa::path(
    post,
    path = "/api/v1/import/futures",
    tag = "imports",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import outcome", body = ImportResponse),
        (status = 400, description = "Unparseable upload", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn import_futures(
    State(state): State<AppState>,
    _auth: AuthUser,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let text = decode_csv_bytes(&body);
    let (ticks, errors) =
        parse_futures_csv(&text).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let attempted = ticks.len();
    let imported = state.futures.upsert_batch(ticks)?;

    Ok(Json(ImportResponse {
        outcome: ImportOutcome {
            imported,
            skipped: attempted - imported,
            errors,
        },
    }))
}

/// Upload a lead-list CSV
#[utoipa::path(
    post,
    path = "/api/v1/import/leads",
    tag = "imports",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import outcome", body = ImportResponse),
        (status = 400, description = "Unparseable upload", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn import_leads(
    State(state): State<AppState>,
    _auth: AuthUser,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let text = decode_csv_bytes(&body);
    let (leads, errors) = parse_leads_csv(&text, LeadSource::Csv)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let attempted = leads.len();
    let imported = state.leads.upsert_batch(leads)?;

    Ok(Json(ImportResponse {
        outcome: ImportOutcome {
            imported,
            skipped: attempted - imported,
            errors,
        },
    }))
}

/// Cron-triggered mailbox import
///
/// Guarded by the cron shared secret, not a user credential; the hosting
/// scheduler hits this endpoint. The same pipeline also runs on the
/// in-process schedule.
#[utoipa::path(
    post,
    path = "/api/v1/cron/mailbox-import",
    tag = "imports",
    responses(
        (status = 200, description = "Poll summary", body = MailboxImportResponse),
        (status = 401, description = "Bad cron secret", body = ErrorResponse),
        (status = 503, description = "Mailbox relay not configured", body = ErrorResponse),
        (status = 502, description = "Mailbox relay failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn cron_mailbox_import(
    State(state): State<AppState>,
    _cron: CronGuard,
) -> Result<Json<MailboxImportResponse>, ApiError> {
    let importer = state
        .mailbox_importer
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("mailbox relay not configured".to_string()))?;

    let summary = importer
        .run()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let mut report_sent = false;
    if summary.attachments_processed > 0 {
        if let Some(mailer) = &state.mailer {
            match mailer
                .send_report("Mailbox import report", summary.report_body())
                .await
            {
                Ok(()) => report_sent = true,
                Err(e) => tracing::warn!("Report mail failed: {}", e),
            }
        }
    }

    Ok(Json(MailboxImportResponse {
        summary,
        report_sent,
    }))
}
