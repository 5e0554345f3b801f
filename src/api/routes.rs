use axum::routing::{delete, get, post, put};
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::assistant_handlers;
use super::import_handlers;
use super::lead_handlers;
use super::market_handlers;
use super::openapi::ApiDoc;
use super::route_handlers;
use super::state::AppState;
use super::user_handlers;

/// Create the API router with Swagger UI
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Health
        .route("/api/v1/health", get(user_handlers::health_check))
        // Auth & accounts
        .route("/api/v1/auth/session", post(user_handlers::create_session))
        .route("/api/v1/auth/me", get(user_handlers::me))
        .route(
            "/api/v1/users",
            get(user_handlers::list_users).post(user_handlers::create_user),
        )
        .route("/api/v1/users/:id", delete(user_handlers::delete_user))
        .route(
            "/api/v1/users/:id/active",
            put(user_handlers::set_user_active),
        )
        // Market analytics
        .route("/api/v1/market/rdn", get(market_handlers::get_rdn_prices))
        .route("/api/v1/market/rdn/daily", get(market_handlers::get_rdn_daily))
        .route(
            "/api/v1/market/rdn/indicators",
            get(market_handlers::get_rdn_indicators),
        )
        .route("/api/v1/market/futures", get(market_handlers::list_contracts))
        .route(
            "/api/v1/market/futures/spread",
            get(market_handlers::get_futures_spread),
        )
        .route(
            "/api/v1/market/futures/:contract",
            get(market_handlers::get_futures_series),
        )
        .route(
            "/api/v1/market/futures/:contract/latest",
            get(market_handlers::get_latest_settlement),
        )
        .route(
            "/api/v1/market/futures/:contract/indicators",
            get(market_handlers::get_futures_indicators),
        )
        // CRM
        .route(
            "/api/v1/leads",
            get(lead_handlers::list_leads).post(lead_handlers::create_lead),
        )
        .route("/api/v1/leads/pipeline", get(lead_handlers::get_pipeline))
        .route("/api/v1/leads/nearby", get(lead_handlers::nearby_leads))
        .route("/api/v1/leads/scan", post(lead_handlers::scan_lead))
        .route(
            "/api/v1/leads/:id",
            get(lead_handlers::get_lead)
                .put(lead_handlers::update_lead)
                .delete(lead_handlers::delete_lead),
        )
        .route(
            "/api/v1/leads/:id/status",
            put(lead_handlers::update_lead_status),
        )
        .route("/api/v1/leads/:id/enrich", post(lead_handlers::enrich_lead))
        // Route planner
        .route("/api/v1/routes/geocode", get(route_handlers::geocode))
        .route("/api/v1/routes/plan", post(route_handlers::plan_route))
        // Assistant
        .route("/api/v1/assistant/chat", post(assistant_handlers::chat))
        .route(
            "/api/v1/assistant/sessions",
            get(assistant_handlers::list_sessions),
        )
        .route(
            "/api/v1/assistant/sessions/:id",
            get(assistant_handlers::get_session).delete(assistant_handlers::delete_session),
        )
        // Imports
        .route("/api/v1/import/rdn", post(import_handlers::import_rdn))
        .route("/api/v1/import/futures", post(import_handlers::import_futures))
        .route("/api/v1/import/leads", post(import_handlers::import_leads))
        .route(
            "/api/v1/cron/mailbox-import",
            post(import_handlers::cron_mailbox_import),
        )
        .with_state(state)
}
