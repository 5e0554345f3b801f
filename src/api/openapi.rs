use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::analytics::CalendarSpreadPoint;
use crate::api::responses::*;
use crate::api::{
    assistant_handlers, import_handlers, lead_handlers, market_handlers, route_handlers,
    user_handlers,
};
use crate::database::enums::{ChatRole, LeadSource, LeadStatus, UserRole};
use crate::database::models::{
    ChatMessage, ChatSession, DailyAverage, EnergyPrice, FuturesTick, Lead, LeadChangeset, NewLead,
};
use crate::geo::LeadDistance;
use crate::ingest::csv_import::ImportOutcome;
use crate::ingest::MailboxImportSummary;

/// OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Energy Sales API",
        version = "1.0.0",
        description = "Sales-operations backend for an energy retailer: market analytics, prospecting CRM, route planner, and AI assistant",
        license(
            name = "MIT"
        )
    ),
    paths(
        user_handlers::health_check,
        user_handlers::create_session,
        user_handlers::me,
        user_handlers::list_users,
        user_handlers::create_user,
        user_handlers::set_user_active,
        user_handlers::delete_user,
        market_handlers::get_rdn_prices,
        market_handlers::get_rdn_daily,
        market_handlers::get_rdn_indicators,
        market_handlers::list_contracts,
        market_handlers::get_futures_series,
        market_handlers::get_futures_indicators,
        market_handlers::get_latest_settlement,
        market_handlers::get_futures_spread,
        lead_handlers::list_leads,
        lead_handlers::create_lead,
        lead_handlers::get_lead,
        lead_handlers::update_lead,
        lead_handlers::update_lead_status,
        lead_handlers::delete_lead,
        lead_handlers::get_pipeline,
        lead_handlers::enrich_lead,
        lead_handlers::nearby_leads,
        lead_handlers::scan_lead,
        route_handlers::geocode,
        route_handlers::plan_route,
        assistant_handlers::chat,
        assistant_handlers::list_sessions,
        assistant_handlers::get_session,
        assistant_handlers::delete_session,
        import_handlers::import_rdn,
        import_handlers::import_futures,
        import_handlers::import_leads,
        import_handlers::cron_mailbox_import,
    ),
    components(
        schemas(
            ErrorResponse,
            SessionRequest,
            SessionResponse,
            UserResponse,
            CreateUserRequest,
            CreateUserResponse,
            SetActiveRequest,
            UserRole,
            Lead,
            NewLead,
            LeadChangeset,
            LeadStatus,
            LeadSource,
            CreateLeadRequest,
            StatusUpdateRequest,
            LeadListResponse,
            PipelineResponse,
            PipelineEntry,
            RegistryInfo,
            EnrichResponse,
            ScanRequest,
            ScanResponse,
            LeadDistance,
            GeocodeResponse,
            RoutePlanRequest,
            RouteLeg,
            RoutePlanResponse,
            ChatRequest,
            ChatResponse,
            ChatRole,
            ChatSession,
            ChatMessage,
            SessionListResponse,
            SessionDetailResponse,
            EnergyPrice,
            DailyAverage,
            FuturesTick,
            IndicatorPoint,
            IndicatorSeriesResponse,
            ContractListResponse,
            CalendarSpreadPoint,
            SpreadResponse,
            ImportOutcome,
            ImportResponse,
            MailboxImportSummary,
            MailboxImportResponse,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Session and identity endpoints"),
        (name = "users", description = "Account administration endpoints"),
        (name = "market", description = "RDN and futures analytics endpoints"),
        (name = "leads", description = "Prospecting CRM endpoints"),
        (name = "routes", description = "Field-route planner endpoints"),
        (name = "assistant", description = "AI sales assistant endpoints"),
        (name = "imports", description = "CSV and mailbox import endpoints"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme referenced by `security(("bearer" = []))`
pub struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}
