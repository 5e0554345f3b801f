use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::analytics::CalendarSpreadPoint;
use crate::database::enums::{LeadStatus, UserRole};
use crate::database::models::{ChatMessage, ChatSession, Lead, NewLead, User};
use crate::geo::LeadDistance;
use crate::ingest::{ImportOutcome, MailboxImportSummary};

/// Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

// ============================================================================
// Auth & users
// ============================================================================

/// Exchange an API key for a session token
#[derive(Debug, Deserialize, ToSchema)]
pub struct SessionRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// Account without the credential hash
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// The plaintext API key appears here and nowhere else
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub user: UserResponse,
    pub api_key: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

// ============================================================================
// Leads
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeadRequest {
    pub company_name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    #[schema(value_type = Option<String>, example = "1250.5")]
    pub annual_volume_mwh: Option<Decimal>,
    pub contract_end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: LeadStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadListResponse {
    pub leads: Vec<Lead>,
    pub count: usize,
}

/// Pipeline breakdown per status
#[derive(Debug, Serialize, ToSchema)]
pub struct PipelineResponse {
    pub counts: Vec<PipelineEntry>,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PipelineEntry {
    pub status: LeadStatus,
    pub count: i64,
}

/// Registry master data attached to an enriched lead
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistryInfo {
    pub name: String,
    pub address: Option<String>,
    pub activity_code: Option<String>,
    pub vat_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichResponse {
    pub lead: Lead,
    /// None when the registry has no entry for the tax id
    pub registry: Option<RegistryInfo>,
    /// Whether enrichment produced fresh coordinates
    pub geocoded: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    /// Base64-encoded image of a business card or letterhead
    pub image_base64: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanResponse {
    /// Draft lead, not persisted; submit through POST /leads after review
    pub draft: NewLead,
    pub raw_text: String,
}

// ============================================================================
// Route planner
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct GeocodeResponse {
    pub query: String,
    pub formatted: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoutePlanRequest {
    /// Addresses to visit, in order; each is geocoded
    pub waypoints: Vec<String>,

    /// Leads within this distance of the route are suggested
    #[serde(default = "default_corridor_km")]
    pub corridor_km: f64,
}

fn default_corridor_km() -> f64 {
    10.0
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteLeg {
    pub query: String,
    pub formatted: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoutePlanResponse {
    pub legs: Vec<RouteLeg>,
    pub total_km: f64,
    /// Geocoded leads inside the corridor, nearest first
    pub suggestions: Vec<LeadDistance>,
}

// ============================================================================
// Assistant
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Omit to start a new session
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub reply: String,
    /// Model that actually answered (fallback chain)
    pub model: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionListResponse {
    pub sessions: Vec<ChatSession>,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDetailResponse {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

// ============================================================================
// Market data
// ============================================================================

/// One point of the indicator overlay for a price series
#[derive(Debug, Serialize, ToSchema)]
pub struct IndicatorPoint {
    pub price_date: NaiveDate,

    /// Daily average (RDN) or settlement (futures)
    #[schema(value_type = String, example = "412.50")]
    pub close: Decimal,

    #[schema(value_type = Option<String>)]
    pub sma: Option<Decimal>,

    #[schema(value_type = Option<String>)]
    pub rsi: Option<Decimal>,

    #[schema(value_type = Option<String>)]
    pub atr: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndicatorSeriesResponse {
    pub period: usize,
    pub points: Vec<IndicatorPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractListResponse {
    pub contracts: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SpreadResponse {
    pub near: String,
    pub far: String,
    pub points: Vec<CalendarSpreadPoint>,
}

// ============================================================================
// Imports
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub outcome: ImportOutcome,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MailboxImportResponse {
    pub summary: MailboxImportSummary,
    /// Whether a report mail went out
    pub report_sent: bool,
}
