use std::sync::Arc;

use crate::clients::{
    AssistantClient, GeocodingClient, Mailer, RegistryClient, VisionClient,
};
use crate::config::AuthConfig;
use crate::database::repositories::{
    ChatRepository, EnergyPriceRepository, FuturesRepository, LeadRepository, UserRepository,
};
use crate::ingest::MailboxImporter;

/// Shared application state for all API handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub leads: Arc<dyn LeadRepository>,
    pub energy_prices: Arc<dyn EnergyPriceRepository>,
    pub futures: Arc<dyn FuturesRepository>,
    pub chat: Arc<dyn ChatRepository>,

    pub geocoding: Arc<GeocodingClient>,
    pub registry: Arc<RegistryClient>,
    pub vision: Arc<VisionClient>,
    pub assistant: Arc<AssistantClient>,

    /// None when the mailbox relay is not configured
    pub mailbox_importer: Option<Arc<MailboxImporter>>,

    /// None when SMTP is not configured
    pub mailer: Option<Arc<Mailer>>,

    pub auth: AuthConfig,
}
