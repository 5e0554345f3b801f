use std::sync::Arc;

use energy_sales_api::api::{create_router, AppState};
use energy_sales_api::clients::{
    AssistantClient, GeocodingClient, Mailer, MailboxClient, RegistryClient, VisionClient,
};
use energy_sales_api::config::{
    AssistantConfig, AuthConfig, GeocodingConfig, MailboxConfig, RegistryConfig, SmtpConfig,
    VisionConfig,
};
use energy_sales_api::database::repositories::*;
use energy_sales_api::database::{establish_connection_pool, DatabasePool};
use energy_sales_api::ingest::MailboxImporter;
use energy_sales_api::jobs::MailboxImportJob;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "energy_sales_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Auth is mandatory; refuse to start half-configured
    let auth = match AuthConfig::from_env() {
        Some(auth) => auth,
        None => {
            tracing::error!("❌ SESSION_SECRET and CRON_SECRET must be set");
            std::process::exit(1);
        }
    };

    // The store is mandatory too: there is no degraded in-memory mode
    // for a CRM
    let pool = initialize_database();

    // Repositories share the pool through a connection-provider closure
    let pool_clone = pool.clone();
    let users = Arc::new(UserRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn UserRepository>;
    let pool_clone = pool.clone();
    let leads = Arc::new(LeadRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn LeadRepository>;
    let pool_clone = pool.clone();
    let energy_prices = Arc::new(EnergyPriceRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn EnergyPriceRepository>;
    let pool_clone = pool.clone();
    let futures = Arc::new(FuturesRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn FuturesRepository>;
    let pool_clone = pool.clone();
    let chat = Arc::new(ChatRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn ChatRepository>;

    // Vendor clients
    let geocoding = Arc::new(GeocodingClient::new(GeocodingConfig::from_env()));
    let registry = Arc::new(RegistryClient::new(RegistryConfig::from_env()));
    let vision = Arc::new(VisionClient::new(VisionConfig::from_env()));
    let assistant = Arc::new(AssistantClient::new(AssistantConfig::from_env()));

    let mailer = initialize_mailer();

    // Mailbox importer is optional: without MAILBOX_URL the cron
    // endpoint reports the relay as unconfigured
    let mailbox_config = MailboxConfig::from_env();
    let mailbox_importer = mailbox_config.as_ref().map(|config| {
        Arc::new(MailboxImporter::new(
            Arc::new(MailboxClient::new(config.clone())),
            energy_prices.clone(),
            futures.clone(),
            leads.clone(),
        ))
    });

    // In-process schedule alongside the external cron endpoint
    if let (Some(importer), Some(config)) = (&mailbox_importer, &mailbox_config) {
        initialize_cron_scheduler(importer.clone(), mailer.clone(), config.schedule.clone()).await;
    }

    let state = AppState {
        users,
        leads,
        energy_prices,
        futures,
        chat,
        geocoding,
        registry,
        vision,
        assistant,
        mailbox_importer,
        mailer,
        auth,
    };

    let app = create_router(state);

    // Define the address
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("❌ Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("🚀 Energy Sales API running on http://{}", addr);
    tracing::info!("📊 Health check: http://{}/api/v1/health", addr);
    tracing::info!("📚 Swagger UI: http://{}/swagger-ui", addr);

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

/// Establish the connection pool or exit
fn initialize_database() -> DatabasePool {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("❌ DATABASE_URL must be set");
            std::process::exit(1);
        }
    };

    let pool_size = std::env::var("DB_POOL_MAX_SIZE")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(20);

    tracing::info!("🗄️  Initializing PostgreSQL connection...");

    match establish_connection_pool(&database_url, pool_size) {
        Ok(pool) => {
            tracing::info!("✅ Database connection established");
            pool
        }
        Err(e) => {
            tracing::error!("❌ Failed to establish database connection: {}", e);
            std::process::exit(1);
        }
    }
}

/// Build the SMTP mailer when configured
fn initialize_mailer() -> Option<Arc<Mailer>> {
    let config = SmtpConfig::from_env()?;

    match Mailer::new(config) {
        Ok(mailer) => {
            tracing::info!("📧 SMTP mailer configured");
            Some(Arc::new(mailer))
        }
        Err(e) => {
            tracing::warn!("⚠️  SMTP misconfigured, report mail disabled: {}", e);
            None
        }
    }
}

/// Initialize cron scheduler for the mailbox import
async fn initialize_cron_scheduler(
    importer: Arc<MailboxImporter>,
    mailer: Option<Arc<Mailer>>,
    schedule: String,
) {
    use tokio_cron_scheduler::JobScheduler;

    tracing::info!("⏰ Initializing cron scheduler...");

    let scheduler = match JobScheduler::new().await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("❌ Failed to create cron scheduler: {}", e);
            return;
        }
    };

    let job = MailboxImportJob::new(importer, mailer, schedule);
    if let Err(e) = job.register(&scheduler).await {
        tracing::error!("❌ Failed to register mailbox import job: {}", e);
        return;
    }

    if let Err(e) = scheduler.start().await {
        tracing::error!("❌ Failed to start cron scheduler: {}", e);
        return;
    }

    tracing::info!("✅ Cron scheduler started");

    // Keep scheduler alive (it will run in the background)
    std::mem::forget(scheduler);
}
