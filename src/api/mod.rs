pub mod assistant_handlers;
pub mod auth;
pub mod error;
pub mod import_handlers;
pub mod lead_handlers;
pub mod market_handlers;
pub mod openapi;
pub mod responses;
pub mod route_handlers;
pub mod routes;
pub mod state;
pub mod user_handlers;

pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
