/// Repository pattern implementations
///
/// - Traits define the contracts the handlers depend on
/// - `Impl` structs run synchronous diesel queries behind a connection
///   provider closure
pub mod chat_repository;
pub mod energy_price_repository;
pub mod futures_repository;
pub mod lead_repository;
pub mod user_repository;

pub use chat_repository::{ChatRepository, ChatRepositoryImpl};
pub use energy_price_repository::{EnergyPriceRepository, EnergyPriceRepositoryImpl};
pub use futures_repository::{FuturesRepository, FuturesRepositoryImpl};
pub use lead_repository::{LeadRepository, LeadRepositoryImpl};
pub use user_repository::{UserRepository, UserRepositoryImpl};
