/// Outbound vendor integrations
///
/// Thin reqwest wrappers, one per vendor, each configured with a base
/// URL so tests can point them at a local mock.
pub mod assistant;
pub mod geocoding;
pub mod mailbox;
pub mod mailer;
pub mod registry;
pub mod vision;

pub use assistant::{AssistantClient, AssistantError, AssistantReply, WireMessage};
pub use geocoding::{GeocodedAddress, GeocodingClient, GeocodingError};
pub use mailbox::{MailboxClient, MailboxError, MailboxMessage};
pub use mailer::{Mailer, MailerError};
pub use registry::{RegistryClient, RegistryCompany, RegistryError};
pub use vision::{VisionClient, VisionError};
