pub mod chat;
pub mod energy_price;
pub mod futures_tick;
pub mod lead;
pub mod user;

pub use chat::{ChatMessage, ChatSession, NewChatMessage, NewChatSession};
pub use energy_price::{DailyAverage, EnergyPrice, NewEnergyPrice};
pub use futures_tick::{FuturesTick, NewFuturesTick};
pub use lead::{Lead, LeadChangeset, NewLead};
pub use user::{NewUser, User};
