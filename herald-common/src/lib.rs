pub mod contact;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod message;
pub mod mime;
pub mod retry;

pub use tracing;

pub use contact::{ContactAddress, Protocol};
pub use delivery::{DeliveryResult, DeliveryState, Undelivered};
pub use message::{Message, MessageBuilder, RecipientRole};
pub use retry::RetryOrchestrator;
