pub mod config;
pub mod controller;
pub mod error;
pub mod reply;
pub mod state;
pub mod transport;

// Re-export main types for convenience
pub use config::Config;
pub use controller::{ChatController, PendingRequest};
pub use error::{ConfigError, TransportError};
pub use reply::{MenuItem, Reply};
pub use state::{ChatMessage, ChatRole, Conversation, GREETING};
pub use transport::{BackendStatus, ChatTransport, HttpTransport, DEFAULT_BACKEND_URL};
