//! # Client Runtime
//!
//! Ambient infrastructure shared by the client core crates:
//! - typed event bus over `tokio::sync::broadcast` ([`events`])
//! - structured logging bootstrap on `tracing` ([`logging`])
//! - serde-based client configuration ([`config`])

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use events::{AuthEvent, ClientEvent, EventBus, PlayerEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
