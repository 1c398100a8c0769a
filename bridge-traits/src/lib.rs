//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host
//! application embedding the client core.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that is provided differently per platform (desktop test
//! harness, iOS, Android).
//!
//! ## Traits
//!
//! - [`AudioEngine`](engine::AudioEngine) - single-item audio playback
//!   primitive driven by the player session
//! - [`HttpClient`](http::HttpClient) - async HTTP with retry support, used by
//!   the auth and catalog clients
//! - [`SecureStore`](storage::SecureStore) - credential persistence
//!   (Keychain/Keystore)
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert native errors into it and keep messages
//! actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so adapters can be shared across
//! async tasks behind an `Arc`.

pub mod engine;
pub mod error;
pub mod http;
pub mod storage;

pub use error::{BridgeError, Result};

// Re-export commonly used types
pub use engine::{AudioEngine, EngineHandle, EngineNotification, EngineStatus};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::SecureStore;
