//! Native bridge adapters.
//!
//! Concrete implementations of the `bridge-traits` seams for hosts that run
//! on a regular OS: a reqwest-backed [`HttpClient`](bridge_traits::HttpClient)
//! and secure stores (in-memory for tests and development, OS keyring behind
//! the `secure-store` feature).
//!
//! There is deliberately no `AudioEngine` implementation here: the engine
//! wraps the host's media stack and is injected by the embedding application.

pub mod http;
pub mod secure_store;

pub use http::ReqwestHttpClient;
pub use secure_store::MemorySecureStore;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
