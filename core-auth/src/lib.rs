//! # Authentication Module
//!
//! Client-side session against the REST API's JWT auth endpoints.
//!
//! ## Overview
//!
//! The backend issues a signed token on register/login; the client treats it
//! as opaque, persists it (plus the user profile) in the platform
//! [`SecureStore`](bridge_traits::SecureStore), and attaches it as a bearer
//! header to catalog requests. Signing out clears storage and emits
//! [`AuthEvent::SignedOut`](core_runtime::AuthEvent::SignedOut), which the
//! composition root turns into a player session reset.
//!
//! ## Features
//!
//! - Register / login / logout against `/api/auth/*`
//! - Session restore from secure storage at startup
//! - Auth state event emission
//! - Token invalidation when the API answers 401

pub mod error;
pub mod session;
pub mod types;

pub use error::{AuthError, Result};
pub use session::AuthSession;
pub use types::{AuthResponse, Credentials, UserProfile};
