//! # Playback Session
//!
//! The playback core: queue, cursor, transport controls, and the engine
//! lifecycle behind them.
//!
//! ## Overview
//!
//! This module handles:
//! - Queue management (normalization on `play`, append, clear)
//! - Transport controls (play/pause/resume/next/previous/seek)
//! - Position polling against the bound audio engine
//! - Auto-advance on natural track completion
//! - Load-race discipline across rapid consecutive `play` calls

pub mod session;
pub mod state;

pub use session::PlayerSession;
pub use state::{LoadState, PlayerConfig, PlayerSnapshot};
