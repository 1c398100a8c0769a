//! # Catalog Module
//!
//! Typed client for the music catalog REST API: tracks, albums, artists, and
//! playlists. Responses are decoded into the models in [`models`], and tracks
//! convert into the [`TrackRef`](models::TrackRef) values the player session
//! consumes.
//!
//! Authentication is injected through the [`TokenSource`](client::TokenSource)
//! seam: every request carries the current bearer token, and a 401 response
//! invalidates the stored session before surfacing as
//! [`CatalogError::Unauthorized`].

pub mod client;
pub mod error;
pub mod models;
pub mod resources;

pub use client::{ApiClient, TokenSource};
pub use error::{CatalogError, Result};
pub use models::{Album, Artist, Playlist, PlaylistEntry, Track, TrackRef};
