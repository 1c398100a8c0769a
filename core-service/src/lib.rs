//! # Client Core
//!
//! Composition root for the streaming client: wires the host-provided
//! bridge implementations (HTTP, secure storage, audio engine) into the
//! auth, catalog, and playback subsystems.
//!
//! Constructed explicitly and passed down by the host application; there
//! is no global instance.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use bridge_traits::{AudioEngine, HttpClient, SecureStore};
use core_auth::{AuthSession, UserProfile};
use core_catalog::{ApiClient, TokenSource};
use core_player::{PlayerConfig, PlayerSession};
use core_runtime::config::ClientConfig;
use core_runtime::events::{AuthEvent, ClientEvent, EventBus};

/// Host-provided implementations of the bridge seams.
pub struct ClientDependencies {
    pub http: Arc<dyn HttpClient>,
    pub secure_store: Arc<dyn SecureStore>,
    pub engine: Arc<dyn AudioEngine>,
}

/// Feeds the auth session's token into catalog requests, and routes 401
/// responses back into session invalidation.
struct SessionTokens {
    auth: Arc<AuthSession>,
}

#[async_trait]
impl TokenSource for SessionTokens {
    async fn token(&self) -> Option<String> {
        self.auth.token()
    }

    async fn handle_unauthorized(&self) {
        self.auth.handle_unauthorized().await;
    }
}

/// The assembled client: one instance per running application.
pub struct ClientCore {
    config: ClientConfig,
    events: EventBus,
    auth: Arc<AuthSession>,
    catalog: Arc<ApiClient>,
    player: Arc<PlayerSession>,
}

impl std::fmt::Debug for ClientCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ClientCore {
    /// Validate `config` and wire up all subsystems.
    pub fn new(config: ClientConfig, deps: ClientDependencies) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer);
        let auth = Arc::new(AuthSession::new(
            Arc::clone(&deps.http),
            Arc::clone(&deps.secure_store),
            events.clone(),
            config.api_base_url.clone(),
        ));
        let tokens: Arc<dyn TokenSource> = Arc::new(SessionTokens {
            auth: Arc::clone(&auth),
        });
        let catalog = Arc::new(ApiClient::with_timeout(
            Arc::clone(&deps.http),
            tokens,
            &config.api_base_url,
            config.http_timeout(),
        )?);
        let player = PlayerSession::new(
            Arc::clone(&deps.engine),
            events.clone(),
            PlayerConfig {
                tick_interval: config.ticker_interval(),
            },
        );
        spawn_signout_listener(&events, &player);

        info!(api_base_url = %config.api_base_url, "client core initialized");
        Ok(Self {
            config,
            events,
            auth,
            catalog,
            player,
        })
    }

    /// Restore a persisted auth session, if any. Call once at startup.
    pub async fn restore_session(&self) -> core_auth::Result<Option<UserProfile>> {
        self.auth.restore().await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    pub fn catalog(&self) -> &Arc<ApiClient> {
        &self.catalog
    }

    pub fn player(&self) -> &Arc<PlayerSession> {
        &self.player
    }
}

/// Sign-out (explicit logout or a 401 invalidation) tears playback down.
/// The task holds only a weak reference so dropping the core stops it.
fn spawn_signout_listener(events: &EventBus, player: &Arc<PlayerSession>) {
    let mut rx = events.subscribe();
    let weak: Weak<PlayerSession> = Arc::downgrade(player);
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ClientEvent::Auth(AuthEvent::SignedOut { .. })) => {
                    let Some(player) = weak.upgrade() else { break };
                    debug!("sign-out observed, resetting playback");
                    player.reset().await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "sign-out listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
