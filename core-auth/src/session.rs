//! Authentication session.
//!
//! Owns the in-memory auth state (token + user profile), keeps it in sync
//! with the platform secure store, and emits auth events on every state
//! transition.

use crate::error::{AuthError, Result};
use crate::types::{ApiErrorEnvelope, AuthResponse, Credentials, RegisterRequest, UserProfile};
use bridge_traits::{
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
    storage::SecureStore,
};
use core_runtime::events::{AuthEvent, ClientEvent, EventBus};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

const TOKEN_KEY: &str = "auth_token";
const USER_KEY: &str = "auth_user";

struct ActiveSession {
    token: String,
    user: UserProfile,
}

/// Client authentication session.
///
/// One instance lives for the process lifetime, owned by the composition
/// root and shared behind an `Arc`.
pub struct AuthSession {
    http: Arc<dyn HttpClient>,
    store: Arc<dyn SecureStore>,
    events: EventBus,
    base_url: String,
    state: RwLock<Option<ActiveSession>>,
}

impl AuthSession {
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<dyn SecureStore>,
        events: EventBus,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            store,
            events,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            state: RwLock::new(None),
        }
    }

    /// Register a new account and establish a session.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<UserProfile> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}/api/auth/register", self.base_url),
        )
        .json(&body)?;

        // Registration is not idempotent; never retry it.
        let response = self
            .http
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await?;
        self.establish(response, "register").await
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}/api/auth/login", self.base_url),
        )
        .json(&body)?;

        // A retried login would hammer the credential endpoint on a flaky
        // network and can trip lockout throttling; one attempt only.
        let response = self
            .http
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await?;
        self.establish(response, "login").await
    }

    /// Restore a persisted session from secure storage, if one exists.
    ///
    /// Corrupted stored data is treated as "no session" after clearing it,
    /// so a bad write can never wedge startup.
    pub async fn restore(&self) -> Result<Option<UserProfile>> {
        let token = self
            .store
            .get_secret(TOKEN_KEY)
            .await
            .map_err(|e| AuthError::SecureStorage(e.to_string()))?;
        let user = self
            .store
            .get_secret(USER_KEY)
            .await
            .map_err(|e| AuthError::SecureStorage(e.to_string()))?;

        let (Some(token), Some(user)) = (token, user) else {
            debug!("no persisted auth session");
            return Ok(None);
        };

        let token = match String::from_utf8(token) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "persisted token is not valid UTF-8, discarding");
                self.wipe_storage().await;
                return Ok(None);
            }
        };
        let user: UserProfile = match serde_json::from_slice(&user) {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "persisted user profile is corrupted, discarding");
                self.wipe_storage().await;
                return Ok(None);
            }
        };

        info!(user_id = %user.id, "restored persisted auth session");
        *self.state.write() = Some(ActiveSession {
            token,
            user: user.clone(),
        });
        self.events.emit(ClientEvent::Auth(AuthEvent::SessionRestored {
            user_id: user.id.clone(),
        }));
        Ok(Some(user))
    }

    /// Sign out: clear storage and in-memory state, emit `SignedOut`.
    ///
    /// The in-memory state is always cleared and the event always emitted;
    /// a storage failure is reported but does not keep the session alive.
    pub async fn logout(&self) -> Result<()> {
        let user_id = self.state.write().take().map(|s| s.user.id);
        let storage_result = self.wipe_storage_checked().await;

        info!(user_id = ?user_id, "signed out");
        self.events
            .emit(ClientEvent::Auth(AuthEvent::SignedOut { user_id }));
        storage_result
    }

    /// Invalidate the session after the API rejected the token (401).
    ///
    /// Same effect as [`logout`](Self::logout), but storage failures are
    /// only logged: the caller is already on an error path.
    pub async fn handle_unauthorized(&self) {
        let user_id = self.state.write().take().map(|s| s.user.id);
        if user_id.is_some() {
            warn!("stored token rejected by API, invalidating session");
        }
        self.wipe_storage().await;
        self.events
            .emit(ClientEvent::Auth(AuthEvent::SignedOut { user_id }));
    }

    /// Current bearer token, when authenticated.
    pub fn token(&self) -> Option<String> {
        self.state.read().as_ref().map(|s| s.token.clone())
    }

    /// Currently authenticated user, if any.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.read().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_some()
    }

    async fn establish(&self, response: HttpResponse, operation: &str) -> Result<UserProfile> {
        if !response.is_success() {
            let error = map_api_error(&response);
            self.events.emit(ClientEvent::Auth(AuthEvent::AuthFailed {
                message: error.to_string(),
            }));
            return Err(error);
        }

        let auth: AuthResponse = response
            .json()
            .map_err(|e| AuthError::CorruptSession(e.to_string()))?;

        self.store
            .set_secret(TOKEN_KEY, auth.token.as_bytes())
            .await
            .map_err(|e| AuthError::SecureStorage(e.to_string()))?;
        let user_json = serde_json::to_vec(&auth.user)
            .map_err(|e| AuthError::CorruptSession(e.to_string()))?;
        self.store
            .set_secret(USER_KEY, &user_json)
            .await
            .map_err(|e| AuthError::SecureStorage(e.to_string()))?;

        info!(user_id = %auth.user.id, operation, "authenticated");
        *self.state.write() = Some(ActiveSession {
            token: auth.token,
            user: auth.user.clone(),
        });
        self.events.emit(ClientEvent::Auth(AuthEvent::SignedIn {
            user_id: auth.user.id.clone(),
        }));
        Ok(auth.user)
    }

    async fn wipe_storage(&self) {
        if let Err(e) = self.wipe_storage_checked().await {
            warn!(error = %e, "failed to clear persisted auth session");
        }
    }

    async fn wipe_storage_checked(&self) -> Result<()> {
        let token = self.store.delete_secret(TOKEN_KEY).await;
        let user = self.store.delete_secret(USER_KEY).await;
        token
            .and(user)
            .map_err(|e| AuthError::SecureStorage(e.to_string()))
    }
}

fn map_api_error(response: &HttpResponse) -> AuthError {
    let message = response
        .json::<ApiErrorEnvelope>()
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", response.status));

    match response.status {
        401 => AuthError::InvalidCredentials,
        409 => AuthError::EmailTaken,
        status => AuthError::Api { status, message },
    }
}
