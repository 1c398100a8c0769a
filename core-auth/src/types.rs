//! Auth wire and state types.

use serde::{Deserialize, Serialize};

/// Authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Successful response from `/api/auth/login` and `/api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Error envelope the backend wraps failures in: `{ "error": { ... } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
    #[allow(dead_code)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_decodes_backend_payload() {
        let json = r#"{
            "token": "eyJhbGciOi.fake.jwt",
            "user": { "id": "u-1", "email": "ana@example.com", "name": "Ana" }
        }"#;

        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token, "eyJhbGciOi.fake.jwt");
        assert_eq!(response.user.name, "Ana");
    }

    #[test]
    fn error_envelope_decodes() {
        let json = r#"{ "error": { "code": "UNAUTHORIZED", "message": "Invalid credentials" } }"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.message, "Invalid credentials");
    }
}
