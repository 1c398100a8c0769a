use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Auth API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Secure storage unavailable: {0}")]
    SecureStorage(String),

    #[error("Stored session is corrupted: {0}")]
    CorruptSession(String),

    #[error("Transport error: {0}")]
    Transport(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
