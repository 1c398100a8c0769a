use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Not authenticated or token rejected")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Catalog API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode API response: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
