use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error(transparent)]
    Config(#[from] core_runtime::Error),

    #[error(transparent)]
    Auth(#[from] core_auth::AuthError),

    #[error(transparent)]
    Catalog(#[from] core_catalog::CatalogError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
