use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry database could not be opened.
    #[error("Registry connect error: {0}")]
    Connect(#[source] rusqlite::Error),

    /// The task query (or schema setup) failed.
    #[error("Registry query error: {0}")]
    Query(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
