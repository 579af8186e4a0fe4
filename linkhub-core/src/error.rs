use thiserror::Error;

/// Error taxonomy shared by the server and the stores.
///
/// The HTTP layer maps each variant onto a status code; see
/// `linkhub_server::http`.
#[derive(Error, Debug)]
pub enum LinkHubError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
