use thiserror::Error;

use crate::openai::UpstreamError;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}
