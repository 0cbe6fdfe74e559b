use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntityScopeError {
    /// Pre-flight rejection: the run never starts and the message is meant
    /// for the user verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
