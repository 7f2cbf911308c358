use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("prompt error: {0}")]
    Prompt(#[from] devarch_pm::PmError),

    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid project config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("diagram rendering failed: {0}")]
    Diagram(String),

    #[error("nothing to continue: generate an answer first")]
    NothingToContinue,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
