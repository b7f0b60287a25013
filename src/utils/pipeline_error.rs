use thiserror::Error;

/// Fatal pipeline failures. There is no retry layer; the first error aborts
/// the run and maps to a distinct process exit code.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed upstream response: {0}")]
    Decode(String),

    #[error("invalid coordinate: {0}")]
    Coordinate(String),

    #[error("artifact write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Transport(_) => 2,
            PipelineError::Decode(_) => 3,
            PipelineError::Coordinate(_) => 4,
            PipelineError::Io(_) | PipelineError::Serialize(_) => 5,
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PipelineError::Decode(err.to_string())
        } else {
            PipelineError::Transport(err)
        }
    }
}
