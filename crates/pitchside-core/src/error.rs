use thiserror::Error;

#[derive(Debug, Error)]
pub enum PitchsideError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket protocol error: {0}")]
    Protocol(String),

    #[error("Invalid subject id: {0}")]
    InvalidSubjectId(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

impl PitchsideError {
    /// Short error code string used in logs and diagnostics responses.
    pub fn code(&self) -> &'static str {
        match self {
            PitchsideError::Config(_) => "CONFIG_ERROR",
            PitchsideError::Protocol(_) => "PROTOCOL_ERROR",
            PitchsideError::InvalidSubjectId(_) => "INVALID_SUBJECT_ID",
            PitchsideError::Serialization(_) => "SERIALIZATION_ERROR",
            PitchsideError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
        }
    }
}

pub type Result<T> = std::result::Result<T, PitchsideError>;
