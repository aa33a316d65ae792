use thiserror::Error;

/// Error taxonomy shared by every component.
///
/// The first four variants are the business taxonomy: a call that returns one of them
/// aborted before touching any state. The remaining variants belong to the ambient
/// surface (config files, serialization, the sequencer queue).
#[derive(Debug, Error)]
pub enum SuretyError {
    /// The caller lacks the role or status the operation requires.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// The operation is invalid for the current state of the entity
    /// (double claim, resolved request, redundant toggle, duplicate record).
    #[error("State error: {0}")]
    State(String),

    /// Insufficient funds, wrong fee or premium over cap.
    #[error("Resource error: {0}")]
    Resource(String),

    /// The operational switch is off.
    #[error("System unavailable: {0}")]
    Availability(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The sequencer stopped or dropped the reply channel.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    State,
    Resource,
    Availability,
    Config,
    Serialization,
    Io,
    Runtime,
}

impl SuretyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuretyError::Authorization(_) => ErrorKind::Authorization,
            SuretyError::State(_) => ErrorKind::State,
            SuretyError::Resource(_) => ErrorKind::Resource,
            SuretyError::Availability(_) => ErrorKind::Availability,
            SuretyError::Config(_) => ErrorKind::Config,
            SuretyError::Serialization(_) => ErrorKind::Serialization,
            SuretyError::Io(_) => ErrorKind::Io,
            SuretyError::Runtime(_) => ErrorKind::Runtime,
        }
    }
}

pub type Result<T> = std::result::Result<T, SuretyError>;
