use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("General path generator error: {0}")]
    General(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String), // 1001

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String), // 1003

    #[error("Invalid shape specified: {0}")]
    InvalidShape(String), // 1006

    #[error("Operation not supported: {0}")]
    OperationNotSupported(String), // 1008

    #[error("Pointer input failed: {0}")]
    PointerInput(String), // 1016

    #[error("Configuration error: {0}")]
    Config(String), // 1017

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PathError {
    pub fn code(&self) -> i32 {
        match self {
            PathError::General(_) => 1000,
            PathError::MethodNotFound(_) => 1001,
            PathError::InvalidParameter(_) => 1003,
            PathError::InvalidShape(_) => 1006,
            PathError::OperationNotSupported(_) => 1008,
            PathError::PointerInput(_) => 1016,
            PathError::Config(_) => 1017,
            PathError::IoError(_) => 1000,
            // Malformed params are a caller problem, same as a bad value
            PathError::JsonError(_) => 1003,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PathError::InvalidParameter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PathError>;
