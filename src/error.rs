use reqwest::StatusCode;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Watchlist store is not configured")]
    StoreUnavailable,

    #[error("Authentication required")]
    AuthRequired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an upstream error from a non-success status and the raw response body
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Message shown to the user when this error reaches the coordinator boundary
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => {
                "Network problem. Check your connection and try again.".to_string()
            }
            AppError::Upstream { message, .. } if !message.is_empty() => message.clone(),
            AppError::Upstream { .. } => "The service is unavailable right now.".to_string(),
            AppError::StoreUnavailable => "Watchlist sync is not available.".to_string(),
            AppError::AuthRequired => "Please sign in to manage your watchlist.".to_string(),
            AppError::Config(msg) => msg.clone(),
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Decode(_) => "Received an unexpected response.".to_string(),
            AppError::Cache(_) => "Local watchlist storage failed.".to_string(),
            AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Configuration errors cannot be recovered from by retrying
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
