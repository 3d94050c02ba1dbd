use thiserror::Error;

#[derive(Debug, Error)]
pub enum MagicError {
    #[error("No API key configured")]
    MissingCredential,
    #[error("Daily magic limit of {limit} creations reached")]
    QuotaExceeded { limit: u32 },
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User with this email already exists")]
    DuplicateEmail,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl MagicError {
    /// Message shown to the family when a wizard step fails.
    pub fn friendly_message(&self) -> String {
        match self {
            MagicError::MissingCredential => {
                "Connect your Gemini key in settings to start the magic!".to_string()
            }
            MagicError::QuotaExceeded { limit } => format!(
                "That's all the magic for today ({} creations). Come back tomorrow!",
                limit
            ),
            MagicError::Generation(_) => "The magic ink ran out! Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_generation_failure(&self) -> bool {
        matches!(self, MagicError::Generation(_))
    }
}

impl From<reqwest::Error> for MagicError {
    fn from(e: reqwest::Error) -> Self {
        MagicError::Generation(e.to_string())
    }
}

impl From<serde_json::Error> for MagicError {
    fn from(e: serde_json::Error) -> Self {
        MagicError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for MagicError {
    fn from(e: std::io::Error) -> Self {
        MagicError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MagicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_failures_hide_details() {
        let err = MagicError::Generation("HTTP 500: backend exploded".into());
        assert_eq!(err.friendly_message(), "The magic ink ran out! Please try again.");
        assert!(err.is_generation_failure());
    }

    #[test]
    fn quota_message_mentions_limit() {
        let err = MagicError::QuotaExceeded { limit: 3 };
        assert!(err.friendly_message().contains('3'));
        assert!(!err.is_generation_failure());
    }
}
