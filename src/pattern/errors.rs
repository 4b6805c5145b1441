use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PatternError {
    #[error("invalid method pattern '{pattern}': {message}")]
    Malformed { pattern: String, message: String },

    #[error("invalid wildcard in method pattern '{pattern}': {source}")]
    Wildcard {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl PatternError {
    pub(crate) fn malformed(pattern: &str, message: impl Into<String>) -> Self {
        PatternError::Malformed {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
}
