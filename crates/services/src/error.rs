use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Email is not configured. Add the sender address and password in Settings.")]
    EmailNotConfigured,

    #[error("Invalid email address '{0}'")]
    Address(String),

    #[error("Authentication failed. Check the sender address and password (Gmail needs an App Password).")]
    EmailAuth,

    #[error("Failed to send email: {0}")]
    Email(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture screenshot: {0}")]
    Screenshot(String),
}

impl ServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ServiceError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
