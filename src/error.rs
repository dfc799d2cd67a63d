use thiserror::Error;

/// Stage of the translation pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    TranslationApi,
    NotFound,
    SingletonViolation,
    Platform,
}

/// Errors raised while translating knowledge articles.
///
/// Every component except the settings lookup propagates these unchanged,
/// so the kind survives up to the orchestrators and into the logs.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Token exchange with the authentication endpoint failed
    #[error("translator authentication failed: {0}")]
    Auth(String),

    /// Translation request failed, or its response could not be read
    #[error("translator request failed: {0}")]
    TranslationApi(String),

    /// A referenced record or resource is missing
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// A second translation settings record was about to be created
    #[error("{0}")]
    SingletonViolation(String),

    /// The data store reported a fault
    #[error("data store fault: {0}")]
    Platform(String),
}

impl TranslationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslationError::Auth(_) => ErrorKind::Auth,
            TranslationError::TranslationApi(_) => ErrorKind::TranslationApi,
            TranslationError::NotFound { .. } => ErrorKind::NotFound,
            TranslationError::SingletonViolation(_) => ErrorKind::SingletonViolation,
            TranslationError::Platform(_) => ErrorKind::Platform,
        }
    }

    pub(crate) fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        TranslationError::NotFound {
            what,
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for TranslationError {
    fn from(err: sqlx::Error) -> Self {
        TranslationError::Platform(err.to_string())
    }
}

pub type TranslationResult<T> = Result<T, TranslationError>;

/// What the host sees when an operation fails: the message only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFault {
    pub message: String,
}

impl From<&TranslationError> for HostFault {
    fn from(err: &TranslationError) -> Self {
        HostFault {
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for HostFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostFault {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(TranslationError::Auth("x".into()).kind(), ErrorKind::Auth);
        assert_eq!(
            TranslationError::TranslationApi("x".into()).kind(),
            ErrorKind::TranslationApi
        );
        assert_eq!(
            TranslationError::not_found("article", "a1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TranslationError::SingletonViolation("x".into()).kind(),
            ErrorKind::SingletonViolation
        );
        assert_eq!(TranslationError::Platform("x".into()).kind(), ErrorKind::Platform);
    }

    #[test]
    fn test_not_found_message() {
        let err = TranslationError::not_found("language locale", "loc-9");
        assert_eq!(err.to_string(), "language locale not found: loc-9");
    }

    #[test]
    fn test_singleton_violation_message_is_verbatim() {
        let err = TranslationError::SingletonViolation("Only one allowed".to_string());
        assert_eq!(err.to_string(), "Only one allowed");
    }

    #[test]
    fn test_host_fault_keeps_message_only() {
        let err = TranslationError::Auth("401 Unauthorized".to_string());
        let fault = HostFault::from(&err);
        assert_eq!(fault.message, "translator authentication failed: 401 Unauthorized");
        assert_eq!(fault.to_string(), fault.message);
    }
}
