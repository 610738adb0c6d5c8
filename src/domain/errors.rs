use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Validation { field: String, message: String },
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        DomainError::PermissionDenied(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_displays_message_only() {
        let err = DomainError::validation("quantity", "Ordered quantity is more than the stock.");
        assert_eq!(err.to_string(), "Ordered quantity is more than the stock.");
    }

    #[test]
    fn internal_display_is_prefixed() {
        assert_eq!(
            DomainError::Internal("boom".to_string()).to_string(),
            "Internal error: boom"
        );
    }
}
