use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Slots already booked: {conflicting:?}")]
    SlotConflict { conflicting: Vec<i32> },

    #[error("Guest booking limit reached: {current}/{max} today")]
    QuotaExceeded { current: u64, max: u64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_transient() {
        assert!(DomainError::Storage("connection reset".into()).is_transient());
        assert!(!DomainError::Validation("bad slots".into()).is_transient());
        assert!(!DomainError::SlotConflict { conflicting: vec![3] }.is_transient());
    }

    #[test]
    fn quota_message_carries_counts() {
        let e = DomainError::QuotaExceeded { current: 2, max: 2 };
        assert_eq!(e.to_string(), "Guest booking limit reached: 2/2 today");
    }
}
