//! Store error types
//!
//! Error codes:
//! - SEGSTORE_INTERRUPTED (WARN severity, retryable)
//! - SEGSTORE_RESOURCE_EXHAUSTED (ERROR severity)
//! - SEGSTORE_TRANSFER_FAULT (ERROR severity)
//! - SEGSTORE_INVALID_CONFIG (ERROR severity)
//!
//! Every error is scoped to the call that raised it. None of them leaves the
//! store unusable.

use std::fmt;

use crate::chain::ChainError;
use crate::observability::Severity;

use super::transfer::TransferFault;

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Caller was interrupted while waiting for exclusive access
    SegstoreInterrupted,
    /// Segment table or block allocation failed
    SegstoreResourceExhausted,
    /// Copy across the caller boundary failed
    SegstoreTransferFault,
    /// Block size or blocks per segment rejected
    SegstoreInvalidConfig,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::SegstoreInterrupted => "SEGSTORE_INTERRUPTED",
            StoreErrorCode::SegstoreResourceExhausted => "SEGSTORE_RESOURCE_EXHAUSTED",
            StoreErrorCode::SegstoreTransferFault => "SEGSTORE_TRANSFER_FAULT",
            StoreErrorCode::SegstoreInvalidConfig => "SEGSTORE_INVALID_CONFIG",
        }
    }

    /// Returns the severity this error is logged at
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::SegstoreInterrupted => Severity::Warn,
            _ => Severity::Error,
        }
    }

    /// Returns whether the caller may simply retry the same call
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreErrorCode::SegstoreInterrupted)
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error type with context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    details: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl StoreError {
    /// Acquisition of exclusive access was abandoned
    pub fn interrupted(operation: &str) -> Self {
        Self {
            code: StoreErrorCode::SegstoreInterrupted,
            message: format!("{} interrupted while waiting for exclusive access", operation),
            details: None,
            source: None,
        }
    }

    /// Allocation failed inside the chain
    pub fn resource_exhausted(offset: u64, source: ChainError) -> Self {
        Self {
            code: StoreErrorCode::SegstoreResourceExhausted,
            message: source.to_string(),
            details: Some(format!("offset: {}", offset)),
            source: Some(Box::new(source)),
        }
    }

    /// The transfer primitive rejected the copy
    pub fn transfer_fault(offset: u64, source: TransferFault) -> Self {
        Self {
            code: StoreErrorCode::SegstoreTransferFault,
            message: source.to_string(),
            details: Some(format!("offset: {}", offset)),
            source: Some(Box::new(source)),
        }
    }

    /// Configuration was rejected
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::SegstoreInvalidConfig,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Configuration could not be read or parsed
    pub fn invalid_config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code: StoreErrorCode::SegstoreInvalidConfig,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the same call may be retried unchanged
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreErrorCode::SegstoreInterrupted.code(), "SEGSTORE_INTERRUPTED");
        assert_eq!(
            StoreErrorCode::SegstoreResourceExhausted.code(),
            "SEGSTORE_RESOURCE_EXHAUSTED"
        );
        assert_eq!(StoreErrorCode::SegstoreTransferFault.code(), "SEGSTORE_TRANSFER_FAULT");
        assert_eq!(StoreErrorCode::SegstoreInvalidConfig.code(), "SEGSTORE_INVALID_CONFIG");
    }

    #[test]
    fn test_severities() {
        assert_eq!(StoreError::interrupted("read").severity(), Severity::Warn);
        assert_eq!(
            StoreError::resource_exhausted(0, ChainError::BlockExhausted(8)).severity(),
            Severity::Error
        );
        assert_eq!(
            StoreError::transfer_fault(0, TransferFault::new(4, 0)).severity(),
            Severity::Error
        );
        assert!(StoreError::interrupted("reset").to_string().starts_with("[WARN] "));
    }

    #[test]
    fn test_only_interruption_is_retryable() {
        assert!(StoreError::interrupted("write").is_retryable());
        assert!(!StoreError::resource_exhausted(0, ChainError::BlockExhausted(8)).is_retryable());
        assert!(!StoreError::transfer_fault(0, TransferFault::new(4, 1)).is_retryable());
    }

    #[test]
    fn test_display_contains_required_fields() {
        let err = StoreError::resource_exhausted(4096, ChainError::BlockExhausted(4000));
        let display = err.to_string();
        assert!(display.contains("ERROR"));
        assert!(display.contains("SEGSTORE_RESOURCE_EXHAUSTED"));
        assert!(display.contains("4000 bytes"));
        assert!(display.contains("offset: 4096"));
    }

    #[test]
    fn test_source_is_preserved() {
        let err = StoreError::resource_exhausted(0, ChainError::SlotTableExhausted(3));
        let source = err.source().unwrap();
        assert!(source.to_string().contains("slot table"));

        assert!(StoreError::interrupted("reset").source().is_none());
    }
}
