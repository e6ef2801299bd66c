//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::RoomId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Caller Precondition Errors
    // =========================================================================
    #[error("Invalid participant identity: {0:?}")]
    InvalidParticipant(String),

    #[error("Room not loaded yet: {0}")]
    RoomNotLoaded(RoomId),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Debounce window must be positive")]
    InvalidDebounce,

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs and host-facing responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParticipant(_) => "INVALID_PARTICIPANT",
            Self::RoomNotLoaded(_) => "ROOM_NOT_LOADED",
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::InvalidDebounce => "INVALID_DEBOUNCE",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the caller violated a precondition (never retried internally)
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::InvalidParticipant(_) | Self::RoomNotLoaded(_))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RoomNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidParticipant(_) | Self::InvalidDebounce | Self::ValidationError(_)
        )
    }

    /// Check if the caller may retry once the room has materialised
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RoomNotLoaded(_))
    }
}
