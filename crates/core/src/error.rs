use crate::types::DbId;

/// Domain error taxonomy shared by every layer.
///
/// The transport layer decides the literal status code; this enum only says
/// which condition applies.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Malformed or missing input. The message carries field-level detail.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate respondent, closed request, duplicate email.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn request_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "DonationRequest",
            id,
        }
    }

    pub fn user_not_found(id: DbId) -> Self {
        CoreError::NotFound { entity: "User", id }
    }
}
