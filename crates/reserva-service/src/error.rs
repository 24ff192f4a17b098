use thiserror::Error;

/// Service layer errors - the engine's caller-facing taxonomy.
///
/// `Validation`, `NotFound`, `Conflict`, and `State` are returned as typed
/// results to the caller; collaborator failures never appear here (they are
/// absorbed at the collaborator boundary, see [`crate::collaborator`]).
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] reserva_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] reserva_core::error::CoreError),

    /// Caller's fault: malformed input, or a date/time outside the
    /// notice/advance window. Surfaced directly.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The slot was lost to a concurrent booking or the daily cap filled up
    /// between listing and creating. The caller should re-list and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A transition was attempted from an invalid state, or inside the
    /// cancellation notice window.
    #[error("State error: {0}")]
    State(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
