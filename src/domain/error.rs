use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too few candles for a meaningful computation. Components that can
    /// degrade (the regime classifier, individual rules) never raise this;
    /// it surfaces only from collaborators that return empty data.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Non-positive equity or stop distance. No plan is produced.
    #[error("Invalid plan inputs: {0}")]
    InvalidPlanInputs(String),

    /// A collaborator failed in a way that may succeed on retry.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// An append would violate the action-graph parent-chain invariant.
    #[error("Persistence conflict: {0}")]
    PersistenceConflict(String),

    /// Commentary generation failed; callers fall back to templated text.
    #[error("Commentary unavailable: {0}")]
    CommentaryUnavailable(String),

    /// The caller cancelled mid-backoff. Distinct from a timeout.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Whether the retry wrapper should attempt the operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Transient(_))
    }
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Database(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
