use crate::domain::error::DomainError;
use async_trait::async_trait;

/// AI commentary collaborator. Only ever used to annotate a signal or
/// plan with human-readable thesis text — detection and sizing never
/// depend on it, and callers degrade to a templated thesis when it fails.
#[async_trait]
pub trait CommentaryProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Render commentary for `prompt` with JSON `vars` interpolated by
    /// the provider.
    async fn assist(&self, prompt: &str, vars: &serde_json::Value)
        -> Result<String, DomainError>;
}
