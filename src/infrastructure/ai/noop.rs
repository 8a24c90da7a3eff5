use crate::domain::error::DomainError;
use crate::domain::ports::commentary::CommentaryProvider;

/// Default provider when no AI backend is configured. Always reports
/// unavailable, which routes callers onto their templated fallback text.
pub struct NoopCommentary;

#[async_trait::async_trait]
impl CommentaryProvider for NoopCommentary {
    fn name(&self) -> &str {
        "noop"
    }

    async fn assist(
        &self,
        _prompt: &str,
        _vars: &serde_json::Value,
    ) -> Result<String, DomainError> {
        Err(DomainError::CommentaryUnavailable(
            "no commentary provider configured".into(),
        ))
    }
}
