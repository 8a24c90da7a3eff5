use crate::domain::entities::snapshot::Candle;
use crate::domain::error::DomainError;
use crate::domain::values::timeframe::Timeframe;
use async_trait::async_trait;

/// Market-data collaborator: returns an ordered candle series for a pool
/// address on a chain.
///
/// Implementations map transport failures to `DomainError::Transient`
/// (retryable) and unknown assets to `DomainError::NotFound` (not
/// retryable) so the retry wrapper can tell them apart.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Fetch up to `limit` candles, oldest first, strictly increasing `t`.
    async fn get_candles(
        &self,
        address: &str,
        chain: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DomainError>;
}
