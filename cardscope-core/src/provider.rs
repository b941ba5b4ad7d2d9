use async_trait::async_trait;
use cardscope_shared::RewardData;

/// Classified failure of a provider call. Only `Timeout` is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider timed out: {0}")]
    Timeout(String),
    #[error("Provider error: {0}")]
    Other(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }
}

/// External source of reward data. Called concurrently from refresh workers.
#[async_trait]
pub trait RewardProvider: Send + Sync {
    /// Fetch the reward rules for a card by display name, e.g. "Chase Freedom Flex"
    async fn fetch_reward_profile(&self, card_name: &str) -> Result<RewardData, ProviderError>;
}
