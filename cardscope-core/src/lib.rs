pub mod repository;
pub mod provider;

pub use provider::{ProviderError, RewardProvider};
pub use repository::{MerchantDirectory, ProfileStore};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
