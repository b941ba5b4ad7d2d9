use async_trait::async_trait;
use cardscope_shared::{RewardData, RewardProfile};

/// Storage of reward profiles, keyed case-insensitively by (issuer, product)
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(
        &self,
        issuer: &str,
        product: &str,
    ) -> Result<Option<RewardProfile>, Box<dyn std::error::Error + Send + Sync>>;

    /// Add a catalogue entry with no reward data. Existing entries are left alone.
    async fn register_card(
        &self,
        issuer: &str,
        product: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Profiles never fetched or holding the empty marker
    async fn find_stale_or_empty_profiles(
        &self,
    ) -> Result<Vec<RewardProfile>, Box<dyn std::error::Error + Send + Sync>>;

    /// Insert if absent, otherwise overwrite the reward data. Last write wins.
    async fn upsert_profile(
        &self,
        issuer: &str,
        product: &str,
        data: RewardData,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Distinct issuers whose name contains `search` (case-insensitive)
    async fn list_issuers(
        &self,
        search: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Products of `issuer` whose name contains `search` (case-insensitive)
    async fn list_products(
        &self,
        issuer: &str,
        search: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Merchant name to spending category lookup
#[async_trait]
pub trait MerchantDirectory: Send + Sync {
    async fn find_category(
        &self,
        merchant: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;
}
