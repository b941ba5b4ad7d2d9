use async_trait::async_trait;
use cardscope_core::repository::{MerchantDirectory, ProfileStore};
use cardscope_shared::{CardKey, RewardData, RewardProfile};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Profile store for tests and database-less runs
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<CardKey, RewardProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find_profile(
        &self,
        issuer: &str,
        product: &str,
    ) -> StoreResult<Option<RewardProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&CardKey::new(issuer, product)).cloned())
    }

    async fn register_card(&self, issuer: &str, product: &str) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles
            .entry(CardKey::new(issuer, product))
            .or_insert_with(|| RewardProfile::unfetched(issuer.trim(), product.trim()));
        Ok(())
    }

    async fn find_stale_or_empty_profiles(&self) -> StoreResult<Vec<RewardProfile>> {
        let profiles = self.profiles.read().await;
        let mut stale: Vec<RewardProfile> = profiles
            .values()
            .filter(|p| p.needs_refresh())
            .cloned()
            .collect();
        stale.sort_by_key(RewardProfile::key);
        Ok(stale)
    }

    async fn upsert_profile(
        &self,
        issuer: &str,
        product: &str,
        data: RewardData,
    ) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(CardKey::new(issuer, product))
            .or_insert_with(|| RewardProfile::unfetched(issuer.trim(), product.trim()));
        profile.data = Some(data);
        profile.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn list_issuers(&self, search: &str) -> StoreResult<Vec<String>> {
        let needle = search.trim().to_lowercase();
        let profiles = self.profiles.read().await;
        let issuers: BTreeSet<String> = profiles
            .values()
            .filter(|p| p.issuer.to_lowercase().contains(&needle))
            .map(|p| p.issuer.clone())
            .collect();
        Ok(issuers.into_iter().collect())
    }

    async fn list_products(&self, issuer: &str, search: &str) -> StoreResult<Vec<String>> {
        let issuer = issuer.trim().to_lowercase();
        let needle = search.trim().to_lowercase();
        let profiles = self.profiles.read().await;
        let products: BTreeSet<String> = profiles
            .iter()
            .filter(|(key, _)| key.issuer() == issuer)
            .filter(|(_, p)| p.product.to_lowercase().contains(&needle))
            .map(|(_, p)| p.product.clone())
            .collect();
        Ok(products.into_iter().collect())
    }
}

/// Case-insensitive merchant to category table
#[derive(Default)]
pub struct InMemoryMerchantDirectory {
    categories: RwLock<HashMap<String, String>>,
}

impl InMemoryMerchantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let categories = entries
            .into_iter()
            .map(|(merchant, category)| (merchant.as_ref().trim().to_lowercase(), category.into()))
            .collect();
        Self {
            categories: RwLock::new(categories),
        }
    }

    pub async fn insert(&self, merchant: &str, category: &str) {
        self.categories
            .write()
            .await
            .insert(merchant.trim().to_lowercase(), category.to_string());
    }
}

#[async_trait]
impl MerchantDirectory for InMemoryMerchantDirectory {
    async fn find_category(&self, merchant: &str) -> StoreResult<Option<String>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&merchant.trim().to_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscope_shared::RewardSchedule;

    fn schedule(base: &str) -> RewardData {
        RewardData::Available(RewardSchedule {
            base_rate: Some(base.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_record_with_latest_payload() {
        let store = InMemoryProfileStore::new();
        store.upsert_profile("Chase", "Freedom Flex", schedule("1%")).await.unwrap();
        store.upsert_profile("CHASE ", "freedom flex", schedule("1.5%")).await.unwrap();

        assert_eq!(store.len().await, 1);
        let profile = store.find_profile("chase", "Freedom Flex").await.unwrap().unwrap();
        assert_eq!(profile.data, Some(schedule("1.5%")));
        assert_eq!(profile.issuer, "Chase");
        assert!(profile.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_stale_covers_unfetched_and_empty() {
        let store = InMemoryProfileStore::new();
        store.register_card("Citi", "Double Cash").await.unwrap();
        store.upsert_profile("Amex", "Gold", RewardData::Empty).await.unwrap();
        store.upsert_profile("Chase", "Sapphire", schedule("1%")).await.unwrap();

        let stale = store.find_stale_or_empty_profiles().await.unwrap();
        let names: Vec<String> = stale.iter().map(RewardProfile::display_name).collect();
        assert_eq!(names, vec!["Amex Gold", "Citi Double Cash"]);
    }

    #[tokio::test]
    async fn test_register_does_not_clobber_data() {
        let store = InMemoryProfileStore::new();
        store.upsert_profile("Chase", "Sapphire", schedule("1%")).await.unwrap();
        store.register_card("chase", "sapphire").await.unwrap();

        let profile = store.find_profile("Chase", "Sapphire").await.unwrap().unwrap();
        assert!(!profile.needs_refresh());
    }

    #[tokio::test]
    async fn test_catalogue_search() {
        let store = InMemoryProfileStore::new();
        store.register_card("Chase", "Freedom Flex").await.unwrap();
        store.register_card("Chase", "Freedom Unlimited").await.unwrap();
        store.register_card("Chase", "Sapphire Preferred").await.unwrap();
        store.register_card("Capital One", "Venture").await.unwrap();

        assert_eq!(store.list_issuers("CHA").await.unwrap(), vec!["Chase"]);
        assert_eq!(store.list_issuers("").await.unwrap(), vec!["Capital One", "Chase"]);
        assert_eq!(
            store.list_products("chase", "freedom").await.unwrap(),
            vec!["Freedom Flex", "Freedom Unlimited"]
        );
        assert!(store.list_products("Amex", "").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merchant_lookup_ignores_case() {
        let directory = InMemoryMerchantDirectory::from_entries([("Shell", "gas")]);
        directory.insert("Whole Foods", "groceries").await;

        assert_eq!(directory.find_category("SHELL").await.unwrap().as_deref(), Some("gas"));
        assert_eq!(
            directory.find_category(" whole foods ").await.unwrap().as_deref(),
            Some("groceries")
        );
        assert!(directory.find_category("Unknown").await.unwrap().is_none());
    }
}
