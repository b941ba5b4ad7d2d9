use async_trait::async_trait;
use cardscope_core::repository::{MerchantDirectory, ProfileStore};
use cardscope_shared::{CardKey, RewardData, RewardProfile};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::{info, warn};

type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// PostgreSQL-backed profile store and merchant directory
#[derive(Clone)]
pub struct PgStore {
    pub pool: Pool<Postgres>,
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct CardRow {
    issuer: String,
    card_product: String,
    reward_details: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl CardRow {
    fn into_profile(self) -> RewardProfile {
        let data = self.reward_details.map(|raw| match RewardData::from_json(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    issuer = %self.issuer,
                    product = %self.card_product,
                    error = %e,
                    "Stored reward details are malformed, treating as empty"
                );
                RewardData::Empty
            }
        });

        RewardProfile {
            issuer: self.issuer,
            product: self.card_product,
            data,
            updated_at: self.updated_at,
        }
    }
}

fn stale_profiles(rows: Vec<CardRow>) -> Vec<RewardProfile> {
    rows.into_iter()
        .map(CardRow::into_profile)
        .filter(RewardProfile::needs_refresh)
        .collect()
}

impl PgStore {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    pub async fn upsert_merchant(&self, merchant: &str, category: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO merchant (merchant_name, merchant_key, category)
            VALUES ($1, $2, $3)
            ON CONFLICT (merchant_key) DO UPDATE SET category = EXCLUDED.category
            "#,
        )
        .bind(merchant.trim())
        .bind(merchant.trim().to_lowercase())
        .bind(category)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_profile(
        &self,
        issuer: &str,
        product: &str,
    ) -> StoreResult<Option<RewardProfile>> {
        let key = CardKey::new(issuer, product);
        let row = sqlx::query_as::<_, CardRow>(
            r#"
            SELECT issuer, card_product, reward_details, updated_at
            FROM credit_card
            WHERE issuer_key = $1 AND product_key = $2
            "#,
        )
        .bind(key.issuer())
        .bind(key.product())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CardRow::into_profile))
    }

    async fn register_card(&self, issuer: &str, product: &str) -> StoreResult<()> {
        let key = CardKey::new(issuer, product);
        sqlx::query(
            r#"
            INSERT INTO credit_card (issuer, card_product, issuer_key, product_key)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (issuer_key, product_key) DO NOTHING
            "#,
        )
        .bind(issuer.trim())
        .bind(product.trim())
        .bind(key.issuer())
        .bind(key.product())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_stale_or_empty_profiles(&self) -> StoreResult<Vec<RewardProfile>> {
        // A row mentioning cardReward can still be malformed or hold an empty
        // schedule, so every payload is parsed and judged by needs_refresh.
        let rows = sqlx::query_as::<_, CardRow>(
            r#"
            SELECT issuer, card_product, reward_details, updated_at
            FROM credit_card
            ORDER BY issuer_key, product_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stale_profiles(rows))
    }

    async fn upsert_profile(
        &self,
        issuer: &str,
        product: &str,
        data: RewardData,
    ) -> StoreResult<()> {
        let key = CardKey::new(issuer, product);
        let payload = data.to_json()?;

        sqlx::query(
            r#"
            INSERT INTO credit_card (issuer, card_product, issuer_key, product_key, reward_details, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (issuer_key, product_key) DO UPDATE
            SET reward_details = EXCLUDED.reward_details,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(issuer.trim())
        .bind(product.trim())
        .bind(key.issuer())
        .bind(key.product())
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_issuers(&self, search: &str) -> StoreResult<Vec<String>> {
        let issuers: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT issuer
            FROM credit_card
            WHERE issuer_key LIKE '%' || $1 || '%'
            ORDER BY issuer
            "#,
        )
        .bind(search.trim().to_lowercase())
        .fetch_all(&self.pool)
        .await?;

        Ok(issuers)
    }

    async fn list_products(&self, issuer: &str, search: &str) -> StoreResult<Vec<String>> {
        let products: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT card_product
            FROM credit_card
            WHERE issuer_key = $1 AND product_key LIKE '%' || $2 || '%'
            ORDER BY card_product
            "#,
        )
        .bind(issuer.trim().to_lowercase())
        .bind(search.trim().to_lowercase())
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

#[async_trait]
impl MerchantDirectory for PgStore {
    async fn find_category(&self, merchant: &str) -> StoreResult<Option<String>> {
        let category: Option<String> =
            sqlx::query_scalar("SELECT category FROM merchant WHERE merchant_key = $1")
                .bind(merchant.trim().to_lowercase())
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }
}
