use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Without a URL the service runs on the in-memory store
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,
}

fn default_interval_seconds() -> u64 { 4 * 60 * 60 }
fn default_workers() -> usize { 10 }
fn default_queue_capacity() -> usize { 50 }
fn default_max_attempts() -> u32 { 3 }
fn default_retry_delay_seconds() -> u64 { 2 }

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            max_attempts: default_max_attempts(),
            retry_delay_seconds: default_retry_delay_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    /// Falls back to the built-in prompt when unset
    pub system_prompt: Option<String>,
}

fn default_base_url() -> String { "https://api.openai.com/v1".into() }
fn default_model() -> String { "gpt-5-mini".into() }
fn default_timeout_seconds() -> u64 { 180 }
fn default_connect_timeout_seconds() -> u64 { 60 }

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            system_prompt: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RewardsConfig {
    /// Replaces the built-in alias table when present
    pub aliases: Option<BTreeMap<String, Vec<String>>>,
    /// Merchant name to category, seeded into the in-memory directory
    #[serde(default)]
    pub merchants: BTreeMap<String, String>,
    /// Card catalogue seeded into the in-memory store so refresh has work to do
    #[serde(default)]
    pub cards: Vec<CardSeed>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardSeed {
    pub issuer: String,
    pub product: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `CARDSCOPE_PROVIDER__API_KEY=sk-...`
            .add_source(config::Environment::with_prefix("CARDSCOPE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(text: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(text, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 8080

            [provider]
            api_key = "test"
            "#,
        );

        assert!(config.database.url.is_none());
        assert_eq!(config.refresh.interval_seconds, 14_400);
        assert_eq!(config.refresh.workers, 10);
        assert_eq!(config.refresh.queue_capacity, 50);
        assert_eq!(config.refresh.max_attempts, 3);
        assert_eq!(config.refresh.retry_delay_seconds, 2);
        assert_eq!(config.provider.model, "gpt-5-mini");
        assert_eq!(config.provider.timeout_seconds, 180);
        assert!(config.rewards.aliases.is_none());
    }

    #[test]
    fn test_rewards_section() {
        let config = from_toml(
            r#"
            [server]
            port = 8080

            [rewards.aliases]
            wholesale = ["warehouse clubs"]

            [rewards.merchants]
            shell = "gas"

            [[rewards.cards]]
            issuer = "Chase"
            product = "Freedom Flex"
            "#,
        );

        let aliases = config.rewards.aliases.unwrap();
        assert_eq!(aliases["wholesale"], vec!["warehouse clubs"]);
        assert_eq!(config.rewards.merchants["shell"], "gas");
        assert_eq!(config.rewards.cards[0].product, "Freedom Flex");
    }
}
