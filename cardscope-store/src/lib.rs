pub mod app_config;
pub mod database;
pub mod memory;

pub use database::PgStore;
pub use memory::{InMemoryMerchantDirectory, InMemoryProfileStore};
