use serde::{Deserialize, Serialize};

/// A card in a user's wallet. Only a lookup key into the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldCard {
    pub issuer: String,
    #[serde(alias = "cardProduct", alias = "card_product")]
    pub product: String,
}

impl HeldCard {
    pub fn new(issuer: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            product: product.into(),
        }
    }

    pub fn key(&self) -> CardKey {
        CardKey::new(&self.issuer, &self.product)
    }

    /// Name used when asking the provider about this card, e.g. "Chase Freedom Flex"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.issuer.trim(), self.product.trim())
    }
}

/// Case-insensitive identity of a card product.
///
/// Two profiles with the same key are the same record; "CHASE / freedom flex"
/// and "Chase / Freedom Flex" collapse to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey {
    issuer: String,
    product: String,
}

impl CardKey {
    pub fn new(issuer: &str, product: &str) -> Self {
        Self {
            issuer: issuer.trim().to_lowercase(),
            product: product.trim().to_lowercase(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn product(&self) -> &str {
        &self.product
    }
}
