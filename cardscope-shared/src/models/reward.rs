use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::card::CardKey;
use super::period::Period;

/// Elevated rate on one spending category, optionally excluding some merchants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryReward {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "rate_text", skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
}

/// A rate the cardholder can point at any one of `options`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserChoiceCategory {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "rate_text", skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
}

/// Typed reward rules of one card product.
///
/// Every section is optional on the wire. Rates stay as the provider wrote
/// them ("5%", "1.5% Cash Back") and are only turned into numbers when a
/// request is resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardSchedule {
    #[serde(default, deserialize_with = "rate_text", skip_serializing_if = "Option::is_none")]
    pub base_rate: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub bonus_categories: Vec<CategoryReward>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub user_choice_categories: Vec<UserChoiceCategory>,
    /// Keyed by quarter label ("Q1".."Q4"); unknown labels are kept but never consulted
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub rotating_categories: BTreeMap<String, Vec<CategoryReward>>,
}

impl RewardSchedule {
    /// Rotating entries registered under `period` only
    pub fn rotating_for(&self, period: Period) -> impl Iterator<Item = &CategoryReward> {
        self.rotating_categories
            .iter()
            .filter(move |(label, _)| label.trim().eq_ignore_ascii_case(period.as_str()))
            .flat_map(|(_, entries)| entries.iter())
    }

    pub fn is_trivially_empty(&self) -> bool {
        self.base_rate.as_deref().map_or(true, |r| r.trim().is_empty())
            && self.bonus_categories.is_empty()
            && self.user_choice_categories.is_empty()
            && self.rotating_categories.values().all(Vec::is_empty)
    }
}

/// Reward data as stored for a card.
///
/// `Empty` means a fetch happened and produced nothing usable; it is distinct
/// from a profile that was never fetched (`RewardProfile::data == None`).
#[derive(Debug, Clone, PartialEq)]
pub enum RewardData {
    Empty,
    Available(RewardSchedule),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "cardReward", default)]
    card_reward: Option<RewardSchedule>,
}

impl RewardData {
    pub fn from_schedule(schedule: RewardSchedule) -> Self {
        if schedule.is_trivially_empty() {
            RewardData::Empty
        } else {
            RewardData::Available(schedule)
        }
    }

    /// Parse the persisted/provider form `{"cardReward": {...}}`.
    ///
    /// `{}` (ignoring whitespace), a missing or null `cardReward`, and a schedule
    /// with no content all become `Empty`.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() || compact == "{}" {
            return Ok(RewardData::Empty);
        }

        let envelope: Envelope = serde_json::from_str(raw)?;
        Ok(envelope
            .card_reward
            .map(Self::from_schedule)
            .unwrap_or(RewardData::Empty))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn schedule(&self) -> Option<&RewardSchedule> {
        match self {
            RewardData::Available(schedule) => Some(schedule),
            RewardData::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RewardData::Empty)
    }
}

impl Serialize for RewardData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RewardData::Empty => serializer.serialize_map(Some(0))?.end(),
            RewardData::Available(schedule) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("cardReward", schedule)?;
                map.end()
            }
        }
    }
}

/// Stored reward record of one (issuer, product)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardProfile {
    pub issuer: String,
    pub product: String,
    /// `None` until the first fetch completes
    pub data: Option<RewardData>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RewardProfile {
    /// A catalogue entry that has not been fetched yet
    pub fn unfetched(issuer: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            product: product.into(),
            data: None,
            updated_at: None,
        }
    }

    pub fn key(&self) -> CardKey {
        CardKey::new(&self.issuer, &self.product)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.issuer.trim(), self.product.trim())
    }

    pub fn schedule(&self) -> Option<&RewardSchedule> {
        self.data.as_ref().and_then(RewardData::schedule)
    }

    /// Never fetched, or fetched with no usable result
    pub fn needs_refresh(&self) -> bool {
        self.data.as_ref().map_or(true, RewardData::is_empty)
    }
}

fn rate_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FREEDOM_FLEX: &str = r#"{
        "cardReward": {
            "base_rate": "1%",
            "bonus_categories": [
                {"category": "dining", "rate": "3%"},
                {"category": "drugstores", "rate": 3, "exclusions": null}
            ],
            "rotating_categories": {
                "Q1": [{"category": "grocery stores", "rate": "5%", "exclusions": ["Target", "Walmart"]}],
                "q3": [{"category": "gas", "rate": "5%"}]
            }
        }
    }"#;

    #[test]
    fn test_parse_lenient_schedule() {
        let data = RewardData::from_json(FREEDOM_FLEX).unwrap();
        let schedule = data.schedule().expect("schedule should be available");

        assert_eq!(schedule.base_rate.as_deref(), Some("1%"));
        assert_eq!(schedule.bonus_categories.len(), 2);
        assert_eq!(schedule.bonus_categories[1].rate.as_deref(), Some("3"));
        assert!(schedule.bonus_categories[1].exclusions.is_empty());
        assert!(schedule.user_choice_categories.is_empty());

        let q1: Vec<_> = schedule.rotating_for(Period::Q1).collect();
        assert_eq!(q1.len(), 1);
        assert_eq!(q1[0].exclusions, vec!["Target", "Walmart"]);
        assert_eq!(schedule.rotating_for(Period::Q3).count(), 1);
        assert_eq!(schedule.rotating_for(Period::Q2).count(), 0);
    }

    #[test]
    fn test_empty_marker_forms() {
        assert_eq!(RewardData::from_json("{}").unwrap(), RewardData::Empty);
        assert_eq!(RewardData::from_json(" { \n } ").unwrap(), RewardData::Empty);
        assert_eq!(RewardData::from_json(r#"{"cardReward": null}"#).unwrap(), RewardData::Empty);
        assert_eq!(RewardData::from_json(r#"{"cardReward": {}}"#).unwrap(), RewardData::Empty);
        assert_eq!(
            RewardData::from_json(r#"{"error": "No output from model"}"#).unwrap(),
            RewardData::Empty
        );
        assert!(RewardData::from_json("not json").is_err());
    }

    #[test]
    fn test_persisted_form_reloads() {
        let data = RewardData::from_json(FREEDOM_FLEX).unwrap();
        let stored = data.to_json().unwrap();
        assert!(stored.starts_with(r#"{"cardReward":"#));
        assert_eq!(RewardData::from_json(&stored).unwrap(), data);
        assert_eq!(RewardData::Empty.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_needs_refresh() {
        let mut profile = RewardProfile::unfetched("Chase", "Freedom Flex");
        assert!(profile.needs_refresh());

        profile.data = Some(RewardData::Empty);
        assert!(profile.needs_refresh());

        profile.data = Some(RewardData::from_json(FREEDOM_FLEX).unwrap());
        assert!(!profile.needs_refresh());
        assert!(profile.schedule().is_some());
    }
}
