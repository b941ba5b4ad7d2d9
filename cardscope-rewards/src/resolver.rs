use cardscope_shared::{CategoryReward, Period, RewardData, RewardSchedule};
use serde::Serialize;
use std::sync::Arc;

use crate::exclusion::is_merchant_excluded;
use crate::matcher::CategoryMatcher;
use crate::rate::RateExtractor;

/// Part of a reward schedule that produced the winning rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Base,
    Bonus,
    UserChoice,
    Rotating,
    /// No usable reward data
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate {
    pub rate: f64,
    pub source: RateSource,
}

impl ResolvedRate {
    const NONE: ResolvedRate = ResolvedRate {
        rate: 0.0,
        source: RateSource::Unavailable,
    };

    /// Replace only on a strictly higher rate, so earlier sources win ties
    fn offer(&mut self, rate: f64, source: RateSource) {
        if rate > self.rate {
            self.rate = rate;
            self.source = source;
        }
    }
}

/// Computes the best rate a card earns for a purchase
#[derive(Debug, Clone)]
pub struct RewardResolver {
    extractor: Arc<RateExtractor>,
    matcher: Arc<CategoryMatcher>,
}

impl RewardResolver {
    pub fn new(extractor: Arc<RateExtractor>, matcher: Arc<CategoryMatcher>) -> Self {
        Self { extractor, matcher }
    }

    /// Best applicable rate across base, bonus, user-choice and this period's
    /// rotating categories. Missing or empty data resolves to 0, and so does
    /// a missing category.
    pub fn resolve(
        &self,
        data: Option<&RewardData>,
        category: Option<&str>,
        merchant: Option<&str>,
        period: Period,
    ) -> ResolvedRate {
        match data.and_then(RewardData::schedule) {
            Some(schedule) => self.resolve_schedule(schedule, category, merchant, period),
            None => ResolvedRate::NONE,
        }
    }

    pub fn resolve_schedule(
        &self,
        schedule: &RewardSchedule,
        category: Option<&str>,
        merchant: Option<&str>,
        period: Period,
    ) -> ResolvedRate {
        if category.map_or(true, |c| c.trim().is_empty()) {
            return ResolvedRate::NONE;
        }

        let mut best = ResolvedRate::NONE;
        best.offer(self.base_rate(schedule), RateSource::Base);

        for bonus in &schedule.bonus_categories {
            self.consider(&mut best, bonus, category, merchant, RateSource::Bonus);
        }

        for choice in &schedule.user_choice_categories {
            if is_merchant_excluded(merchant, &choice.exclusions) {
                continue;
            }
            let matched = choice
                .options
                .iter()
                .any(|option| self.matcher.matches(Some(option), category));
            if matched {
                best.offer(
                    self.extractor.extract_opt(choice.rate.as_deref()),
                    RateSource::UserChoice,
                );
            }
        }

        for rotating in schedule.rotating_for(period) {
            self.consider(&mut best, rotating, category, merchant, RateSource::Rotating);
        }

        best
    }

    pub fn base_rate(&self, schedule: &RewardSchedule) -> f64 {
        self.extractor.extract_opt(schedule.base_rate.as_deref())
    }

    fn consider(
        &self,
        best: &mut ResolvedRate,
        entry: &CategoryReward,
        category: Option<&str>,
        merchant: Option<&str>,
        source: RateSource,
    ) {
        if !self.matcher.matches(entry.category.as_deref(), category) {
            return;
        }
        if is_merchant_excluded(merchant, &entry.exclusions) {
            return;
        }
        best.offer(self.extractor.extract_opt(entry.rate.as_deref()), source);
    }
}

impl Default for RewardResolver {
    fn default() -> Self {
        let extractor = RateExtractor::new().expect("rate pattern is a valid regex");
        Self::new(Arc::new(extractor), Arc::new(CategoryMatcher::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscope_shared::UserChoiceCategory;

    fn entry(category: &str, rate: &str, exclusions: &[&str]) -> CategoryReward {
        CategoryReward {
            category: Some(category.to_string()),
            rate: Some(rate.to_string()),
            exclusions: exclusions.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn dining_card() -> RewardSchedule {
        RewardSchedule {
            base_rate: Some("1%".into()),
            bonus_categories: vec![entry("dining", "5%", &["Diner Express"])],
            ..Default::default()
        }
    }

    #[test]
    fn test_exclusion_falls_back_to_base() {
        let resolver = RewardResolver::default();
        let schedule = dining_card();

        let excluded =
            resolver.resolve_schedule(&schedule, Some("dining"), Some("Diner Express"), Period::Q1);
        assert_eq!(excluded.rate, 1.0);
        assert_eq!(excluded.source, RateSource::Base);

        let allowed =
            resolver.resolve_schedule(&schedule, Some("dining"), Some("Other Diner"), Period::Q1);
        assert_eq!(allowed.rate, 5.0);
        assert_eq!(allowed.source, RateSource::Bonus);
    }

    #[test]
    fn test_rotating_only_in_registered_period() {
        let resolver = RewardResolver::default();
        let mut schedule = RewardSchedule {
            base_rate: Some("1%".into()),
            ..Default::default()
        };
        schedule
            .rotating_categories
            .insert("Q1".into(), vec![entry("groceries", "5%", &[])]);

        let q1 = resolver.resolve_schedule(&schedule, Some("grocery"), Some("Kroger"), Period::Q1);
        assert_eq!(q1.rate, 5.0);
        assert_eq!(q1.source, RateSource::Rotating);

        let q3 = resolver.resolve_schedule(&schedule, Some("grocery"), Some("Kroger"), Period::Q3);
        assert_eq!(q3.rate, 1.0);
    }

    #[test]
    fn test_user_choice_options() {
        let resolver = RewardResolver::default();
        let schedule = RewardSchedule {
            base_rate: Some("1%".into()),
            user_choice_categories: vec![UserChoiceCategory {
                options: vec!["gas".into(), "online shopping".into(), "travel".into()],
                rate: Some("3% cash back".into()),
                exclusions: vec!["Costco Gas".into()],
            }],
            ..Default::default()
        };

        let hotel = resolver.resolve_schedule(&schedule, Some("hotels"), None, Period::Q2);
        assert_eq!(hotel.rate, 3.0);
        assert_eq!(hotel.source, RateSource::UserChoice);

        let costco =
            resolver.resolve_schedule(&schedule, Some("gas"), Some("Costco Gas"), Period::Q2);
        assert_eq!(costco.rate, 1.0);
    }

    #[test]
    fn test_ties_keep_first_source() {
        let resolver = RewardResolver::default();
        let schedule = RewardSchedule {
            base_rate: Some("2%".into()),
            bonus_categories: vec![entry("dining", "2%", &[]), entry("restaurants", "3%", &[])],
            user_choice_categories: vec![UserChoiceCategory {
                options: vec!["dining".into()],
                rate: Some("3%".into()),
                exclusions: vec![],
            }],
            ..Default::default()
        };

        let resolved = resolver.resolve_schedule(&schedule, Some("dining"), None, Period::Q4);
        assert_eq!(resolved.rate, 3.0);
        assert_eq!(resolved.source, RateSource::Bonus);

        let base_only = RewardSchedule {
            base_rate: Some("2%".into()),
            bonus_categories: vec![entry("dining", "2%", &[])],
            ..Default::default()
        };
        let resolved = resolver.resolve_schedule(&base_only, Some("dining"), None, Period::Q4);
        assert_eq!(resolved.source, RateSource::Base);
    }

    #[test]
    fn test_missing_category_resolves_to_zero() {
        let resolver = RewardResolver::default();
        let resolved =
            resolver.resolve_schedule(&dining_card(), None, Some("Anywhere"), Period::Q1);
        assert_eq!(resolved.rate, 0.0);
        assert_eq!(resolved.source, RateSource::Unavailable);

        let blank = resolver.resolve_schedule(&dining_card(), Some("  "), None, Period::Q1);
        assert_eq!(blank.rate, 0.0);

        let data = RewardData::Available(dining_card());
        let resolved = resolver.resolve(Some(&data), None, None, Period::Q1);
        assert_eq!(resolved, ResolvedRate::NONE);
    }

    #[test]
    fn test_missing_or_empty_data_is_zero() {
        let resolver = RewardResolver::default();
        assert_eq!(resolver.resolve(None, Some("dining"), None, Period::Q1).rate, 0.0);

        let empty = resolver.resolve(Some(&RewardData::Empty), Some("dining"), None, Period::Q1);
        assert_eq!(empty.rate, 0.0);
        assert_eq!(empty.source, RateSource::Unavailable);
    }
}
