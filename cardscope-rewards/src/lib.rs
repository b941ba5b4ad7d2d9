pub mod rate;
pub mod matcher;
pub mod exclusion;
pub mod resolver;
pub mod ranker;
pub mod engine;

pub use rate::RateExtractor;
pub use matcher::{default_aliases, CategoryMatcher};
pub use exclusion::is_merchant_excluded;
pub use resolver::{RateSource, ResolvedRate, RewardResolver};
pub use ranker::{calculate_score, format_rate, rank_cards, CardScore};
pub use engine::SuggestionEngine;
