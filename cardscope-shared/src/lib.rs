pub mod models;

pub use models::card::{CardKey, HeldCard};
pub use models::period::{ParsePeriodError, Period};
pub use models::reward::{
    CategoryReward, RewardData, RewardProfile, RewardSchedule, UserChoiceCategory,
};
pub use models::suggestion::{
    CardSuggestion, SuggestionEntry, SuggestionRequest, SuggestionResponse, NO_APPLICABLE_CARD,
};
