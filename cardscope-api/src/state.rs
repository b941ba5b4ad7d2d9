use cardscope_core::{ProfileStore, RewardProvider};
use cardscope_rewards::SuggestionEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SuggestionEngine>,
    pub profiles: Arc<dyn ProfileStore>,
    pub provider: Arc<dyn RewardProvider>,
}
