pub mod card;
pub mod period;
pub mod reward;
pub mod suggestion;
