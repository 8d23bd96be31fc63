pub mod loading;
pub mod profile_stats;
pub mod quiz_gauntlet;
pub mod result_view;
pub mod story_card;
