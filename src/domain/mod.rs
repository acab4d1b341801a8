pub mod game_review;
pub mod store_url;
