pub mod account_repository;
pub mod achievement_repository;
pub mod daily_challenge_repository;
pub mod image_repository;
pub mod lobby_repository;
pub mod player_word_repository;
pub mod word_repository;

pub use account_repository::*;
pub use achievement_repository::*;
pub use daily_challenge_repository::*;
pub use image_repository::*;
pub use lobby_repository::*;
pub use player_word_repository::*;
pub use word_repository::*;
