pub mod prelude;

pub mod account;
pub mod achievement;
pub mod achievement_image;
pub mod combination;
pub mod daily_challenge;
pub mod daily_word;
pub mod image;
pub mod lobby;
pub mod player;
pub mod player_word;
pub mod unlocked;
pub mod word;
