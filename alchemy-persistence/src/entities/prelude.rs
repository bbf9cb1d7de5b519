pub use super::account::Entity as Account;
pub use super::achievement::Entity as Achievement;
pub use super::achievement_image::Entity as AchievementImage;
pub use super::combination::Entity as Combination;
pub use super::daily_challenge::Entity as DailyChallenge;
pub use super::daily_word::Entity as DailyWord;
pub use super::image::Entity as Image;
pub use super::lobby::Entity as Lobby;
pub use super::player::Entity as Player;
pub use super::player_word::Entity as PlayerWord;
pub use super::unlocked::Entity as Unlocked;
pub use super::word::Entity as Word;
