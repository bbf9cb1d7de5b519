pub mod achievements;
pub mod avatar;
pub mod countdown;
pub mod game_events;
pub mod game_state;
pub mod scoring;
pub mod validation;
pub mod word_graph;

// Re-export main components
pub use achievements::*;
pub use avatar::*;
pub use countdown::*;
pub use game_events::*;
pub use game_state::*;
pub use scoring::*;
pub use validation::*;
pub use word_graph::*;
