use std::cmp::Ordering;

use alchemy_types::{GameMode, PlayerStats};

/// Points awarded for each Wombo Combo target hit.
pub const COMBO_POINTS: i32 = 10;

pub struct ScoringEngine;

impl ScoringEngine {
    /// Points in modes that award them, the word count everywhere else.
    pub fn score(mode: GameMode, player: &PlayerStats) -> i32 {
        if mode.awards_points() {
            player.points
        } else {
            player.word_count
        }
    }

    /// Highest score wins; ties go to the larger word count, then the name.
    pub fn select_winner(mode: GameMode, players: &[PlayerStats]) -> Option<&PlayerStats> {
        players.iter().max_by(|a, b| {
            Self::score(mode, a)
                .cmp(&Self::score(mode, b))
                .then(a.word_count.cmp(&b.word_count))
                .then_with(|| b.name.cmp(&a.name))
        })
    }

    /// Winner first, everyone else by descending `points + word_count`.
    pub fn order_stats(players: &mut [PlayerStats], winner: Option<&str>) {
        players.sort_by(|a, b| {
            let a_wins = winner == Some(a.name.as_str());
            let b_wins = winner == Some(b.name.as_str());
            match (a_wins, b_wins) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => (b.points + b.word_count).cmp(&(a.points + a.word_count)),
            }
        });
    }
}
