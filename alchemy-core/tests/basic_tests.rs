mod common;

use alchemy_core::{
    AchievementBook, AchievementKind, COMBO_POINTS, MoveOutcome, ScoringEngine, TargetFilter,
};
use alchemy_types::GameMode;
use common::*;

#[test]
fn test_combination_is_order_insensitive() {
    let mut graph = TestGraph::with_primitives();
    graph.add("fire", "water", "steam");
    graph.add("Water", "FIRE", "mist");
    assert_eq!(graph.resolve("water", "fire").map(String::as_str), Some("steam"));
    assert_eq!(graph.combinations.len(), 1);
}

#[test]
fn test_learned_depth_never_exceeds_parents_plus_one() {
    let mut graph = TestGraph::with_primitives();
    graph.add("fire", "water", "steam");
    graph.add("steam", "earth", "geyser");
    graph.add("geyser", "wind", "cloud");
    graph.add("water", "wind", "cloud");

    for ((a, b), result) in &graph.combinations {
        let bound = graph.metrics(a).depth.max(graph.metrics(b).depth) + 1;
        let learned = graph.metrics(result);
        assert!(learned.depth <= bound, "{result} deeper than {bound}");
        assert!((0.0..=1.0).contains(&learned.reachability));
    }
    // The shallow path found later wins the depth.
    assert_eq!(graph.metrics("cloud").depth, 1);
}

#[test]
fn test_fusion_frenzy_round() {
    let mut graph = TestGraph::with_primitives();
    graph.add("fire", "water", "steam");

    let mut game = create_game(GameMode::FusionFrenzy, "steam", &[]);
    let target = game.initial_target_for_player();
    let result = graph.resolve("fire", "water").unwrap();
    assert_eq!(game.evaluate_move(&target, result), MoveOutcome::TargetWon);

    game.finish(Some("alice".to_string()));
    assert!(game.ensure_running().is_err());
}

#[test]
fn test_wombo_combo_scoring_picks_highest_points() {
    let game = create_game(GameMode::WomboCombo, "", &["steam", "mud", "lava"]);
    let outcome = game.evaluate_move("mud", "mud");
    let MoveOutcome::ComboHit { next_target } = outcome else {
        panic!("expected a combo hit, got {outcome:?}");
    };
    assert_ne!(next_target, "mud");

    let players = vec![
        create_test_stats("alice", 2 * COMBO_POINTS, 6),
        create_test_stats("bob", COMBO_POINTS, 15),
    ];
    let winner = ScoringEngine::select_winner(GameMode::WomboCombo, &players).unwrap();
    assert_eq!(winner.name, "alice");
}

#[test]
fn test_seeded_graph_yields_target_candidates() {
    let mut graph = TestGraph::with_primitives();
    graph.add("fire", "water", "steam");
    graph.add("steam", "earth", "geyser");
    graph.add("geyser", "wind", "cloud");
    graph.add("cloud", "fire", "lightning");

    let mut candidates: Vec<&String> = graph
        .words
        .iter()
        .filter(|(_, metrics)| TargetFilter::FUSION_FRENZY.accepts(**metrics))
        .map(|(word, _)| word)
        .collect();
    candidates.sort();
    // Depths 3 and 4 fall inside [0.0375, 0.2].
    assert_eq!(candidates, vec!["cloud", "lightning"]);
}

#[test]
fn test_achievement_book_from_rows() {
    let rows = [
        ("Inventor", "NEW_WORD_COUNT", "1"),
        ("Tinkerer", "WORD_COUNT", "10"),
        ("Steam Engine", "TARGET_WORD", "steam"),
    ];
    let mut book = AchievementBook::new();
    for (title, kind, value) in rows {
        let kind: AchievementKind = kind.parse().unwrap();
        book.insert(kind, value, title).unwrap();
    }
    assert_eq!(book.earned(1, 1, "steam"), vec!["Inventor", "Steam Engine"]);
}
