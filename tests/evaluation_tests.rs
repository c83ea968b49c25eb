//! Composite Evaluation Tests
//!
//! Behaviour of the scent map and the tactical layers as seen through the
//! public evaluation entry points.

use pacman_multiagent::config::{HeuristicConfig, RulesConfig};
use pacman_multiagent::evaluation::{evaluate_action, score_position, Evaluator, HeuristicEvaluator};
use pacman_multiagent::game::GameState;
use pacman_multiagent::heat_map::ScentMap;
use pacman_multiagent::layout::Layout;
use pacman_multiagent::types::{Direction, Position};

fn state(text: &str) -> GameState {
    GameState::from_layout(&Layout::parse(text).unwrap(), RulesConfig::default())
}

/// Ghost at (4,4) charging West towards Pacman at (1,4); `top` is the top open row
fn charging_ghost(top: &str) -> GameState {
    let text = format!(
        "%%%%%%%%\n{}\n%  %   %\n%  %   %\n%. %   %\n%%%%%%%%",
        top
    );
    let s = state(&text);
    let mut ghost = s.agent_state(1).unwrap().clone();
    ghost.direction = Direction::West;
    s.with_agent(ghost).unwrap()
}

#[test]
fn test_dead_end_costs_the_penalty() {
    let params = HeuristicConfig::default();
    // (1,1) has walls north, south and west
    let dead_end = state(
        "%%%%%%\n\
         %P  .%\n\
         %%%%%%",
    );
    // Same corridor with (1,2) opened up
    let open = state(
        "%%%%%%\n\
         % %%%%\n\
         %P  .%\n\
         %%%%%%",
    );
    assert_eq!(dead_end.walls().blocked_neighbors(Position::new(1, 1)), 3);
    assert_eq!(open.walls().blocked_neighbors(Position::new(1, 1)), 2);

    let trapped = score_position(&dead_end, Direction::East, false, &params);
    let free = score_position(&open, Direction::East, false, &params);
    assert!(trapped < free);
    assert_eq!(free - trapped, params.dead_end_penalty);
}

#[test]
fn test_dead_end_with_food_still_costs_the_penalty() {
    let params = HeuristicConfig::default();
    let dead_end = state(
        "%%%%%%\n\
         %P  .%\n\
         %%%%%%",
    );
    let plain = score_position(&dead_end, Direction::East, false, &params);
    let eating = score_position(&dead_end, Direction::East, true, &params);
    // Eating only adds its bonus; the dead end is charged either way
    assert_eq!(eating - plain, params.food_consumed_bonus);

    let mut lenient = params;
    lenient.dead_end_penalty = 0.0;
    let unpenalised = score_position(&dead_end, Direction::East, true, &lenient);
    assert_eq!(unpenalised - eating, params.dead_end_penalty);
}

#[test]
fn test_walls_shield_pacman_from_ghost_scent() {
    let params = HeuristicConfig::default();
    let candidate = Position::new(2, 4);

    let walled = charging_ghost("%P %G  %");
    let open = charging_ghost("%P  G  %");

    let shielded = ScentMap::build(&walled, candidate, &params);
    let exposed = ScentMap::build(&open, candidate, &params);
    assert_eq!(shielded.value_at(candidate), 0.0);
    // -5000 at (4,4), -1500 at (3,4) after one pass, -300 at (2,4) after two
    assert_eq!(exposed.value_at(candidate), -300.0);

    let behind_wall = evaluate_action(&walled, Direction::East, &params).unwrap();
    let in_the_open = evaluate_action(&open, Direction::East, &params).unwrap();
    assert_eq!(behind_wall - in_the_open, 300.0);
}

#[test]
fn test_running_into_charging_ghost_is_rejected() {
    let params = HeuristicConfig::default();
    let s = charging_ghost("%P  G  %");
    let s = s.generate_successor(0, Direction::East).unwrap();
    // Pacman at (2,4) with the ghost two cells away; stepping next to it is fatal
    assert_eq!(
        evaluate_action(&s, Direction::East, &params).unwrap(),
        f64::NEG_INFINITY
    );
    assert!(evaluate_action(&s, Direction::West, &params).unwrap().is_finite());
}

#[test]
fn test_evaluation_is_deterministic() {
    let evaluator = HeuristicEvaluator::new(HeuristicConfig::default());
    let s = state(include_str!("../layouts/small_maze.lay"));
    let first = evaluator.evaluate(&s);
    for _ in 0..5 {
        assert_eq!(evaluator.evaluate(&s), first);
    }
    for action in s.legal_actions(0).unwrap() {
        let a = evaluate_action(&s, action, evaluator.params()).unwrap();
        let b = evaluate_action(&s, action, evaluator.params()).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_custom_tuning_changes_scores() {
    let mut params = HeuristicConfig::default();
    params.stop_penalty = 0.0;
    let s = state(
        "%%%%%%\n\
         %P  .%\n\
         %%%%%%",
    );
    let lenient = evaluate_action(&s, Direction::Stop, &params).unwrap();
    let strict = evaluate_action(&s, Direction::Stop, &HeuristicConfig::default()).unwrap();
    assert_eq!(lenient - strict, 50.0);
}
