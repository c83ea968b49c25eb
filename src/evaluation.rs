// Evaluation functions
//
// The composite heuristic is a pipeline of three layers applied to the state
// reached by a candidate action:
//   1. the diffusion scent map (walls, nearby ghosts and traps)
//   2. global navigation towards the nearest pellet
//   3. tactical corrections (passivity and dead ends)

use serde::Deserialize;

use crate::config::HeuristicConfig;
use crate::game::{GameError, GameState, PACMAN_INDEX};
use crate::heat_map::ScentMap;
use crate::types::Direction;

/// Root decision a search leaf descends from
#[derive(Debug, Clone, Copy)]
pub struct RootMove<'a> {
    /// State the decision is taken in
    pub state: &'a GameState,
    /// Pacman's candidate action at the root
    pub action: Direction,
}

/// Scores a game state from the controlled agent's point of view (higher is better)
pub trait Evaluator {
    fn evaluate(&self, state: &GameState) -> f64;

    /// Scores a search leaf reached by committing to `root.action`
    ///
    /// Action-dependent evaluations override this so the candidate being
    /// ranked, rather than Pacman's last heading, drives their action terms.
    fn evaluate_leaf(&self, leaf: &GameState, _root: RootMove<'_>) -> f64 {
        self.evaluate(leaf)
    }
}

impl<F> Evaluator for F
where
    F: Fn(&GameState) -> f64,
{
    fn evaluate(&self, state: &GameState) -> f64 {
        self(state)
    }
}

/// Evaluator selection as written in Pacman.toml
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    Score,
    Heuristic,
}

/// Default evaluator: the raw game score
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEvaluator;

impl Evaluator for ScoreEvaluator {
    fn evaluate(&self, state: &GameState) -> f64 {
        state.score() as f64
    }
}

/// Composite heuristic applied to search leaves
///
/// Inside a search, a leaf is scored as the outcome of the root candidate
/// action: the passivity penalty follows that action and the food bonus
/// counts pellets eaten anywhere on the line. Scored on its own, a state
/// falls back to Pacman's last heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator {
    params: HeuristicConfig,
}

impl HeuristicEvaluator {
    pub fn new(params: HeuristicConfig) -> Self {
        HeuristicEvaluator { params }
    }

    pub fn params(&self) -> &HeuristicConfig {
        &self.params
    }
}

impl Evaluator for HeuristicEvaluator {
    fn evaluate(&self, state: &GameState) -> f64 {
        let last_action = state.agents()[PACMAN_INDEX].direction;
        score_position(state, last_action, false, &self.params)
    }

    fn evaluate_leaf(&self, leaf: &GameState, root: RootMove<'_>) -> f64 {
        let consumed_food = leaf.num_food() < root.state.num_food();
        score_position(leaf, root.action, consumed_food, &self.params)
    }
}

/// Evaluator chosen at runtime from configuration
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredEvaluator {
    Score(ScoreEvaluator),
    Heuristic(HeuristicEvaluator),
}

impl ConfiguredEvaluator {
    pub fn new(kind: EvaluatorKind, params: HeuristicConfig) -> Self {
        match kind {
            EvaluatorKind::Score => ConfiguredEvaluator::Score(ScoreEvaluator),
            EvaluatorKind::Heuristic => {
                ConfiguredEvaluator::Heuristic(HeuristicEvaluator::new(params))
            }
        }
    }
}

impl Evaluator for ConfiguredEvaluator {
    fn evaluate(&self, state: &GameState) -> f64 {
        match self {
            ConfiguredEvaluator::Score(e) => e.evaluate(state),
            ConfiguredEvaluator::Heuristic(e) => e.evaluate(state),
        }
    }

    fn evaluate_leaf(&self, leaf: &GameState, root: RootMove<'_>) -> f64 {
        match self {
            ConfiguredEvaluator::Score(e) => e.evaluate_leaf(leaf, root),
            ConfiguredEvaluator::Heuristic(e) => e.evaluate_leaf(leaf, root),
        }
    }
}

/// Scores Pacman taking `action` in `current`
///
/// Returns negative infinity for moves the scent map marks as fatal.
///
/// # Errors
/// Propagates the rule errors of generating the successor (illegal action,
/// terminal state).
pub fn evaluate_action(
    current: &GameState,
    action: Direction,
    params: &HeuristicConfig,
) -> Result<f64, GameError> {
    let successor = current.generate_successor(PACMAN_INDEX, action)?;
    let consumed_food = successor.num_food() < current.num_food();
    Ok(score_position(&successor, action, consumed_food, params))
}

/// Composite score of the state Pacman reached by `action`
///
/// # Arguments
/// * `successor` - State after the move
/// * `action` - The move that was taken (drives the passivity penalty)
/// * `consumed_food` - Whether the move ate a pellet
/// * `params` - Heuristic constants
pub fn score_position(
    successor: &GameState,
    action: Direction,
    consumed_food: bool,
    params: &HeuristicConfig,
) -> f64 {
    let position = successor.pacman_position();
    let mut total = successor.score() as f64;

    // Layer 1: scent map
    let scent = ScentMap::build(successor, position, params);
    let diffusion = scent.value_at(position);
    if diffusion < params.fatal_threshold {
        return f64::NEG_INFINITY;
    }
    total += diffusion;

    // Layer 2: nearest pellet, throttled when a live ghost is close
    let nearest_food = successor
        .food()
        .as_list()
        .into_iter()
        .map(|food| position.manhattan(food))
        .min();
    if let Some(distance) = nearest_food {
        let weight = if scent.threat_nearby {
            params.cautious_food_weight
        } else {
            params.food_weight
        };
        total += weight / (distance as f64 + 1.0);

        if consumed_food {
            total += params.food_consumed_bonus;
        }
    }

    // Layer 3: tactical corrections
    if action == Direction::Stop {
        total -= params.stop_penalty;
    }

    // A dead end is only acceptable as a hiding place while a ghost's scent is on it
    let dead_end = successor.walls().blocked_neighbors(position) >= params.dead_end_walls;
    let hiding = diffusion < params.refuge_threshold;
    if dead_end && !hiding {
        total -= params.dead_end_penalty;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::layout::Layout;

    fn state(text: &str) -> GameState {
        GameState::from_layout(&Layout::parse(text).unwrap(), RulesConfig::default())
    }

    #[test]
    fn test_score_evaluator_returns_raw_score() {
        let s = state("%%%%\n%P.%\n%%%%").with_score(-37);
        assert_eq!(ScoreEvaluator.evaluate(&s), -37.0);
    }

    #[test]
    fn test_closures_are_evaluators() {
        let s = state("%%%%\n%P.%\n%%%%");
        let food_count = |g: &GameState| g.num_food() as f64;
        assert_eq!(food_count.evaluate(&s), 1.0);
    }

    #[test]
    fn test_stop_is_penalised() {
        let s = state(
            "%%%%%%%\n\
             %     %\n\
             % P  .%\n\
             %     %\n\
             %%%%%%%",
        );
        let params = HeuristicConfig::default();
        let stop = evaluate_action(&s, Direction::Stop, &params).unwrap();
        let east = evaluate_action(&s, Direction::East, &params).unwrap();
        // Stop: -1 + 20 / (3 + 1) - 50; East: -1 + 20 / (2 + 1)
        assert_eq!(stop, -1.0 + 5.0 - 50.0);
        assert_eq!(east, -1.0 + 20.0 / 3.0);
    }

    #[test]
    fn test_eating_food_earns_bonus() {
        let s = state(
            "%%%%%%\n\
             %P.  %\n\
             %   .%\n\
             %%%%%%",
        );
        let params = HeuristicConfig::default();
        let east = evaluate_action(&s, Direction::East, &params).unwrap();
        // -1 + 10 for the pellet, nearest remaining pellet at distance 3, +50 bonus
        assert_eq!(east, 9.0 + 20.0 / 4.0 + 50.0);
    }

    #[test]
    fn test_charging_ghost_is_fatal() {
        let s = state(
            "%%%%%%%%\n\
             %P  G .%\n\
             %%%%%%%%",
        );
        // Let the ghost commit to heading west, towards Pacman
        let charging = s
            .generate_successor(0, Direction::Stop)
            .and_then(|s| s.generate_successor(1, Direction::West))
            .unwrap();
        let params = HeuristicConfig::default();
        let value = evaluate_action(&charging, Direction::East, &params).unwrap();
        assert_eq!(value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_evaluate_action_rejects_illegal_move() {
        let s = state("%%%%\n%P.%\n%%%%");
        let params = HeuristicConfig::default();
        assert!(matches!(
            evaluate_action(&s, Direction::West, &params),
            Err(GameError::IllegalAction { .. })
        ));
    }

    #[test]
    fn test_heuristic_evaluator_uses_last_heading() {
        let s = state(
            "%%%%%%%\n\
             %     %\n\
             % P  .%\n\
             %     %\n\
             %%%%%%%",
        );
        let params = HeuristicConfig::default();
        let evaluator = HeuristicEvaluator::new(params);
        let stopped = s.generate_successor(0, Direction::Stop).unwrap();
        assert_eq!(
            evaluator.evaluate(&stopped),
            evaluate_action(&s, Direction::Stop, &params).unwrap()
        );
    }
}
