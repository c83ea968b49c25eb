// Agents that pick actions inside the game loop
//
// Pacman is driven either by the adversarial search engine or by a one-ply
// reflex agent over the composite evaluation. Ghosts are either uniformly
// random or directional (mostly chase, mostly flee while scared).

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HeuristicConfig;
use crate::evaluation::{evaluate_action, Evaluator};
use crate::game::{GameError, GameState, PACMAN_INDEX};
use crate::search::{SearchEngine, Strategy};
use crate::types::Direction;

pub trait Agent {
    /// Index of the agent this policy controls
    fn index(&self) -> usize;

    /// Chooses an action for `state`. Only called when the agent has legal actions.
    fn get_action(&mut self, state: &GameState) -> Result<Direction, GameError>;
}

/// Pacman driven by minimax, alpha-beta or expectimax
pub struct SearchAgent<E> {
    engine: SearchEngine<E>,
}

impl<E: Evaluator> SearchAgent<E> {
    pub fn new(strategy: Strategy, depth: u32, evaluator: E) -> Self {
        SearchAgent {
            engine: SearchEngine::new(strategy, depth, evaluator),
        }
    }
}

impl<E: Evaluator> Agent for SearchAgent<E> {
    fn index(&self) -> usize {
        PACMAN_INDEX
    }

    fn get_action(&mut self, state: &GameState) -> Result<Direction, GameError> {
        let outcome = self.engine.choose_action(state)?;
        info!(
            "{} chose {} (value {:.2}, {} nodes)",
            self.engine.strategy(),
            outcome.action,
            outcome.value,
            outcome.stats.nodes
        );
        Ok(outcome.action)
    }
}

/// Pacman choosing the best immediate action under the composite evaluation
///
/// Ties between equally scored actions are broken at random.
pub struct ReflexAgent {
    params: HeuristicConfig,
    rng: StdRng,
}

impl ReflexAgent {
    pub fn new(params: HeuristicConfig, seed: u64) -> Self {
        ReflexAgent {
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Composite score of every legal action, in enumeration order
    pub fn score_actions(&self, state: &GameState) -> Result<Vec<(Direction, f64)>, GameError> {
        state
            .legal_actions(PACMAN_INDEX)?
            .into_iter()
            .map(|action| Ok((action, evaluate_action(state, action, &self.params)?)))
            .collect()
    }
}

impl Agent for ReflexAgent {
    fn index(&self) -> usize {
        PACMAN_INDEX
    }

    fn get_action(&mut self, state: &GameState) -> Result<Direction, GameError> {
        let scored = self.score_actions(state)?;
        let best_score = scored
            .iter()
            .map(|&(_, score)| score)
            .fold(f64::NEG_INFINITY, f64::max);
        let best: Vec<Direction> = scored
            .iter()
            .filter(|&&(_, score)| score == best_score)
            .map(|&(action, _)| action)
            .collect();

        if best.is_empty() {
            return Ok(Direction::Stop);
        }
        let chosen = best[self.rng.random_range(0..best.len())];
        debug!(
            "Reflex chose {} (score {:.2}, {} tied)",
            chosen,
            best_score,
            best.len()
        );
        Ok(chosen)
    }
}

/// Ghost picking uniformly among its legal actions
pub struct RandomGhost {
    index: usize,
    rng: StdRng,
}

impl RandomGhost {
    pub fn new(index: usize, seed: u64) -> Self {
        RandomGhost {
            index,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomGhost {
    fn index(&self) -> usize {
        self.index
    }

    fn get_action(&mut self, state: &GameState) -> Result<Direction, GameError> {
        let legal = state.legal_actions(self.index)?;
        if legal.is_empty() {
            return Ok(Direction::Stop);
        }
        Ok(legal[self.rng.random_range(0..legal.len())])
    }
}

/// Ghost that prefers closing in on Pacman, or moving away while scared
pub struct DirectionalGhost {
    index: usize,
    rng: StdRng,
    prob_attack: f64,
    prob_flee: f64,
}

impl DirectionalGhost {
    pub fn new(index: usize, seed: u64, prob_attack: f64, prob_flee: f64) -> Self {
        DirectionalGhost {
            index,
            rng: StdRng::seed_from_u64(seed),
            prob_attack,
            prob_flee,
        }
    }

    /// Probability of each legal action
    ///
    /// The preferred actions (nearest to Pacman, or farthest while scared)
    /// share `prob_attack` / `prob_flee`; the remainder is spread evenly over
    /// every legal action.
    pub fn distribution(&self, state: &GameState) -> Result<Vec<(Direction, f64)>, GameError> {
        let ghost = state.agent_state(self.index)?;
        let legal = state.legal_actions(self.index)?;
        if legal.is_empty() {
            return Ok(Vec::new());
        }

        let pacman = state.pacman_position();
        let distances: Vec<i32> = legal
            .iter()
            .map(|dir| dir.apply(&ghost.position).manhattan(pacman))
            .collect();

        let (best_distance, best_prob) = if ghost.is_scared() {
            (distances.iter().copied().max(), self.prob_flee)
        } else {
            (distances.iter().copied().min(), self.prob_attack)
        };
        let best_distance = best_distance.unwrap_or_default();
        let best_count = distances.iter().filter(|&&d| d == best_distance).count();

        let spread = (1.0 - best_prob) / legal.len() as f64;
        let mut weights: Vec<(Direction, f64)> = legal
            .iter()
            .zip(&distances)
            .map(|(&dir, &d)| {
                let preferred = if d == best_distance {
                    best_prob / best_count as f64
                } else {
                    0.0
                };
                (dir, preferred + spread)
            })
            .collect();

        let total: f64 = weights.iter().map(|&(_, w)| w).sum();
        if total > 0.0 {
            for entry in weights.iter_mut() {
                entry.1 /= total;
            }
        }
        Ok(weights)
    }
}

impl Agent for DirectionalGhost {
    fn index(&self) -> usize {
        self.index
    }

    fn get_action(&mut self, state: &GameState) -> Result<Direction, GameError> {
        let distribution = self.distribution(state)?;
        let Some(&(fallback, _)) = distribution.last() else {
            return Ok(Direction::Stop);
        };

        let mut roll: f64 = self.rng.random::<f64>();
        for &(action, probability) in &distribution {
            if roll < probability {
                return Ok(action);
            }
            roll -= probability;
        }
        Ok(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::evaluation::ScoreEvaluator;
    use crate::layout::Layout;

    fn state(text: &str) -> GameState {
        GameState::from_layout(&Layout::parse(text).unwrap(), RulesConfig::default())
    }

    #[test]
    fn test_directional_ghost_prefers_closing_in() {
        let s = state(
            "%%%%%%%\n\
             %P   G%\n\
             %%%%% %\n\
             %%%%%%%",
        );
        let ghost = DirectionalGhost::new(1, 7, 0.8, 0.8);
        let dist = ghost.distribution(&s).unwrap();
        // West closes in, South moves away
        assert_eq!(dist.len(), 2);
        let west = dist.iter().find(|(d, _)| *d == Direction::West).unwrap().1;
        let south = dist.iter().find(|(d, _)| *d == Direction::South).unwrap().1;
        assert!((west - 0.9).abs() < 1e-12);
        assert!((south - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_random_ghost_only_plays_legal_moves() {
        let s = state(
            "%%%%%%%\n\
             %P   G%\n\
             %%%%% %\n\
             %%%%%%%",
        );
        let mut ghost = RandomGhost::new(1, 3);
        let legal = s.legal_actions(1).unwrap();
        for _ in 0..20 {
            assert!(legal.contains(&ghost.get_action(&s).unwrap()));
        }
    }

    #[test]
    fn test_reflex_agent_walks_to_food() {
        let s = state(
            "%%%%%%\n\
             %P  .%\n\
             %%%%%%",
        );
        let mut agent = ReflexAgent::new(HeuristicConfig::default(), 1);
        assert_eq!(agent.get_action(&s).unwrap(), Direction::East);
    }

    #[test]
    fn test_search_agent_returns_engine_choice() {
        let s = state(
            "%%%%%%\n\
             %P. .%\n\
             %%%%%%",
        );
        let mut agent = SearchAgent::new(Strategy::Minimax, 1, ScoreEvaluator);
        assert_eq!(agent.get_action(&s).unwrap(), Direction::East);
        assert_eq!(agent.index(), PACMAN_INDEX);
    }
}
