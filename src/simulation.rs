// Headless game loop
//
// Agents move in index order, one round at a time, until the game is won,
// lost, or the round limit is hit. An agent with no legal action skips its
// turn.

use log::{debug, info, warn};

use crate::agents::{Agent, DirectionalGhost, RandomGhost, ReflexAgent, SearchAgent};
use crate::config::{Config, GhostKind, PacmanKind};
use crate::evaluation::ConfiguredEvaluator;
use crate::game::{GameError, GameState};
use crate::layout::Layout;
use crate::types::Direction;

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    /// Round limit reached before a decisive result
    Timeout,
}

/// Summary of a finished game
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub outcome: Outcome,
    pub score: i32,
    pub rounds: u32,
    /// Every action taken, as `(agent_index, action)`
    pub history: Vec<(usize, Direction)>,
    pub final_state: GameState,
}

pub struct Game {
    state: GameState,
    agents: Vec<Box<dyn Agent>>,
    max_rounds: u32,
}

impl Game {
    /// Creates a game. `agents[i]` must control agent `i` of `state`.
    pub fn new(
        state: GameState,
        agents: Vec<Box<dyn Agent>>,
        max_rounds: u32,
    ) -> Result<Self, GameError> {
        for (slot, agent) in agents.iter().enumerate() {
            if agent.index() != slot || slot >= state.num_agents() {
                return Err(GameError::InvalidAgent {
                    index: agent.index(),
                    num_agents: state.num_agents(),
                });
            }
        }
        if agents.len() != state.num_agents() {
            return Err(GameError::InvalidAgent {
                index: agents.len(),
                num_agents: state.num_agents(),
            });
        }

        Ok(Game {
            state,
            agents,
            max_rounds,
        })
    }

    /// Builds a game on `layout` with the agents selected in `config`
    pub fn from_config(layout: &Layout, config: &Config) -> Result<Self, GameError> {
        let state = GameState::from_layout(layout, config.rules);
        let sim = &config.simulation;

        let mut agents: Vec<Box<dyn Agent>> = Vec::with_capacity(state.num_agents());
        match sim.pacman {
            PacmanKind::Search => {
                let evaluator =
                    ConfiguredEvaluator::new(config.search.evaluator, config.heuristic);
                agents.push(Box::new(SearchAgent::new(
                    config.search.strategy,
                    config.search.depth,
                    evaluator,
                )));
            }
            PacmanKind::Reflex => {
                agents.push(Box::new(ReflexAgent::new(config.heuristic, sim.seed)));
            }
        }

        for index in 1..state.num_agents() {
            let seed = sim.seed.wrapping_add(index as u64);
            let ghost: Box<dyn Agent> = match sim.ghost {
                GhostKind::Random => Box::new(RandomGhost::new(index, seed)),
                GhostKind::Directional => Box::new(DirectionalGhost::new(
                    index,
                    seed,
                    sim.ghost_attack_probability,
                    sim.ghost_flee_probability,
                )),
            };
            agents.push(ghost);
        }

        Game::new(state, agents, sim.max_moves)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Plays until a decisive result or the round limit
    pub fn run(mut self) -> Result<GameRecord, GameError> {
        let mut rounds = 0;
        let mut history = Vec::new();

        'rounds: while rounds < self.max_rounds {
            for index in 0..self.agents.len() {
                if self.state.is_terminal() {
                    break 'rounds;
                }
                if self.state.legal_actions(index)?.is_empty() {
                    debug!("Agent {} has no legal action, skipping", index);
                    continue;
                }

                let action = self.agents[index].get_action(&self.state)?;
                self.state = self.state.generate_successor(index, action)?;
                history.push((index, action));
            }
            rounds += 1;
            debug!("Round {}: score {}", rounds, self.state.score());
        }

        let outcome = if self.state.is_win() {
            Outcome::Win
        } else if self.state.is_lose() {
            Outcome::Lose
        } else {
            warn!("Game stopped after {} rounds without a result", rounds);
            Outcome::Timeout
        };
        info!(
            "Game over: {:?} with score {} after {} rounds",
            outcome,
            self.state.score(),
            rounds
        );

        Ok(GameRecord {
            outcome,
            score: self.state.score(),
            rounds,
            history,
            final_state: self.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ScoreEvaluator;
    use crate::search::Strategy;

    #[test]
    fn test_agent_count_must_match_state() {
        let layout = Layout::parse("%%%%%\n%P G%\n%%%%%").unwrap();
        let state = GameState::from_layout(&layout, Default::default());
        let agents: Vec<Box<dyn Agent>> =
            vec![Box::new(SearchAgent::new(Strategy::Minimax, 1, ScoreEvaluator))];
        assert!(matches!(
            Game::new(state, agents, 10),
            Err(GameError::InvalidAgent { .. })
        ));
    }

    #[test]
    fn test_agents_must_be_in_index_order() {
        let layout = Layout::parse("%%%%%\n%P G%\n%%%%%").unwrap();
        let state = GameState::from_layout(&layout, Default::default());
        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(RandomGhost::new(1, 0)),
            Box::new(SearchAgent::new(Strategy::Minimax, 1, ScoreEvaluator)),
        ];
        assert!(Game::new(state, agents, 10).is_err());
    }

    #[test]
    fn test_corridor_game_is_won() {
        let layout = Layout::parse(
            "%%%%%%%\n\
             %P....%\n\
             %%%%%%%",
        )
        .unwrap();
        let state = GameState::from_layout(&layout, Default::default());
        let agents: Vec<Box<dyn Agent>> =
            vec![Box::new(SearchAgent::new(Strategy::Expectimax, 2, ScoreEvaluator))];
        let record = Game::new(state, agents, 50).unwrap().run().unwrap();
        assert_eq!(record.outcome, Outcome::Win);
        assert_eq!(record.rounds, 4);
        assert_eq!(record.score, 4 * 10 - 4 + 500);
        assert!(record.history.iter().all(|&(_, a)| a == Direction::East));
    }
}
