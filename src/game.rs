// Game state and transition rules
//
// A GameState is an immutable snapshot. Every transition goes through
// `generate_successor`, which returns a fresh state and leaves the receiver
// untouched, so search branches can never interfere with each other.

use std::sync::Arc;

use crate::config::RulesConfig;
use crate::grid::Grid;
use crate::layout::Layout;
use crate::types::{Direction, Position};

/// Index of the controlled (maximizing) agent
pub const PACMAN_INDEX: usize = 0;

/// Errors raised by contract violations against the game rules
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("agent index {index} is out of range (game has {num_agents} agents)")]
    InvalidAgent { index: usize, num_agents: usize },

    #[error("action {action} is not legal for agent {agent}")]
    IllegalAction { agent: usize, action: Direction },

    #[error("cannot generate a successor of a terminal state")]
    TerminalState,
}

/// Per-agent state: Pacman at index 0, ghosts at 1..N
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    pub index: usize,
    pub start: Position,
    pub position: Position,
    /// Last action taken; `Stop` before the first move
    pub direction: Direction,
    /// Moves left while a ghost is scared (harmless and edible)
    pub scared_timer: u32,
}

impl AgentState {
    pub fn new(index: usize, start: Position) -> Self {
        AgentState {
            index,
            start,
            position: start,
            direction: Direction::Stop,
            scared_timer: 0,
        }
    }

    pub fn is_pacman(&self) -> bool {
        self.index == PACMAN_INDEX
    }

    pub fn is_scared(&self) -> bool {
        self.scared_timer > 0
    }

    /// Puts a ghost back on its start cell after being eaten
    fn respawn(&mut self) {
        self.position = self.start;
        self.direction = Direction::Stop;
        self.scared_timer = 0;
    }
}

/// Immutable snapshot of a game in progress
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    walls: Arc<Grid>,
    food: Arc<Grid>,
    capsules: Vec<Position>,
    agents: Vec<AgentState>,
    score: i32,
    win: bool,
    lose: bool,
    rules: RulesConfig,
}

impl GameState {
    /// Builds the initial state of a layout
    pub fn from_layout(layout: &Layout, rules: RulesConfig) -> Self {
        let agents = layout
            .agent_starts()
            .iter()
            .enumerate()
            .map(|(index, &start)| AgentState::new(index, start))
            .collect();

        GameState {
            walls: Arc::new(layout.walls().clone()),
            food: Arc::new(layout.food().clone()),
            capsules: layout.capsules().to_vec(),
            agents,
            score: 0,
            win: false,
            lose: false,
            rules,
        }
    }

    /// Builds a state from explicit parts. The first agent is Pacman, so
    /// `agents` must not be empty.
    pub fn new(
        walls: Grid,
        food: Grid,
        capsules: Vec<Position>,
        agents: Vec<AgentState>,
        rules: RulesConfig,
    ) -> Result<Self, GameError> {
        if agents.is_empty() {
            return Err(GameError::InvalidAgent {
                index: PACMAN_INDEX,
                num_agents: 0,
            });
        }
        Ok(GameState {
            walls: Arc::new(walls),
            food: Arc::new(food),
            capsules,
            agents,
            score: 0,
            win: false,
            lose: false,
            rules,
        })
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn agent_state(&self, index: usize) -> Result<&AgentState, GameError> {
        self.agents.get(index).ok_or(GameError::InvalidAgent {
            index,
            num_agents: self.agents.len(),
        })
    }

    pub fn agents(&self) -> &[AgentState] {
        &self.agents
    }

    pub fn ghost_states(&self) -> &[AgentState] {
        self.agents.get(1..).unwrap_or(&[])
    }

    pub fn pacman_position(&self) -> Position {
        self.agents[PACMAN_INDEX].position
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn is_win(&self) -> bool {
        self.win
    }

    pub fn is_lose(&self) -> bool {
        self.lose
    }

    pub fn is_terminal(&self) -> bool {
        self.win || self.lose
    }

    pub fn walls(&self) -> &Grid {
        &self.walls
    }

    pub fn food(&self) -> &Grid {
        &self.food
    }

    pub fn num_food(&self) -> usize {
        self.food.count()
    }

    pub fn capsules(&self) -> &[Position] {
        &self.capsules
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Walls query; anything outside the board is a wall
    pub fn has_wall(&self, pos: Position) -> bool {
        self.walls.is_blocked(pos)
    }

    pub fn has_food(&self, pos: Position) -> bool {
        self.food.get(pos)
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.score = score;
        self
    }

    /// Replaces the state of one agent, keeping its index consistent
    pub fn with_agent(mut self, agent: AgentState) -> Result<Self, GameError> {
        let num_agents = self.agents.len();
        let slot = self
            .agents
            .get_mut(agent.index)
            .ok_or(GameError::InvalidAgent {
                index: agent.index,
                num_agents,
            })?;
        *slot = agent;
        Ok(self)
    }

    /// Directions an agent can take from its current cell
    ///
    /// Pacman may move into any open neighbour or stop. Ghosts cannot stop and
    /// cannot reverse unless reversing is their only option. Terminal states
    /// have no legal actions.
    pub fn legal_actions(&self, agent_index: usize) -> Result<Vec<Direction>, GameError> {
        let agent = self.agent_state(agent_index)?;
        if self.is_terminal() {
            return Ok(Vec::new());
        }

        let open: Vec<Direction> = Direction::all()
            .iter()
            .filter(|dir| !self.has_wall(dir.apply(&agent.position)))
            .copied()
            .collect();

        if agent.is_pacman() {
            return Ok(open);
        }

        let mut moves: Vec<Direction> = open
            .into_iter()
            .filter(|&dir| dir != Direction::Stop)
            .collect();
        let reverse = agent.direction.reverse();
        if moves.len() > 1 && moves.contains(&reverse) {
            moves.retain(|&dir| dir != reverse);
        }
        Ok(moves)
    }

    /// Returns the state reached when `agent_index` takes `action`
    pub fn generate_successor(
        &self,
        agent_index: usize,
        action: Direction,
    ) -> Result<GameState, GameError> {
        self.agent_state(agent_index)?;
        if self.is_terminal() {
            return Err(GameError::TerminalState);
        }
        if !self.legal_actions(agent_index)?.contains(&action) {
            return Err(GameError::IllegalAction {
                agent: agent_index,
                action,
            });
        }

        let mut next = self.clone();
        if agent_index == PACMAN_INDEX {
            next.apply_pacman_move(action);
            for ghost in 1..next.agents.len() {
                next.check_collision(ghost);
            }
        } else {
            next.apply_ghost_move(agent_index, action);
            next.check_collision(agent_index);
        }
        Ok(next)
    }

    fn apply_pacman_move(&mut self, action: Direction) {
        let pacman = &mut self.agents[PACMAN_INDEX];
        pacman.position = action.apply(&pacman.position);
        pacman.direction = action;
        let position = pacman.position;

        self.score -= self.rules.time_penalty;

        if self.food.get(position) {
            Arc::make_mut(&mut self.food).set(position, false);
            self.score += self.rules.food_score;
            if self.food.count() == 0 && !self.lose {
                self.score += self.rules.win_bonus;
                self.win = true;
            }
        }

        if let Some(idx) = self.capsules.iter().position(|&c| c == position) {
            self.capsules.remove(idx);
            let scared_time = self.rules.scared_time;
            for ghost in self.agents.iter_mut().skip(1) {
                ghost.scared_timer = scared_time;
            }
        }
    }

    fn apply_ghost_move(&mut self, agent_index: usize, action: Direction) {
        let ghost = &mut self.agents[agent_index];
        ghost.position = action.apply(&ghost.position);
        ghost.direction = action;
        ghost.scared_timer = ghost.scared_timer.saturating_sub(1);
    }

    /// Resolves Pacman meeting ghost `ghost_index` on the same cell
    fn check_collision(&mut self, ghost_index: usize) {
        let pacman_position = self.agents[PACMAN_INDEX].position;
        let ghost = &mut self.agents[ghost_index];
        if ghost.position != pacman_position {
            return;
        }

        if ghost.is_scared() {
            ghost.respawn();
            self.score += self.rules.ghost_eat_score;
        } else if !self.win {
            self.score -= self.rules.lose_penalty;
            self.lose = true;
        }
    }
}
