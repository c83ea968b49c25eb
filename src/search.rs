// Adversarial search engine
//
// Minimax, alpha-beta and expectimax share one traversal. They differ only in
// how a node folds its children's values together (max, min or mean) and in
// whether an (alpha, beta) window travels down the tree. Depth counts full
// rounds: it increases when play wraps around to Pacman.

use log::debug;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::evaluation::{Evaluator, RootMove};
use crate::game::{GameError, GameState, PACMAN_INDEX};
use crate::types::Direction;

/// Search algorithm used by an engine instance
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Ghosts minimize, no pruning
    Minimax,
    /// Minimax values with (alpha, beta) pruning
    AlphaBeta,
    /// Ghosts move uniformly at random; their nodes average their children
    Expectimax,
}

impl Strategy {
    pub fn all() -> [Strategy; 3] {
        [Strategy::Minimax, Strategy::AlphaBeta, Strategy::Expectimax]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Minimax => "minimax",
            Strategy::AlphaBeta => "alpha_beta",
            Strategy::Expectimax => "expectimax",
        }
    }

    /// Aggregation rule of a node where `agent_index` is to move
    pub fn node_policy(&self, agent_index: usize) -> NodePolicy {
        if agent_index == PACMAN_INDEX {
            return NodePolicy::Maximize;
        }
        match self {
            Strategy::Minimax | Strategy::AlphaBeta => NodePolicy::Minimize,
            Strategy::Expectimax => NodePolicy::Expect,
        }
    }

    fn root_window(&self) -> Option<Window> {
        match self {
            Strategy::AlphaBeta => Some(Window::unbounded()),
            Strategy::Minimax | Strategy::Expectimax => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "minimax" => Ok(Strategy::Minimax),
            "alpha_beta" | "alphabeta" => Ok(Strategy::AlphaBeta),
            "expectimax" => Ok(Strategy::Expectimax),
            _ => Err(format!("Invalid strategy: {}", s)),
        }
    }
}

/// How a node combines its children's values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePolicy {
    Maximize,
    Minimize,
    Expect,
}

/// Pruning window: values already guaranteed to the maximizer (alpha) and
/// the minimizers (beta)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub alpha: f64,
    pub beta: f64,
}

impl Window {
    pub fn unbounded() -> Self {
        Window {
            alpha: f64::NEG_INFINITY,
            beta: f64::INFINITY,
        }
    }
}

/// Running fold of one node's children
///
/// The window is a private copy: updates are seen by later siblings and by
/// the windows handed to their subtrees, never by the parent.
#[derive(Debug, Clone, Copy)]
struct Aggregate {
    policy: NodePolicy,
    window: Option<Window>,
    best: f64,
    sum: f64,
    count: usize,
}

impl Aggregate {
    fn new(policy: NodePolicy, window: Option<Window>) -> Self {
        let best = match policy {
            NodePolicy::Maximize => f64::NEG_INFINITY,
            NodePolicy::Minimize => f64::INFINITY,
            NodePolicy::Expect => 0.0,
        };
        Aggregate {
            policy,
            window,
            best,
            sum: 0.0,
            count: 0,
        }
    }

    /// Window handed to the next child's subtree
    fn child_window(&self) -> Option<Window> {
        self.window
    }

    /// Folds a child value in. Returns true when the remaining siblings can be skipped.
    fn push(&mut self, value: f64) -> bool {
        match self.policy {
            NodePolicy::Maximize => {
                if value > self.best {
                    self.best = value;
                }
                if let Some(window) = self.window.as_mut() {
                    if self.best > window.beta {
                        return true;
                    }
                    window.alpha = window.alpha.max(self.best);
                }
            }
            NodePolicy::Minimize => {
                if value < self.best {
                    self.best = value;
                }
                if let Some(window) = self.window.as_mut() {
                    if self.best < window.alpha {
                        return true;
                    }
                    window.beta = window.beta.min(self.best);
                }
            }
            NodePolicy::Expect => {
                self.sum += value;
                self.count += 1;
            }
        }
        false
    }

    fn value(&self) -> f64 {
        match self.policy {
            NodePolicy::Maximize | NodePolicy::Minimize => self.best,
            NodePolicy::Expect => {
                if self.count == 0 {
                    0.0
                } else {
                    self.sum / self.count as f64
                }
            }
        }
    }
}

/// Counters collected over one root decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Calls into the recursive traversal (the root itself is not counted)
    pub nodes: u64,
    /// Evaluation function calls
    pub evaluations: u64,
    /// Nodes that stopped early because of the pruning window
    pub cutoffs: u64,
}

/// Root decision
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub action: Direction,
    pub value: f64,
    /// Value returned for each root action that was searched, in enumeration
    /// order. With alpha-beta, non-best entries may be bounds rather than
    /// exact values.
    pub branches: Vec<(Direction, f64)>,
    pub stats: SearchStats,
}

/// Depth-limited game-tree search for the controlled agent
pub struct SearchEngine<E> {
    strategy: Strategy,
    max_depth: u32,
    evaluator: E,
}

impl<E: Evaluator> SearchEngine<E> {
    /// Creates an engine
    ///
    /// # Arguments
    /// * `strategy` - Aggregation rule for adversary nodes
    /// * `max_depth` - Number of full rounds to look ahead
    /// * `evaluator` - Scores leaves and terminal states
    pub fn new(strategy: Strategy, max_depth: u32, evaluator: E) -> Self {
        SearchEngine {
            strategy,
            max_depth,
            evaluator,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Picks Pacman's action in `state`
    ///
    /// The root is a maximizing node sharing the interior aggregation (alpha
    /// updates and beta pruning included). The action with the strictly
    /// greatest value wins; ties go to the first action enumerated. A state
    /// with no legal root actions yields `Stop` and its own evaluation.
    ///
    /// Leaves below each root action are scored with
    /// `Evaluator::evaluate_leaf` against that action.
    pub fn choose_action(&self, state: &GameState) -> Result<SearchOutcome, GameError> {
        let mut stats = SearchStats::default();
        let actions = state.legal_actions(PACMAN_INDEX)?;

        if actions.is_empty() {
            debug!("No legal actions at the root, defaulting to stop");
            stats.evaluations += 1;
            return Ok(SearchOutcome {
                action: Direction::Stop,
                value: self.evaluator.evaluate(state),
                branches: Vec::new(),
                stats,
            });
        }

        let (next_agent, next_depth) = Self::advance(state, PACMAN_INDEX, 0);
        let mut root = Aggregate::new(NodePolicy::Maximize, self.strategy.root_window());
        let mut best: Option<(Direction, f64)> = None;
        let mut branches = Vec::with_capacity(actions.len());

        for action in actions {
            let child = state.generate_successor(PACMAN_INDEX, action)?;
            let value = self.search(
                &child,
                next_agent,
                next_depth,
                root.child_window(),
                Some(RootMove { state, action }),
                &mut stats,
            )?;
            branches.push((action, value));

            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((action, value));
            }
            if root.push(value) {
                stats.cutoffs += 1;
                break;
            }
        }

        let (action, value) = best.unwrap_or((Direction::Stop, f64::NEG_INFINITY));
        debug!(
            "{} depth {}: chose {} (value {:.2}, nodes {}, evaluations {}, cutoffs {})",
            self.strategy,
            self.max_depth,
            action,
            value,
            stats.nodes,
            stats.evaluations,
            stats.cutoffs
        );

        Ok(SearchOutcome {
            action,
            value,
            branches,
            stats,
        })
    }

    /// Value of the search node `(agent_index, depth, state)`
    ///
    /// The node is searched on its own, so leaves are scored with
    /// `Evaluator::evaluate` rather than against a root candidate.
    pub fn node_value(
        &self,
        state: &GameState,
        agent_index: usize,
        depth: u32,
    ) -> Result<f64, GameError> {
        let mut stats = SearchStats::default();
        self.search(
            state,
            agent_index,
            depth,
            self.strategy.root_window(),
            None,
            &mut stats,
        )
    }

    /// Value of Pacman committing to `action` in `state`, searched with a
    /// full window and scored against `action` at the leaves
    pub fn action_value(&self, state: &GameState, action: Direction) -> Result<f64, GameError> {
        let child = state.generate_successor(PACMAN_INDEX, action)?;
        let (next_agent, next_depth) = Self::advance(state, PACMAN_INDEX, 0);
        let mut stats = SearchStats::default();
        self.search(
            &child,
            next_agent,
            next_depth,
            self.strategy.root_window(),
            Some(RootMove { state, action }),
            &mut stats,
        )
    }

    fn leaf_value(&self, state: &GameState, root: Option<RootMove<'_>>) -> f64 {
        match root {
            Some(root) => self.evaluator.evaluate_leaf(state, root),
            None => self.evaluator.evaluate(state),
        }
    }

    /// Next agent to move and the round it moves in
    fn advance(state: &GameState, agent_index: usize, depth: u32) -> (usize, u32) {
        let next_agent = (agent_index + 1) % state.num_agents();
        let next_depth = if next_agent == PACMAN_INDEX {
            depth + 1
        } else {
            depth
        };
        (next_agent, next_depth)
    }

    fn search(
        &self,
        state: &GameState,
        agent_index: usize,
        depth: u32,
        window: Option<Window>,
        root: Option<RootMove<'_>>,
        stats: &mut SearchStats,
    ) -> Result<f64, GameError> {
        stats.nodes += 1;

        if state.is_win() || state.is_lose() || depth >= self.max_depth {
            stats.evaluations += 1;
            return Ok(self.leaf_value(state, root));
        }

        let actions = state.legal_actions(agent_index)?;
        if actions.is_empty() {
            // Boxed-in agent: score the position as it stands
            stats.evaluations += 1;
            return Ok(self.leaf_value(state, root));
        }

        let (next_agent, next_depth) = Self::advance(state, agent_index, depth);
        let mut node = Aggregate::new(self.strategy.node_policy(agent_index), window);

        for action in actions {
            let child = state.generate_successor(agent_index, action)?;
            let value =
                self.search(&child, next_agent, next_depth, node.child_window(), root, stats)?;
            if node.push(value) {
                stats.cutoffs += 1;
                break;
            }
        }

        Ok(node.value())
    }
}

/// One-shot search: `choose_action(GameState, max_depth, evaluator)`
pub fn choose_action<E: Evaluator>(
    state: &GameState,
    strategy: Strategy,
    max_depth: u32,
    evaluator: E,
) -> Result<SearchOutcome, GameError> {
    SearchEngine::new(strategy, max_depth, evaluator).choose_action(state)
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
    fn test_max_aggregate_prunes_above_beta() {
        let mut node = Aggregate::new(
            NodePolicy::Maximize,
            Some(Window {
                alpha: 0.0,
                beta: 10.0,
            }),
        );
        assert!(!node.push(4.0));
        assert_eq!(node.child_window().unwrap().alpha, 4.0);
        // Equal to beta is not enough to prune
        assert!(!node.push(10.0));
        assert!(node.push(11.0));
        assert_eq!(node.value(), 11.0);
    }

    #[test]
    fn test_min_aggregate_prunes_below_alpha() {
        let mut node = Aggregate::new(
            NodePolicy::Minimize,
            Some(Window {
                alpha: 5.0,
                beta: f64::INFINITY,
            }),
        );
        assert!(!node.push(8.0));
        assert_eq!(node.child_window().unwrap().beta, 8.0);
        assert!(!node.push(5.0));
        assert!(node.push(4.0));
        assert_eq!(node.value(), 4.0);
    }

    #[test]
    fn test_expect_aggregate_is_mean_and_never_prunes() {
        let mut node = Aggregate::new(NodePolicy::Expect, None);
        for v in [1.0, 2.0, 6.0] {
            assert!(!node.push(v));
        }
        assert_eq!(node.value(), 3.0);
    }

    #[test]
    fn test_policies_per_strategy() {
        assert_eq!(Strategy::Minimax.node_policy(0), NodePolicy::Maximize);
        assert_eq!(Strategy::AlphaBeta.node_policy(2), NodePolicy::Minimize);
        assert_eq!(Strategy::Expectimax.node_policy(1), NodePolicy::Expect);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("alpha-beta".parse::<Strategy>(), Ok(Strategy::AlphaBeta));
        assert_eq!("Expectimax".parse::<Strategy>(), Ok(Strategy::Expectimax));
        assert!("negamax".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_depth_zero_evaluates_root_children_only() {
        let s = state(
            "%%%%%%%\n\
             %     %\n\
             % P .G%\n\
             %     %\n\
             %%%%%%%",
        );
        let branching = s.legal_actions(0).unwrap().len() as u64;
        for strategy in Strategy::all() {
            let outcome = choose_action(&s, strategy, 0, ScoreEvaluator).unwrap();
            assert_eq!(outcome.stats.nodes, branching);
            assert_eq!(outcome.stats.evaluations, branching);
        }
    }

    #[test]
    fn test_ties_break_to_first_action() {
        let s = state(
            "%%%%%\n\
             %   %\n\
             % P %\n\
             %   %\n\
             %%%%%",
        );
        // No food, no ghosts: every action scores the same
        let outcome = choose_action(&s, Strategy::Minimax, 2, |_: &GameState| 1.0).unwrap();
        assert_eq!(outcome.action, Direction::North);
        assert_eq!(outcome.value, 1.0);
    }

    #[test]
    fn test_terminal_root_returns_stop() {
        let s = state(
            "%%%%%\n\
             %P.%%\n\
             %%%%%",
        );
        let won = s.generate_successor(0, Direction::East).unwrap();
        let outcome = choose_action(&won, Strategy::AlphaBeta, 3, ScoreEvaluator).unwrap();
        assert_eq!(outcome.action, Direction::Stop);
        assert_eq!(outcome.value, won.score() as f64);
        assert!(outcome.branches.is_empty());
    }

    #[test]
    fn test_pacman_only_game_terminates_at_depth_zero() {
        let s = state(
            "%%%%%\n\
             %P. %\n\
             %%%%%",
        );
        let outcome = choose_action(&s, Strategy::Minimax, 0, ScoreEvaluator).unwrap();
        assert_eq!(outcome.action, Direction::East);
        assert_eq!(outcome.stats.nodes, 2);
    }

    /// Rewards leaves that descend from a root `Stop`
    struct StopLover;

    impl Evaluator for StopLover {
        fn evaluate(&self, _state: &GameState) -> f64 {
            0.0
        }

        fn evaluate_leaf(&self, _leaf: &GameState, root: RootMove<'_>) -> f64 {
            if root.action == Direction::Stop {
                100.0
            } else {
                0.0
            }
        }
    }

    #[test]
    fn test_leaves_are_scored_against_the_root_action() {
        let s = state(
            "%%%%%%%\n\
             %P   G%\n\
             %.....%\n\
             %%%%%%%",
        );
        for strategy in Strategy::all() {
            let engine = SearchEngine::new(strategy, 2, StopLover);
            let outcome = engine.choose_action(&s).unwrap();
            assert_eq!(outcome.action, Direction::Stop, "{}", strategy);
            assert_eq!(outcome.value, 100.0, "{}", strategy);
            assert_eq!(engine.action_value(&s, Direction::East).unwrap(), 0.0);
        }

        // Without a root the state-only evaluation is used
        let engine = SearchEngine::new(Strategy::Expectimax, 2, StopLover);
        assert_eq!(engine.node_value(&s, PACMAN_INDEX, 0).unwrap(), 0.0);
    }
}
