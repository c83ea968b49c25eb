// Configuration module for reading Pacman.toml
// Every tunable constant of the rules, the heuristic and the search lives here

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::evaluation::EvaluatorKind;
use crate::search::Strategy;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub search: SearchConfig,
    pub heuristic: HeuristicConfig,
    pub rules: RulesConfig,
    pub simulation: SimulationConfig,
}

/// Adversarial search settings
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub strategy: Strategy,
    /// Number of full rounds (every agent moves once) to look ahead
    pub depth: u32,
    pub evaluator: EvaluatorKind,
}

/// Composite evaluation and heat-diffusion constants
///
/// These are hand-tuned magic numbers, not derived quantities. They are kept
/// configurable so behaviour can be compared against other tunings.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct HeuristicConfig {
    // Source injection
    pub scared_ghost_source: f64,
    pub charging_ghost_source: f64,
    pub retreating_ghost_source: f64,

    // Diffusion
    pub diffusion_passes: usize,
    pub decay: f64,
    pub source_threshold: f64,
    pub fatal_threshold: f64,

    // Global food navigation
    pub food_weight: f64,
    pub cautious_food_weight: f64,
    pub ghost_proximity: i32,
    pub food_consumed_bonus: f64,

    // Tactical corrections
    pub stop_penalty: f64,
    pub dead_end_walls: usize,
    pub dead_end_penalty: f64,
    pub refuge_threshold: f64,
}

/// Game rule constants
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RulesConfig {
    pub scared_time: u32,
    pub time_penalty: i32,
    pub food_score: i32,
    pub win_bonus: i32,
    pub lose_penalty: i32,
    pub ghost_eat_score: i32,
}

/// Which policy drives the controlled agent in the game loop
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PacmanKind {
    Search,
    Reflex,
}

/// Which policy drives the ghosts in the game loop
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Random,
    Directional,
}

/// Headless game loop settings
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub pacman: PacmanKind,
    pub ghost: GhostKind,
    pub seed: u64,
    pub max_moves: u32,
    pub ghost_attack_probability: f64,
    pub ghost_flee_probability: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        HeuristicConfig {
            scared_ghost_source: 100.0,
            charging_ghost_source: -5000.0,
            retreating_ghost_source: -200.0,
            diffusion_passes: 2,
            decay: 0.6,
            source_threshold: 500.0,
            fatal_threshold: -500.0,
            food_weight: 20.0,
            cautious_food_weight: 5.0,
            ghost_proximity: 5,
            food_consumed_bonus: 50.0,
            stop_penalty: 50.0,
            dead_end_walls: 3,
            dead_end_penalty: 5.0,
            refuge_threshold: -10.0,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            scared_time: 40,
            time_penalty: 1,
            food_score: 10,
            win_bonus: 500,
            lose_penalty: 500,
            ghost_eat_score: 200,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Pacman.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Pacman.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Pacman.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Pacman.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig {
                strategy: Strategy::Expectimax,
                depth: 2,
                evaluator: EvaluatorKind::Heuristic,
            },
            heuristic: HeuristicConfig::default(),
            rules: RulesConfig::default(),
            simulation: SimulationConfig {
                pacman: PacmanKind::Search,
                ghost: GhostKind::Directional,
                seed: 42,
                max_moves: 500,
                ghost_attack_probability: 0.8,
                ghost_flee_probability: 0.8,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Pacman.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}
