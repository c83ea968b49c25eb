// Library exports for the Pacman multi-agent search core
// The binaries (pacman, search_stats) and the integration tests build on these

pub mod agents;
pub mod config;
pub mod evaluation;
pub mod game;
pub mod grid;
pub mod heat_map;
pub mod layout;
pub mod search;
pub mod simulation;
pub mod types;
