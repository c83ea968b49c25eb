// Compares the three search strategies on the initial state of a layout
//
// Usage:
//   cargo run --bin search_stats -- <layout_file> [--depth <n>] [--score] [--config <path>]
//
// For each strategy prints the chosen action, the root value, and the node,
// evaluation and cutoff counts. Minimax and alpha-beta must agree on both the
// action and the value; a disagreement exits with status 2.

use std::env;
use std::process;

use pacman_multiagent::config::Config;
use pacman_multiagent::evaluation::{ConfiguredEvaluator, EvaluatorKind};
use pacman_multiagent::game::GameState;
use pacman_multiagent::layout::Layout;
use pacman_multiagent::search::{SearchEngine, SearchOutcome, Strategy};

fn print_usage() {
    eprintln!("Search strategy comparison");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  search_stats <layout_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --depth <n>       Search depth in full rounds (default: from config)");
    eprintln!("  --score           Evaluate leaves with the raw score");
    eprintln!("  --config <path>   Path to Pacman.toml (default: Pacman.toml)");
}

fn run(state: &GameState, strategy: Strategy, depth: u32, evaluator: ConfiguredEvaluator) -> SearchOutcome {
    SearchEngine::new(strategy, depth, evaluator)
        .choose_action(state)
        .unwrap_or_else(|e| {
            eprintln!("Error: {} search failed: {}", strategy, e);
            process::exit(1);
        })
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut layout_path = None;
    let mut depth = None;
    let mut use_score = false;
    let mut config_path = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--depth" => {
                i += 1;
                depth = args.get(i).and_then(|d| d.parse::<u32>().ok());
                if depth.is_none() {
                    eprintln!("Error: --depth needs a non-negative integer");
                    process::exit(1);
                }
            }
            "--score" => use_score = true,
            "--config" => {
                i += 1;
                config_path = args.get(i).cloned();
            }
            "--help" => {
                print_usage();
                return;
            }
            other => layout_path = Some(other.to_string()),
        }
        i += 1;
    }

    let Some(layout_path) = layout_path else {
        print_usage();
        process::exit(1);
    };

    let config = match config_path {
        Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    };
    let layout = Layout::from_file(&layout_path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let depth = depth.unwrap_or(config.search.depth);
    let kind = if use_score {
        EvaluatorKind::Score
    } else {
        config.search.evaluator
    };
    let evaluator = ConfiguredEvaluator::new(kind, config.heuristic);
    let state = GameState::from_layout(&layout, config.rules);

    println!("Layout: {} ({} ghosts), depth {}, evaluator {:?}", layout_path, layout.num_ghosts(), depth, kind);
    println!(
        "{:<12} {:<8} {:>12} {:>10} {:>12} {:>8}",
        "strategy", "action", "value", "nodes", "evaluations", "cutoffs"
    );

    let mut outcomes = Vec::new();
    for strategy in Strategy::all() {
        let outcome = run(&state, strategy, depth, evaluator);
        println!(
            "{:<12} {:<8} {:>12.3} {:>10} {:>12} {:>8}",
            strategy.as_str(),
            outcome.action.as_str(),
            outcome.value,
            outcome.stats.nodes,
            outcome.stats.evaluations,
            outcome.stats.cutoffs
        );
        outcomes.push((strategy, outcome));
    }

    let minimax = &outcomes[0].1;
    let alpha_beta = &outcomes[1].1;
    if minimax.action != alpha_beta.action || minimax.value != alpha_beta.value {
        eprintln!(
            "MISMATCH: minimax chose {} ({}), alpha-beta chose {} ({})",
            minimax.action, minimax.value, alpha_beta.action, alpha_beta.value
        );
        process::exit(2);
    }

    if minimax.stats.nodes > 0 {
        println!();
        println!(
            "Alpha-beta visited {:.1}% of the minimax nodes",
            100.0 * alpha_beta.stats.nodes as f64 / minimax.stats.nodes as f64
        );
    }
}
