// Headless Pacman driver
//
// Usage:
//   cargo run --bin pacman -- <layout_file> [options]
//
// Options:
//   --config <path>        Path to Pacman.toml (default: Pacman.toml)
//   --strategy <name>      minimax | alpha_beta | expectimax
//   --depth <n>            Search depth in full rounds
//   --reflex               Drive Pacman with the reflex agent instead of search
//   --games <n>            Number of games to play (seeds increase per game)

use log::info;
use std::env;
use std::process;

use pacman_multiagent::config::{Config, PacmanKind};
use pacman_multiagent::layout::Layout;
use pacman_multiagent::search::Strategy;
use pacman_multiagent::simulation::{Game, Outcome};

struct Options {
    layout_path: String,
    config_path: Option<String>,
    strategy: Option<Strategy>,
    depth: Option<u32>,
    reflex: bool,
    games: u32,
}

fn print_usage() {
    eprintln!("Pacman multi-agent driver");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  pacman <layout_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>     Path to Pacman.toml (default: Pacman.toml)");
    eprintln!("  --strategy <name>   minimax | alpha_beta | expectimax");
    eprintln!("  --depth <n>         Search depth in full rounds");
    eprintln!("  --reflex            Use the reflex agent for Pacman");
    eprintln!("  --games <n>         Number of games to play (default: 1)");
    eprintln!("  --help              Show this help message");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut layout_path = None;
    let mut options = Options {
        layout_path: String::new(),
        config_path: None,
        strategy: None,
        depth: None,
        reflex: false,
        games: 1,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                options.config_path = Some(iter.next().ok_or("--config needs a path")?.clone());
            }
            "--strategy" => {
                let value = iter.next().ok_or("--strategy needs a name")?;
                options.strategy = Some(value.parse()?);
            }
            "--depth" => {
                let value = iter.next().ok_or("--depth needs a number")?;
                options.depth = Some(
                    value
                        .parse()
                        .map_err(|e| format!("Invalid depth '{}': {}", value, e))?,
                );
            }
            "--games" => {
                let value = iter.next().ok_or("--games needs a number")?;
                options.games = value
                    .parse()
                    .map_err(|e| format!("Invalid game count '{}': {}", value, e))?;
            }
            "--reflex" => options.reflex = true,
            other if other.starts_with("--") => return Err(format!("Unknown option: {}", other)),
            other => layout_path = Some(other.to_string()),
        }
    }

    options.layout_path = layout_path.ok_or("Missing layout file")?;
    Ok(options)
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(if args.is_empty() { 1 } else { 0 });
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let mut config = match &options.config_path {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    };
    if let Some(strategy) = options.strategy {
        config.search.strategy = strategy;
    }
    if let Some(depth) = options.depth {
        config.search.depth = depth;
    }
    if options.reflex {
        config.simulation.pacman = PacmanKind::Reflex;
    }

    let layout = Layout::from_file(&options.layout_path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    info!(
        "Playing {} game(s) on {} ({}x{}, {} ghosts) with {} depth {}",
        options.games,
        options.layout_path,
        layout.width(),
        layout.height(),
        layout.num_ghosts(),
        config.search.strategy,
        config.search.depth
    );

    let mut wins = 0;
    let mut total_score: i64 = 0;
    for game_number in 0..options.games {
        let mut game_config = config.clone();
        game_config.simulation.seed = config.simulation.seed.wrapping_add(game_number as u64 * 1000);

        let record = Game::from_config(&layout, &game_config).and_then(|game| game.run());
        match record {
            Ok(record) => {
                if record.outcome == Outcome::Win {
                    wins += 1;
                }
                total_score += record.score as i64;
                println!(
                    "Game {}: {:?}, score {}, {} rounds",
                    game_number + 1,
                    record.outcome,
                    record.score,
                    record.rounds
                );
            }
            Err(e) => {
                eprintln!("Error: game {} aborted: {}", game_number + 1, e);
                process::exit(1);
            }
        }
    }

    if options.games > 0 {
        println!();
        println!(
            "Win rate: {}/{} ({:.1}%), average score {:.1}",
            wins,
            options.games,
            100.0 * wins as f64 / options.games as f64,
            total_score as f64 / options.games as f64
        );
    }
}
