//! # Mazeforge Command Line Entry Point
//!
//! Generates a finite maze (or a window of the endless maze), prints it as
//! ASCII and optionally writes a JSON world snapshot.

use clap::Parser;
use log::{info, LevelFilter};
use mazeforge::config::{DEFAULT_MAZE_HEIGHT, DEFAULT_MAZE_WIDTH};
use mazeforge::{
    build_spawn_data, EndlessConfig, EndlessMaze, GenerationConfig, MapGenerator, MazeError,
    MazeResult, Mulberry32, SeedInput, SpawnConfig, WorldSnapshot,
};
use std::fs;
use std::path::PathBuf;

/// Command line arguments for Mazeforge.
#[derive(Parser, Debug)]
#[command(name = "mazeforge")]
#[command(about = "Deterministic maze and endless chunked world generator")]
#[command(version)]
struct Args {
    /// Maze width in cells (rounded up to odd, at least 5)
    #[arg(long)]
    width: Option<usize>,

    /// Maze height in cells (rounded up to odd, at least 5)
    #[arg(long)]
    height: Option<usize>,

    /// Seed: an integer, a numeric string or any text
    #[arg(short, long)]
    seed: Option<String>,

    /// JSON file holding a generation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stamp rectangular rooms
    #[arg(long)]
    rooms: bool,

    /// Stamp template rooms
    #[arg(long)]
    template: bool,

    /// Remove dead ends after carving
    #[arg(long)]
    pacman: bool,

    /// Force the sampled goal search
    #[arg(long)]
    titanic: bool,

    /// Skip goal placement
    #[arg(long)]
    no_goals: bool,

    /// Write a world snapshot to this path
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Items to place in the snapshot
    #[arg(long)]
    spawn_items: Option<usize>,

    /// Enemies to place in the snapshot
    #[arg(long)]
    spawn_enemies: Option<usize>,

    /// Render the endless maze with this chunk size instead
    #[arg(long)]
    endless: Option<usize>,

    /// Endless viewport as x,y,w,h
    #[arg(long, value_parser = parse_view, default_value = "0,0,48,24")]
    view: View,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Window into the endless maze.
#[derive(Debug, Clone, Copy)]
struct View {
    x: i32,
    y: i32,
    width: usize,
    height: usize,
}

fn parse_view(text: &str) -> Result<View, String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [x, y, width, height] = parts.as_slice() else {
        return Err(format!("expected x,y,w,h, got '{}'", text));
    };
    let number = |part: &str| part.parse::<i64>().map_err(|e| format!("'{}': {}", part, e));
    let view = View {
        x: number(*x)? as i32,
        y: number(*y)? as i32,
        width: number(*width)?.max(1) as usize,
        height: number(*height)?.max(1) as usize,
    };
    Ok(view)
}

/// Integers are passed on as numbers, anything else as text.
fn parse_seed(text: &str) -> SeedInput {
    match text.trim().parse::<i64>() {
        Ok(value) => SeedInput::from(value),
        Err(_) => SeedInput::Text(text.to_string()),
    }
}

fn main() -> MazeResult<()> {
    let args = Args::parse();

    // Initialize logging
    initialize_logging(&args.log_level)?;

    info!("Starting Mazeforge v{}", mazeforge::VERSION);

    match args.endless {
        Some(chunk_size) => run_endless(&args, chunk_size),
        None => run_finite(&args),
    }
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> MazeResult<()> {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    #[cfg(feature = "dev-tools")]
    {
        use tracing_subscriber::filter::LevelFilter as TraceLevel;
        let trace_level = match level {
            LevelFilter::Off => TraceLevel::OFF,
            LevelFilter::Error => TraceLevel::ERROR,
            LevelFilter::Warn => TraceLevel::WARN,
            LevelFilter::Info => TraceLevel::INFO,
            LevelFilter::Debug => TraceLevel::DEBUG,
            LevelFilter::Trace => TraceLevel::TRACE,
        };
        tracing_subscriber::fmt()
            .with_max_level(trace_level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .filter_level(level)
            .format_target(false)
            .init();
    }

    Ok(())
}

/// Loads the config file (if any) and applies command line overrides.
fn build_config(args: &Args) -> MazeResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            serde_json::from_str::<GenerationConfig>(&json)?
        }
        None => GenerationConfig::default(),
    };

    if let Some(seed) = &args.seed {
        config.seed = Some(parse_seed(seed));
    }
    if args.rooms {
        config.rooms.get_or_insert_with(Default::default);
    }
    if args.template {
        config.template.get_or_insert_with(Default::default);
    }
    if args.pacman {
        config.pacman.get_or_insert_with(Default::default);
    }
    if args.titanic {
        config.goals.titanic = Some(true);
    }
    Ok(config)
}

/// Generates, prints and optionally snapshots a finite maze.
fn run_finite(args: &Args) -> MazeResult<()> {
    let config = build_config(args)?;
    let width = args.width.unwrap_or(DEFAULT_MAZE_WIDTH);
    let height = args.height.unwrap_or(DEFAULT_MAZE_HEIGHT);

    let mut generator = MapGenerator::new(width, height, config);
    generator.generate_maze()?;
    if !args.no_goals && !generator.config().auto_goals {
        generator.auto_place_goals()?;
    }

    let grid = generator.grid().ok_or(MazeError::MazeNotGenerated)?;
    print!("{}", grid);
    let seed = generator.seed();
    println!("seed: {} ({})", seed.value, seed.source.as_str());

    if let Some(path) = &args.snapshot {
        let defaults = SpawnConfig::default();
        let spawn_config = SpawnConfig {
            items: args.spawn_items.unwrap_or(defaults.items),
            enemies: args.spawn_enemies.unwrap_or(defaults.enemies),
        };
        let mut rng = Mulberry32::new(seed.value.wrapping_add(1));
        let spawns = build_spawn_data(grid, generator.meta(), &spawn_config, &mut rng);
        WorldSnapshot::from_generator(&generator, spawns)?.save(path)?;
        info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

/// Prints a window of the endless maze.
fn run_endless(args: &Args, chunk_size: usize) -> MazeResult<()> {
    let mut config = EndlessConfig {
        chunk_size,
        ..EndlessConfig::default()
    };
    if let Some(seed) = &args.seed {
        config.seed = Some(parse_seed(seed));
    }
    if args.rooms {
        config.rooms = Some(Default::default());
    }
    if args.template {
        config.template = Some(Default::default());
    }

    let mut maze = EndlessMaze::new(config)?;
    let view = args.view;
    let window = maze.viewport(view.x, view.y, view.width, view.height);
    print!("{}", window);
    let seed = maze.seed();
    println!(
        "seed: {} ({}), {} chunks generated",
        seed.value,
        seed.source.as_str(),
        maze.cached_chunks()
    );
    Ok(())
}
