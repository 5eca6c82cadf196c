use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use blockctl::command::{CommandParameter, Instruction, Selector};
use blockctl::describe::{describe_catalog, describe_world};
use blockctl::engine::BlockCondition;
use blockctl::model::{BlockType, Direction, Primitive, Property, ReturnType};
use blockctl::registry::catalog::{catalog, instruction_schema};
use blockctl::registry::HandlerRegistry;
use blockctl::settings::{self, EngineSettings};
use blockctl::state::Session;
use blockctl::store::read_json;
use blockctl::{logging, paths, EngineError, Result};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "blockctl-cli", about = "Drive simulated blocks with property instructions", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// World file (defaults to the one named in settings)
    #[arg(long, global = true)]
    world: Option<PathBuf>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an instruction file: a JSON list of parameter sequences
    Run {
        file: PathBuf,
        /// Write the updated world back to its file
        #[arg(long)]
        save: bool,
    },
    /// Read one property from every selected block
    Get {
        block_type: BlockType,
        name: String,
        /// Treat NAME as a group
        #[arg(long)]
        group: bool,
        #[arg(long)]
        index: Option<usize>,
        #[arg(long)]
        property: Option<Property>,
        #[arg(long)]
        direction: Option<Direction>,
    },
    /// Evaluate a block condition file
    Check { file: PathBuf },
    /// List registered block types and their properties
    Catalog,
    /// JSON schema of the instruction file format
    Schema,
    /// Human-readable description of the world
    Describe,
    /// Coerce a literal the way handlers do
    Cast {
        value: String,
        #[arg(long = "to")]
        target: ReturnType,
    },
    /// Show settings, or update and save them
    Config {
        /// Default world file
        #[arg(long = "set-world")]
        set_world: Option<PathBuf>,
        /// Default log filter, e.g. "blockctl=debug"
        #[arg(long)]
        log_filter: Option<String>,
        /// Print JSON by default
        #[arg(long)]
        json_output: Option<bool>,
    },
}

// ── Session setup ────────────────────────────────────────────────

fn world_path(cli: &Cli, settings: &EngineSettings) -> Result<PathBuf> {
    cli.world
        .clone()
        .or_else(|| settings.world.clone())
        .ok_or_else(|| EngineError::invalid("no world file: pass --world or set one in settings"))
}

fn open_session(cli: &Cli, settings: &EngineSettings) -> Result<Session> {
    Session::open(&world_path(cli, settings)?)
}

// ── Commands ─────────────────────────────────────────────────────

fn run(cli: &Cli, settings: &EngineSettings) -> Result<()> {
    let json = cli.json || settings.json_output;
    match &cli.command {
        Commands::Run { file, save } => {
            let session = open_session(cli, settings)?;
            let instructions = load_instructions(file)?;
            let results = session.execute_all(&instructions)?;
            let values: Vec<Primitive> = results.into_iter().flatten().collect();
            if *save {
                session.save(None)?;
            }
            print_values(&values, json);
        }
        Commands::Get {
            block_type,
            name,
            group,
            index,
            property,
            direction,
        } => {
            let session = open_session(cli, settings)?;
            let mut selector = if *group {
                Selector::group(*block_type, name.as_str())
            } else {
                Selector::single(*block_type, name.as_str())
            };
            selector.index = *index;
            let mut instruction = Instruction::get(selector);
            instruction.property = *property;
            instruction.direction = *direction;
            print_values(&session.execute(&instruction)?, json);
        }
        Commands::Check { file } => {
            let session = open_session(cli, settings)?;
            let condition: BlockCondition = read_json(file)?;
            let holds = session.evaluate(&condition)?;
            print_json_or(json, &holds, || holds.to_string());
        }
        Commands::Catalog => {
            let entries = catalog(&HandlerRegistry::standard());
            print_json_or(json, &entries, || describe_catalog(&entries));
        }
        Commands::Schema => {
            println!("{}", pretty(&instruction_schema()));
        }
        Commands::Describe => {
            let session = open_session(cli, settings)?;
            if json {
                session.with_world(|w| println!("{}", pretty(w)));
            } else {
                println!("{}", session.with_world(describe_world));
            }
        }
        Commands::Cast { value, target } => {
            let cast = cast_literal(&parse_literal(value), *target)?;
            print_json_or(json, &cast, || cast.to_string());
        }
        Commands::Config {
            set_world,
            log_filter,
            json_output,
        } => {
            let mut updated = settings.clone();
            if let Some(world) = set_world {
                updated.world = Some(world.clone());
            }
            if let Some(filter) = log_filter {
                updated.log_filter.clone_from(filter);
            }
            if let Some(on) = json_output {
                updated.json_output = *on;
            }
            if updated != *settings {
                settings::save_settings(&paths::config_dir(), &updated)?;
                tracing::info!("settings saved");
            }
            println!("{}", pretty(&updated));
        }
    }
    Ok(())
}

fn load_instructions(path: &Path) -> Result<Vec<Instruction>> {
    let sequences: Vec<Vec<CommandParameter>> = read_json(path)?;
    sequences.into_iter().map(Instruction::from_parameters).collect()
}

/// Numbers and booleans are read as such; anything else stays a string.
fn parse_literal(text: &str) -> Primitive {
    if let Ok(n) = text.parse::<f64>() {
        Primitive::Numeric(n)
    } else if let Ok(b) = text.parse::<bool>() {
        Primitive::Boolean(b)
    } else {
        Primitive::String(text.to_string())
    }
}

fn cast_literal(value: &Primitive, target: ReturnType) -> Result<Primitive> {
    Ok(match target {
        ReturnType::Numeric => Primitive::Numeric(value.cast_number()?),
        ReturnType::Boolean => Primitive::Boolean(value.cast_boolean()?),
        ReturnType::String => Primitive::String(value.cast_string()),
        ReturnType::Vector => Primitive::Vector(value.cast_vector()?),
        ReturnType::List => Primitive::List(value.cast_list()?),
    })
}

// ── Output ───────────────────────────────────────────────────────

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn print_json_or<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce() -> String) {
    if json {
        println!("{}", pretty(value));
    } else {
        println!("{}", text());
    }
}

fn print_values(values: &[Primitive], json: bool) {
    if json {
        println!("{}", pretty(values));
        return;
    }
    for value in values {
        println!("{value}");
    }
}

fn main() {
    let cli = Cli::parse();
    let config_dir = paths::config_dir();
    let settings = settings::load_settings(&config_dir).unwrap_or_default();
    logging::init(&settings.log_filter);
    tracing::debug!(config_dir = %config_dir.display(), "settings loaded");

    if let Err(e) = run(&cli, &settings) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
