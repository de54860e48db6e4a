//! Binary entrypoint for the chatquest CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `start` - open the configured store and answer `<player> <command>` lines read from stdin
//! - `play --player <name> <command...>` - run a single command and print the reply
//! - `status` - print a JSON summary of the store and the active game settings
//!
//! See the library crate docs for module-level details: `chatquest::`.
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use chatquest::config::Config;
use chatquest::rpg::{RpgEngine, SledStoreBuilder};
use chatquest::validation::escape_log;

#[derive(Parser)]
#[command(name = "chatquest")]
#[command(about = "A persistent chat RPG: quests, loot, duels and raids")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer chat commands read from stdin, one `<player> <command>` per line
    Start,
    /// Write a default configuration file
    Init,
    /// Run one command for one player and print the reply
    Play {
        /// Chat username issuing the command
        #[arg(short, long)]
        player: String,
        /// Command text, e.g. `quest` or `shop sell ruby`
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Show store and configuration summary as JSON
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init has no config yet; everything else configures logging from it.
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    if !matches!(cli.command, Commands::Init) {
        init_logging(&pre_config, cli.verbose);
    }

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Created default configuration at {}", cli.config);
            println!("Edit [game] to set your shop link and bot keyword, then run `chatquest start`.");
        }
        Commands::Start => {
            let config = load_or_default(pre_config, &cli.config);
            info!("Starting chatquest v{}", env!("CARGO_PKG_VERSION"));
            let engine = open_engine(&config)?;
            run_stdin_loop(engine).await?;
        }
        Commands::Play { player, text } => {
            let config = load_or_default(pre_config, &cli.config);
            let engine = open_engine(&config)?;
            let text = text.join(" ");
            let reply = tokio::task::spawn_blocking(move || engine.handle_command(&player, &text))
                .await
                .context("command worker panicked")?;
            println!("{}", reply);
        }
        Commands::Status => {
            let config = load_or_default(pre_config, &cli.config);
            let engine = open_engine(&config)?;
            let players = engine.player_count()?;
            let summary = serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "data_dir": config.storage.data_dir,
                "players": players,
                "game": config.game,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn load_or_default(pre_config: Option<Config>, path: &str) -> Config {
    pre_config.unwrap_or_else(|| {
        warn!("No usable config at {}; using defaults", path);
        Config::default()
    })
}

fn open_engine(config: &Config) -> Result<RpgEngine> {
    std::fs::create_dir_all(&config.storage.data_dir)
        .with_context(|| format!("creating data dir {}", config.storage.data_dir))?;
    let store = SledStoreBuilder::new(&config.storage.data_dir)
        .open()
        .map_err(|e| anyhow!("Failed to open store at {}: {}", config.storage.data_dir, e))?;
    Ok(RpgEngine::new(Arc::new(store), config.game.clone()))
}

/// Read `<player> <command text>` lines until EOF or Ctrl-C.
async fn run_stdin_loop(engine: RpgEngine) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            info!("stdin closed, shutting down");
            break;
        };
        let Some((player, text)) = line.trim().split_once(char::is_whitespace) else {
            if !line.trim().is_empty() {
                warn!("ignoring line without a command: {}", escape_log(&line));
            }
            continue;
        };
        let (player, text) = (player.to_string(), text.trim().to_string());
        let worker = engine.clone();
        let shown = player.clone();
        let reply = tokio::task::spawn_blocking(move || worker.handle_command(&player, &text))
            .await
            .context("command worker panicked")?;
        println!("@{}, {}", shown.trim_start_matches('@'), reply);
    }
    Ok(())
}

/// Initialize logging based on config and verbosity
fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity; the config level applies when no -v is given
    let mut base_level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if verbosity == 0 {
        if let Some(level) = config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        {
            base_level = level;
        }
    }
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
