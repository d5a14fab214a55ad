use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;

use foundrmate::agent::TaskRouter;
use foundrmate::auth::secret_store;
use foundrmate::config::{load_config, viewer_log_path};
use foundrmate::server::run_server;
use foundrmate::terminal::run_tui;

#[derive(Parser)]
#[command(name = "foundrmate")]
#[command(about = "Intent router service and terminal email viewer", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/foundrmate/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve POST /agent/execute
    Serve {
        /// Address to bind, overrides `listen_addr` from the config
        #[arg(long)]
        listen: Option<String>,
    },

    /// Run the email viewer TUI
    Viewer,

    /// Store the Groq API key in keyring
    SetApiKey,
}

fn init_logging(to_file: Option<PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = to_file {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::SetApiKey => {
            init_logging(None)?;
            eprintln!("Paste Groq API key (end with Ctrl-D):");
            let mut key = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut key)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow!("no API key given"));
            }
            secret_store::save_groq_api_key(key)?;
            println!("Saved Groq API key in keyring");
            Ok(())
        }

        Command::Serve { listen } => {
            init_logging(None)?;
            let cfg = load_config(cli.config.as_deref())
                .map_err(|e| anyhow!("Configuration error: {e:#}"))?;
            let api_key = secret_store::resolve_groq_api_key()?;
            let router = TaskRouter::from_config(&cfg, api_key)?;
            let addr = listen.unwrap_or_else(|| cfg.listen_addr());
            run_server(&addr, &router)
        }

        Command::Viewer => {
            // the TUI owns the terminal, so logs go to a file
            init_logging(Some(viewer_log_path()?))?;
            let cfg = load_config(cli.config.as_deref())
                .map_err(|e| anyhow!("Configuration error: {e:#}"))?;
            run_tui(&cfg)
        }
    }
}
