pub mod chat;
pub mod config;
pub mod doctor;
pub mod run;

use clap::{Parser, Subcommand};

/// supportdesk — an AI customer-support assistant for the terminal.
#[derive(Debug, Parser)]
#[command(name = "supportdesk", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive chat session (default when no subcommand
    /// is given).
    Chat {
        /// Session key (defaults to "cli:chat").
        #[arg(long, default_value = "cli:chat")]
        session: String,
        /// Path to a text document to index before the first message.
        #[arg(long)]
        document: Option<String>,
    },
    /// Send a single message and print the reply.
    Run {
        /// The message to send.
        message: String,
        /// Session key (defaults to "cli:run").
        #[arg(long, default_value = "cli:run")]
        session: String,
    },
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `SUPPORTDESK_CONFIG`
/// (or `config.toml` by default). Returns the parsed config and the path
/// that was used.
///
/// Shared by every subcommand so the logic lives in one place.
pub fn load_config() -> anyhow::Result<(sd_domain::config::Config, String)> {
    let config_path =
        std::env::var("SUPPORTDESK_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        sd_domain::config::Config::default()
    };

    Ok((config, config_path))
}
