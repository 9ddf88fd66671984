use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod cli;
mod state;

use cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to chat when no subcommand is given.
        None => {
            init_tracing("warn");
            let (config, _) = cli::load_config()?;
            cli::chat::chat(Arc::new(config), "cli:chat".into(), None).await
        }
        Some(Command::Chat { session, document }) => {
            init_tracing("warn");
            let (config, _) = cli::load_config()?;
            cli::chat::chat(Arc::new(config), session, document).await
        }
        Some(Command::Run { message, session }) => {
            init_tracing("warn");
            let (config, _) = cli::load_config()?;
            cli::run::run(Arc::new(config), message, session).await
        }
        Some(Command::Doctor) => {
            let (config, config_path) = cli::load_config()?;
            let passed = cli::doctor::run(&config, &config_path).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cli::load_config()?;
            let valid = cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = cli::load_config()?;
            cli::config::show(&config);
            Ok(())
        }
        Some(Command::Version) => {
            println!("supportdesk {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Compact stderr-only tracing so diagnostics never pollute stdout.
///
/// `RUST_LOG` overrides the default filter; routing decisions are
/// visible with e.g. `RUST_LOG=sd_router=debug`.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
