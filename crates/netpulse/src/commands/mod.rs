//! Command dispatch: bridges CLI args -> aggregator -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod health;
pub mod history;
pub mod status;
pub mod tunnel;
pub mod util;

use netpulse_core::ResultStore;
use tracing::debug;

use crate::backend;
use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        // No validated configuration needed
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = crate::cli::Cli::command();
            generate(args.shell, &mut cmd, "netpulse", &mut std::io::stdout());
            Ok(())
        }

        Command::History(args) => {
            let config = config::resolve(global)?;
            history::handle(&ResultStore::new(&config.results_dir), &args, global)
        }

        cmd => {
            let config = config::resolve(global)?;
            debug!(
                backend = %config.backend,
                controller = %config.controller.url,
                "building aggregator"
            );
            let aggregator = backend::build_aggregator(&config)?;
            let store = ResultStore::new(&config.results_dir);

            match cmd {
                Command::Status(args) => status::handle(&aggregator, &store, &args, global).await,
                Command::Devices(args) => {
                    devices::handle(&aggregator, &store, &config, args, global).await
                }
                Command::Health(args) => {
                    health::handle(&aggregator, &store, &config, &args, global).await
                }
                Command::Tunnel => tunnel::handle(&aggregator, global).await,
                Command::History(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
            }
        }
    }
}
