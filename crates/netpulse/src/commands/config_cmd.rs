//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let settings = config::load_settings(global)?.redacted();
            let out = match global.output {
                // TOML reads best for a flat key/value document
                OutputFormat::Table => settings.to_toml()?,
                _ => output::render_single(
                    &global.output,
                    &settings,
                    |_| String::new(),
                    |s| s.controller_url.clone(),
                )?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = global.config.clone().unwrap_or_else(config::config_path);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
