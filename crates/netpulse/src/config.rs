//! CLI configuration: thin wrapper around `netpulse_config`.
//!
//! Translates `GlobalOpts` flags into the top configuration layer.

use netpulse_config::{Backend, LoadOptions, Overrides, ResolvedConfig, Settings};

use crate::cli::{BackendArg, GlobalOpts};
use crate::error::CliError;

pub use netpulse_config::config_path;

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Live => Backend::Live,
            BackendArg::Simulated => Backend::Simulated,
        }
    }
}

/// Layer sources plus the flag overrides from `global`.
pub fn load_options(global: &GlobalOpts) -> LoadOptions {
    LoadOptions {
        config_file: global.config.clone(),
        env_file: Some(global.env_file.clone()),
        overrides: Overrides {
            controller_url: global.controller.clone(),
            controller_username: global.username.clone(),
            // --insecure only ever relaxes verification
            verify_tls: global.insecure.then_some(false),
            timeout_secs: global.timeout,
            backend: global.backend.map(Backend::from),
            results_dir: global.results_dir.clone(),
        },
    }
}

/// Merged settings, unvalidated.
pub fn load_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    Ok(netpulse_config::load_settings(&load_options(global))?)
}

/// Merged and validated runtime configuration.
pub fn resolve(global: &GlobalOpts) -> Result<ResolvedConfig, CliError> {
    Ok(load_settings(global)?.resolve()?)
}
