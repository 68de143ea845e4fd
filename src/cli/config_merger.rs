//! Command-line overrides on top of file and environment configuration.
//!
//! Precedence, highest first: subcommand flags (`serve --port`), global flags
//! (`--verbose`), environment variables, configuration files.

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Settings};

pub struct ConfigurationMerger {
    loader: ConfigLoader,
}

impl ConfigurationMerger {
    pub fn new(loader: ConfigLoader) -> Self {
        Self { loader }
    }

    /// Loader for `cli`: the `--config` file when given, the layered
    /// directory otherwise, with `--env` replacing `COURSEREG_APP_ENV`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match &cli.config {
            Some(path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };

        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };

        Ok(Self::new(loader))
    }

    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }

    /// Load every source, apply `cli` and validate the result.
    pub fn load(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let settings = self.loader.load_unvalidated()?;
        self.loader.finalize(apply_cli_overrides(settings, cli))
    }
}

/// Apply flag overrides without validating.
pub fn apply_cli_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if cli.verbose {
        settings.logger.level = "debug".to_string();
    } else if cli.quiet {
        settings.logger.level = "error".to_string();
    }

    if let Some(Commands::Serve {
        host,
        port,
        log_level,
        ..
    }) = &cli.command
    {
        if let Some(host) = host {
            settings.server.host = host.clone();
        }
        if let Some(port) = port {
            settings.server.port = *port;
        }
        if let Some(level) = log_level {
            settings.logger.level = level.as_str().to_string();
        }
    }

    settings
}
