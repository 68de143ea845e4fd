//! `serve`: run the HTTP server, or only check the configuration.

use crate::config::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }

    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            for line in self.dry_run_report()? {
                println!("{}", line);
            }
            return Ok(());
        }

        Server::new(self.config).run().await
    }

    /// Validate the configuration and describe what `serve` would start.
    pub fn dry_run_report(&self) -> AppResult<Vec<String>> {
        self.config.validate()?;

        let reminders = &self.config.reminders;
        let worker = if reminders.enabled {
            format!("enabled, sweeping on '{}'", reminders.poll_cron)
        } else {
            "disabled".to_string()
        };

        Ok(vec![
            "✓ Configuration is valid".to_string(),
            format!("✓ Server would bind to: {}", self.config.server.address()),
            format!("✓ Reminders fire {}h before each lesson", reminders.lead_time_hours),
            format!("✓ Reminder worker: {}", worker),
            format!("✓ Mail backend: {:?}", self.config.mail.backend),
        ])
    }
}
