//! Configuration validation logic
//!
//! Each section validates itself and reports the first offending key as a
//! dotted path (`reminders.lead_time_hours`).

use tokio_cron_scheduler::Job;

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, JwtConfig, LoggerSettings, MailBackend, MailSettings,
    ReminderSettings, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const MIN_JWT_SECRET_LEN: usize = 32;

/// One year.
const MAX_LEAD_TIME_HOURS: i64 = 24 * 366;

impl ServerConfig {
    /// Port must be non-zero and both timeouts positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must be a non-empty `postgres://` or `postgresql://` URL
    /// - Pool bounds must be positive with min <= max
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !self.is_postgres_url() {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }

        Ok(())
    }

    fn is_postgres_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!(
                    "JWT secret must be at least {} characters. Set COURSEREG_JWT__SECRET.",
                    MIN_JWT_SECRET_LEN
                ),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.access_token_expiration",
                "Access token expiration must be a positive number of hours.",
            ));
        }

        if self.refresh_token_expiration <= self.access_token_expiration {
            return Err(ConfigError::validation(
                "jwt.refresh_token_expiration",
                "Refresh token expiration must be longer than access token expiration.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        self.file.validate()
    }
}

impl ReminderSettings {
    /// Lead time must be positive and at most a year, batch size positive, and
    /// the poll expression a cron schedule the job scheduler accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lead_time_hours <= 0 {
            return Err(ConfigError::validation(
                "reminders.lead_time_hours",
                "Lead time must be a positive number of hours.",
            ));
        }

        if self.lead_time_hours > MAX_LEAD_TIME_HOURS {
            return Err(ConfigError::validation(
                "reminders.lead_time_hours",
                format!("Lead time must not exceed {} hours.", MAX_LEAD_TIME_HOURS),
            ));
        }

        if self.batch_size <= 0 {
            return Err(ConfigError::validation(
                "reminders.batch_size",
                "Batch size must be greater than 0.",
            ));
        }

        if self.send_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "reminders.send_timeout_seconds",
                "Send timeout must be greater than 0 seconds.",
            ));
        }

        Job::new_async(self.poll_cron.as_str(), |_uuid, _lock| Box::pin(async {})).map_err(
            |e| {
                ConfigError::validation(
                    "reminders.poll_cron",
                    format!("Invalid cron expression '{}': {}", self.poll_cron, e),
                )
            },
        )?;

        Ok(())
    }
}

impl MailSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.from.contains('@') {
            return Err(ConfigError::validation(
                "mail.from",
                format!("Sender '{}' is not an email address.", self.from),
            ));
        }

        if self.backend == MailBackend::Http {
            if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
                return Err(ConfigError::validation(
                    "mail.api_url",
                    "An http(s) API URL is required for the http mail backend.",
                ));
            }
            if self.timeout_seconds == 0 {
                return Err(ConfigError::validation(
                    "mail.timeout_seconds",
                    "Mail timeout must be greater than 0 seconds.",
                ));
            }
        }

        Ok(())
    }
}

impl Settings {
    /// Validate every section, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.jwt.validate()?;
        self.logger.validate()?;
        self.reminders.validate()?;
        self.mail.validate()?;
        Ok(())
    }
}
