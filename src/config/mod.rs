//! Layered configuration for coursereg
//!
//! Sources, lowest priority first:
//! 1. `default.toml`
//! 2. `{environment}.toml`
//! 3. `local.toml` (not committed)
//! 4. `COURSEREG_*` environment variables, `__` separating nested keys
//!    (`COURSEREG_DATABASE__URL`, `COURSEREG_REMINDERS__LEAD_TIME_HOURS`)

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, DatabaseConfig, JwtConfig, LoggerSettings, MailBackend, MailSettings,
    ReminderSettings, ServerConfig, Settings,
};

/// Serialises tests that read or mutate `COURSEREG_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
