//! Server lifecycle: wire the application together, serve HTTP and run the
//! reminder worker until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::create_router;
use crate::config::{Environment, Settings};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::reminders::{JobStore, ReminderDispatcher, ReminderScheduler, ReminderWorker};
use crate::repositories::Repositories;
use crate::services::{MailService, Services};
use crate::state::AppState;

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Run until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// - Database pool or migration failures
    /// - An unusable mail backend or reminder cron expression
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );
        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            request_timeout = settings.server.request_timeout,
            max_connections = settings.database.max_connections,
            log_level = %settings.logger.level,
            "Configuration loaded"
        );
        tracing::info!(
            enabled = settings.reminders.enabled,
            lead_time_hours = settings.reminders.lead_time_hours,
            poll_cron = %settings.reminders.poll_cron,
            mail_backend = ?settings.mail.backend,
            "Reminder configuration loaded"
        );

        if settings.database.auto_migrate {
            let applied = run_pending_migrations(&settings.database.url).await?;
            tracing::info!(count = applied.len(), "Pending migrations applied");
        }

        let pool = establish_async_connection_pool(&settings.database).await?;
        tracing::info!("Database connection pool initialized");

        let mail = MailService::from_settings(&settings.mail)?;
        let repos = Repositories::new(pool.clone());
        let store: Arc<dyn JobStore> = Arc::new(repos.reminder_jobs.clone());
        let scheduler = ReminderScheduler::new(Arc::clone(&store), settings.reminders.lead_time());

        let shutdown = CancellationToken::new();
        let worker = if settings.reminders.enabled {
            Some(self.start_worker(store, &repos, mail.clone(), shutdown.clone()).await?)
        } else {
            tracing::info!("Reminder worker disabled");
            None
        };

        let services = Services::new(repos, scheduler, mail, settings.jwt.clone());
        let state = AppState::new(pool, services, settings.jwt.clone());
        let router = create_router(state, Duration::from_secs(settings.server.request_timeout));

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;
        tracing::info!(address = %address, "Server listening");

        let signal_token = shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                signal_token.cancel();
            })
            .await?;

        // the server may also stop on its own error path
        shutdown.cancel();
        if let Some(handle) = worker
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Reminder worker task failed");
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    async fn start_worker(
        &self,
        store: Arc<dyn JobStore>,
        repos: &Repositories,
        mail: MailService,
        shutdown: CancellationToken,
    ) -> anyhow::Result<JoinHandle<()>> {
        let reminders = &self.settings.reminders;
        let dispatcher = ReminderDispatcher::new(
            store,
            Arc::new(repos.reminder_targets()),
            mail,
            reminders.batch_size,
            Duration::from_secs(reminders.send_timeout_seconds),
        );

        let worker = ReminderWorker::new(Arc::new(dispatcher)).await?;
        worker.schedule(&reminders.poll_cron).await?;
        Ok(worker.spawn(shutdown).await?)
    }
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
