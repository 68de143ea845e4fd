//! Async database connection pool.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// bb8 pool over `AsyncPgConnection`. Cloning only bumps a reference count.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// A connection checked out of [`AsyncDbPool`].
pub type DbConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Builds the pool and opens `min_connections` connections up front.
///
/// ```ignore
/// let pool = establish_async_connection_pool(&settings.database).await?;
/// let mut conn = get_connection(&pool).await?;
/// ```
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager(config))
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })
}

/// Builds the pool without opening any connection. Connections are made on
/// first checkout.
pub fn lazy_connection_pool(config: &DatabaseConfig) -> AsyncDbPool {
    Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build_unchecked(manager(config))
}

/// Check a connection out of the pool.
pub async fn get_connection(pool: &AsyncDbPool) -> AppResult<DbConnection<'_>> {
    pool.get().await.map_err(|e| AppError::ConnectionPool {
        source: anyhow::Error::from(e),
    })
}

fn manager(config: &DatabaseConfig) -> AsyncDieselConnectionManager<AsyncPgConnection> {
    AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone())
}
