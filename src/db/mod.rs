//! PostgreSQL access: the async connection pool used by repositories and the
//! embedded migrations used by `migrate` and `database.auto_migrate`.

mod migrations;
mod pool;

pub use migrations::{MIGRATIONS, pending_migrations, revert_migrations, run_pending_migrations};
pub use pool::{
    AsyncDbPool, DbConnection, establish_async_connection_pool, get_connection,
    lazy_connection_pool,
};
