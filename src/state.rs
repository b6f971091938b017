use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use diesel::{
    SqliteConnection,
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection, Pool},
};

use crate::applications::service::ApplicationService;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Applied to every connection the pool opens. SQLite leaves foreign keys
/// off by default, and without a busy timeout a second writer fails
/// immediately instead of waiting for the first one to commit.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionOptions
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(
    database_url: &str,
    max_size: u32,
    options: ConnectionOptions,
) -> Result<DbPool, diesel::r2d2::PoolError> {
    // every connection to ":memory:" is a separate database
    let max_size = if database_url == ":memory:" { 1 } else { max_size };

    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(options))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
}

#[derive(Clone)]
pub struct AppState {
    pub applications: Arc<ApplicationService>,
}

impl FromRef<AppState> for Arc<ApplicationService> {
    fn from_ref(state: &AppState) -> Self {
        state.applications.clone()
    }
}
