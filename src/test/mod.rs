//! Tests that exercise the whole crate against a real SQLite database.

use std::{path::Path, sync::Arc, time::Duration};

use diesel_migrations::MigrationHarness;

use crate::{
    MIGRATIONS,
    applications::{
        service::ApplicationService, sqlite::SqliteApplicationRepository,
    },
    directory::{seed, sqlite::SqliteDirectory},
    state::{ConnectionOptions, DbPool, build_pool},
};


pub fn memory_pool() -> DbPool {
    let pool = build_pool(
        ":memory:",
        1,
        ConnectionOptions {
            busy_timeout: Duration::from_secs(5),
        },
    )
    .unwrap();
    pool.get().unwrap().run_pending_migrations(MIGRATIONS).unwrap();
    pool
}

/// A pool of `max_size` connections onto a database file inside `dir`, so
/// writers really do contend for the file lock.
pub fn file_pool(dir: &Path, max_size: u32) -> DbPool {
    let path = dir.join("sportspace.db");
    let pool = build_pool(
        path.to_str().unwrap(),
        max_size,
        ConnectionOptions {
            busy_timeout: Duration::from_secs(10),
        },
    )
    .unwrap();
    pool.get().unwrap().run_pending_migrations(MIGRATIONS).unwrap();
    pool
}

pub fn sqlite_service(pool: &DbPool) -> ApplicationService {
    let directory = Arc::new(SqliteDirectory::new(pool.clone()));
    ApplicationService::new(
        directory.clone(),
        directory,
        Arc::new(SqliteApplicationRepository::new(pool.clone())),
    )
}

/// Team T1 (owner U1) with players P1..P3 on its roster, tournament R1
/// (owner U2), and a player P99 who is not on the team.
pub struct World {
    pub team: String,
    pub tournament: String,
    pub players: Vec<String>,
    pub outsider: String,
}

pub const U1: &str = "u1";
pub const U2: &str = "u2";

pub fn world(pool: &DbPool) -> World {
    let mut conn = pool.get().unwrap();

    let team = seed::team(&mut conn, U1, "T1").unwrap();
    let tournament = seed::tournament(&mut conn, U2, "R1", None).unwrap();
    let players = ["P1", "P2", "P3"]
        .into_iter()
        .map(|name| seed::player(&mut conn, U1, name).unwrap())
        .collect::<Vec<_>>();
    seed::add_to_roster(&mut conn, &team, &players).unwrap();
    let outsider = seed::player(&mut conn, U1, "P99").unwrap();

    World {
        team,
        tournament,
        players,
        outsider,
    }
}
