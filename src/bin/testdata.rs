//! Loads a small fixture into a database: a team with three players and a
//! tournament owned by someone else, ready for the team to apply to.

use chrono::{Days, Utc};
use clap::Parser;
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use serde_json::json;
use sportspace::{MIGRATIONS, directory::seed};

#[derive(Parser)]
pub struct Seed {
    database_url: Option<String>,
    /// Owner of the team and its players.
    #[clap(long, default_value = "team-owner")]
    team_owner: String,
    /// Owner of the tournament.
    #[clap(long, default_value = "tournament-owner")]
    tournament_owner: String,
}

fn main() {
    let args = Seed::parse();
    let db_url = if let Some(url) = args.database_url {
        url
    } else {
        std::env::var("DATABASE_URL").expect(
            "please either set `DATABASE_URL` or pass the database url",
        )
    };

    let mut conn = diesel::SqliteConnection::establish(&db_url).unwrap();

    conn.run_pending_migrations(MIGRATIONS).unwrap();

    let fixture = conn
        .transaction(|conn| -> QueryResult<_> {
            let today = Utc::now().date_naive();
            let tournament_id = seed::tournament(
                conn,
                &args.tournament_owner,
                "Spring Cup",
                Some((today, today + Days::new(2))),
            )?;

            let team_id = seed::team(conn, &args.team_owner, "Falcons")?;
            let players = ["Ann", "Bob", "Cid"]
                .into_iter()
                .map(|name| seed::player(conn, &args.team_owner, name))
                .collect::<QueryResult<Vec<_>>>()?;
            seed::add_to_roster(conn, &team_id, &players)?;

            Ok(json!({
                "tournament_id": tournament_id,
                "team_id": team_id,
                "players": players,
            }))
        })
        .unwrap();

    println!("{}", serde_json::to_string_pretty(&fixture).unwrap());
}
