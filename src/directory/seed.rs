//! Helpers for inserting directory records.
//!
//! Tournaments, teams and players are created by the services that own them;
//! these exist so that tests and the `testdata` binary have something to
//! point applications at.

use chrono::{NaiveDate, Utc};
use diesel::{prelude::*, sqlite::SqliteConnection};
use uuid::Uuid;

use crate::schema::{players, team_players, teams, tournaments};

pub fn tournament(
    conn: &mut SqliteConnection,
    owner_id: &str,
    title: &str,
    dates: Option<(NaiveDate, NaiveDate)>,
) -> QueryResult<String> {
    let id = Uuid::now_v7().to_string();

    let n = diesel::insert_into(tournaments::table)
        .values((
            tournaments::id.eq(&id),
            tournaments::owner_id.eq(owner_id),
            tournaments::title.eq(title),
            tournaments::starts_on.eq(dates.map(|(start, _)| start)),
            tournaments::ends_on.eq(dates.map(|(_, end)| end)),
            tournaments::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;
    assert_eq!(n, 1);

    Ok(id)
}

pub fn team(
    conn: &mut SqliteConnection,
    owner_id: &str,
    title: &str,
) -> QueryResult<String> {
    let id = Uuid::now_v7().to_string();

    let n = diesel::insert_into(teams::table)
        .values((
            teams::id.eq(&id),
            teams::owner_id.eq(owner_id),
            teams::title.eq(title),
            teams::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;
    assert_eq!(n, 1);

    Ok(id)
}

/// Inserts a player. `name` is used as the first name; the other name fields
/// are left blank.
pub fn player(
    conn: &mut SqliteConnection,
    owner_id: &str,
    name: &str,
) -> QueryResult<String> {
    let id = Uuid::now_v7().to_string();

    let n = diesel::insert_into(players::table)
        .values((
            players::id.eq(&id),
            players::owner_id.eq(owner_id),
            players::first_name.eq(name),
            players::second_name.eq(""),
            players::last_name.eq(""),
            players::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;
    assert_eq!(n, 1);

    Ok(id)
}

pub fn add_to_roster<'a>(
    conn: &mut SqliteConnection,
    team_id: &str,
    player_ids: impl IntoIterator<Item = &'a String>,
) -> QueryResult<()> {
    for player_id in player_ids {
        diesel::insert_into(team_players::table)
            .values((
                team_players::id.eq(Uuid::now_v7().to_string()),
                team_players::team_id.eq(team_id),
                team_players::player_id.eq(player_id),
            ))
            .execute(conn)?;
    }

    Ok(())
}

pub fn remove_from_roster(
    conn: &mut SqliteConnection,
    team_id: &str,
    player_id: &str,
) -> QueryResult<usize> {
    diesel::delete(
        team_players::table.filter(
            team_players::team_id
                .eq(team_id)
                .and(team_players::player_id.eq(player_id)),
        ),
    )
    .execute(conn)
}
