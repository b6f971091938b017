use std::collections::BTreeSet;

use diesel::prelude::*;

use crate::{
    directory::{Player, RosterDirectory, Team, Tournament, TournamentDirectory},
    error::StoreError,
    schema::{players, team_players, teams, tournaments},
    state::DbPool,
};

/// Reads directory records from the shared SQLite database.
#[derive(Clone)]
pub struct SqliteDirectory {
    pool: DbPool,
}

impl SqliteDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TournamentDirectory for SqliteDirectory {
    #[tracing::instrument(skip(self))]
    fn tournament(&self, id: &str) -> Result<Option<Tournament>, StoreError> {
        let mut conn = self.pool.get()?;

        let tournament = tournaments::table
            .filter(tournaments::id.eq(id))
            .first::<Tournament>(&mut *conn)
            .optional()?;

        tracing::trace!("found? {}", tournament.is_some());

        Ok(tournament)
    }
}

impl RosterDirectory for SqliteDirectory {
    #[tracing::instrument(skip(self))]
    fn team(&self, id: &str) -> Result<Option<Team>, StoreError> {
        let mut conn = self.pool.get()?;

        let team = teams::table
            .filter(teams::id.eq(id))
            .select((teams::id, teams::owner_id, teams::title))
            .first::<(String, String, String)>(&mut *conn)
            .optional()?;

        let Some((id, owner_id, title)) = team else {
            return Ok(None);
        };

        let roster = team_players::table
            .filter(team_players::team_id.eq(&id))
            .select(team_players::player_id)
            .load::<String>(&mut *conn)?
            .into_iter()
            .collect();

        Ok(Some(Team {
            id,
            owner_id,
            title,
            roster,
        }))
    }

    #[tracing::instrument(skip(self))]
    fn resolve_players(
        &self,
        ids: &BTreeSet<String>,
    ) -> Result<Vec<Player>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get()?;

        Ok(players::table
            .filter(players::id.eq_any(ids))
            .order_by(players::id)
            .load::<Player>(&mut *conn)?)
    }
}
