use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDateTime;
use diesel::{prelude::*, sqlite::SqliteConnection};
use itertools::Itertools;
use uuid::Uuid;

use crate::{
    applications::{
        Application, ApplicationStatus,
        repository::{ApplicationChanges, ApplicationRepository, NewApplication},
    },
    error::StoreError,
    schema::{application_players, applications},
    state::DbPool,
};

#[derive(Queryable, Clone, Debug)]
struct ApplicationRow {
    id: String,
    team_id: String,
    tournament_id: String,
    status: ApplicationStatus,
    status_changed_at: NaiveDateTime,
    created_at: NaiveDateTime,
}

impl ApplicationRow {
    fn with_roster(self, roster: BTreeSet<String>) -> Application {
        Application {
            id: self.id,
            team_id: self.team_id,
            tournament_id: self.tournament_id,
            status: self.status,
            status_changed_at: self.status_changed_at,
            created_at: self.created_at,
            roster,
        }
    }
}

/// Stores applications in SQLite. The `(team_id, tournament_id)` unique
/// index is what keeps concurrent creates apart.
#[derive(Clone)]
pub struct SqliteApplicationRepository {
    pool: DbPool,
}

impl SqliteApplicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn roster_of(
        application_id: &str,
        conn: &mut SqliteConnection,
    ) -> QueryResult<BTreeSet<String>> {
        Ok(application_players::table
            .filter(application_players::application_id.eq(application_id))
            .select(application_players::player_id)
            .load::<String>(conn)?
            .into_iter()
            .collect())
    }

    fn load_one(
        row: Option<ApplicationRow>,
        conn: &mut SqliteConnection,
    ) -> QueryResult<Option<Application>> {
        match row {
            Some(row) => {
                let roster = Self::roster_of(&row.id, conn)?;
                Ok(Some(row.with_roster(roster)))
            }
            None => Ok(None),
        }
    }

    /// Attaches rosters to a batch of rows with one query.
    fn load_many(
        rows: Vec<ApplicationRow>,
        conn: &mut SqliteConnection,
    ) -> QueryResult<Vec<Application>> {
        let mut rosters: HashMap<String, Vec<String>> =
            application_players::table
                .filter(
                    application_players::application_id
                        .eq_any(rows.iter().map(|row| &row.id)),
                )
                .select((
                    application_players::application_id,
                    application_players::player_id,
                ))
                .load::<(String, String)>(conn)?
                .into_iter()
                .into_group_map();

        Ok(rows
            .into_iter()
            .map(|row| {
                let roster = rosters
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                row.with_roster(roster)
            })
            .collect())
    }

    fn replace_roster(
        application_id: &str,
        roster: &BTreeSet<String>,
        conn: &mut SqliteConnection,
    ) -> QueryResult<()> {
        diesel::delete(
            application_players::table
                .filter(application_players::application_id.eq(application_id)),
        )
        .execute(conn)?;

        for player_id in roster {
            diesel::insert_into(application_players::table)
                .values((
                    application_players::id.eq(Uuid::now_v7().to_string()),
                    application_players::application_id.eq(application_id),
                    application_players::player_id.eq(player_id),
                ))
                .execute(conn)?;
        }

        Ok(())
    }
}

impl ApplicationRepository for SqliteApplicationRepository {
    #[tracing::instrument(skip(self))]
    fn find(&self, id: &str) -> Result<Option<Application>, StoreError> {
        let mut conn = self.pool.get()?;

        let row = applications::table
            .filter(applications::id.eq(id))
            .first::<ApplicationRow>(&mut *conn)
            .optional()?;

        Ok(Self::load_one(row, &mut conn)?)
    }

    #[tracing::instrument(skip(self))]
    fn find_for_pair(
        &self,
        team_id: &str,
        tournament_id: &str,
    ) -> Result<Option<Application>, StoreError> {
        let mut conn = self.pool.get()?;

        let row = applications::table
            .filter(
                applications::team_id
                    .eq(team_id)
                    .and(applications::tournament_id.eq(tournament_id)),
            )
            .first::<ApplicationRow>(&mut *conn)
            .optional()?;

        Ok(Self::load_one(row, &mut conn)?)
    }

    #[tracing::instrument(
        skip(self, new),
        fields(team_id = %new.team_id, tournament_id = %new.tournament_id)
    )]
    fn create(&self, new: NewApplication) -> Result<Application, StoreError> {
        let mut conn = self.pool.get()?;

        let id = Uuid::now_v7().to_string();

        // IMMEDIATE takes the write lock up front, so a concurrent creator
        // waits (up to the busy timeout) and then trips the unique index
        conn.immediate_transaction(|conn| -> Result<_, StoreError> {
            diesel::insert_into(applications::table)
                .values((
                    applications::id.eq(&id),
                    applications::team_id.eq(&new.team_id),
                    applications::tournament_id.eq(&new.tournament_id),
                    applications::status.eq(ApplicationStatus::Draft),
                    applications::status_changed_at.eq(new.now),
                    applications::created_at.eq(new.now),
                ))
                .execute(conn)?;

            Self::replace_roster(&id, &new.roster, conn)?;

            Ok(())
        })?;

        tracing::info!(application_id = %id, "created application");

        Ok(Application {
            id,
            team_id: new.team_id,
            tournament_id: new.tournament_id,
            status: ApplicationStatus::Draft,
            status_changed_at: new.now,
            created_at: new.now,
            roster: new.roster,
        })
    }

    #[tracing::instrument(skip(self, changes))]
    fn update(
        &self,
        id: &str,
        changes: ApplicationChanges,
    ) -> Result<Application, StoreError> {
        let mut conn = self.pool.get()?;

        // the status check and the write share one IMMEDIATE transaction, so
        // no other writer can move the application in between
        conn.immediate_transaction(|conn| -> Result<_, StoreError> {
            let mut row = applications::table
                .filter(applications::id.eq(id))
                .first::<ApplicationRow>(conn)?;

            if row.status != changes.expected {
                return Err(StoreError::StatusChanged(row.status));
            }

            if let Some(change) = changes.status {
                let n = diesel::update(
                    applications::table.filter(
                        applications::id
                            .eq(id)
                            .and(applications::status.eq(changes.expected)),
                    ),
                )
                .set((
                    applications::status.eq(change.status),
                    applications::status_changed_at.eq(change.at),
                ))
                .execute(conn)?;
                debug_assert_eq!(n, 1);

                row.status = change.status;
                row.status_changed_at = change.at;
            }

            let roster = match changes.roster {
                Some(roster) => {
                    Self::replace_roster(id, &roster, conn)?;
                    roster
                }
                None => Self::roster_of(id, conn)?,
            };

            Ok(row.with_roster(roster))
        })
    }

    #[tracing::instrument(skip(self))]
    fn list_for_team(
        &self,
        team_id: &str,
    ) -> Result<Vec<Application>, StoreError> {
        let mut conn = self.pool.get()?;

        let rows = applications::table
            .filter(applications::team_id.eq(team_id))
            .order_by(applications::created_at)
            .load::<ApplicationRow>(&mut *conn)?;

        Ok(Self::load_many(rows, &mut conn)?)
    }

    #[tracing::instrument(skip(self))]
    fn list_for_tournament(
        &self,
        tournament_id: &str,
        statuses: &[ApplicationStatus],
    ) -> Result<Vec<Application>, StoreError> {
        let mut conn = self.pool.get()?;

        let rows = applications::table
            .filter(
                applications::tournament_id
                    .eq(tournament_id)
                    .and(applications::status.eq_any(statuses)),
            )
            .order_by(applications::created_at)
            .load::<ApplicationRow>(&mut *conn)?;

        Ok(Self::load_many(rows, &mut conn)?)
    }
}
