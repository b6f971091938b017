//! Lookups into the tournament, team and player records that other services
//! own. Applications only ever read these.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub mod seed;
pub mod sqlite;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq, Eq)]
pub struct Tournament {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    /// Ids of the players currently on the team.
    pub roster: BTreeSet<String>,
}

impl Team {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub owner_id: String,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub created_at: NaiveDateTime,
}

pub trait TournamentDirectory: Send + Sync {
    fn tournament(&self, id: &str) -> Result<Option<Tournament>, StoreError>;
}

pub trait RosterDirectory: Send + Sync {
    /// Fetches a team together with its current roster.
    fn team(&self, id: &str) -> Result<Option<Team>, StoreError>;

    /// Resolves player ids into records, ordered by id. Unknown ids are
    /// skipped.
    fn resolve_players(
        &self,
        ids: &BTreeSet<String>,
    ) -> Result<Vec<Player>, StoreError>;
}
