//! Team applications to tournaments.
//!
//! A team owner registers a roster for a tournament by creating an
//! application, edits it while it is a draft, and submits it. The
//! tournament owner then accepts or rejects it. See [`status`] for the
//! lifecycle and [`service::ApplicationService`] for the operations.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::directory::Player;

pub mod error;
pub mod memory;
pub mod repository;
pub mod roster;
pub mod routes;
pub mod service;
pub mod sqlite;
pub mod status;

pub use status::{ApplicationStatus, Decision};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Application {
    pub id: String,
    pub team_id: String,
    pub tournament_id: String,
    pub status: ApplicationStatus,
    pub status_changed_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    /// Snapshot of the players registered, taken from the team roster when
    /// the application was last written.
    pub roster: BTreeSet<String>,
}

/// An application together with the player records its roster points at.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApplicationDetails {
    #[serde(flatten)]
    pub application: Application,
    pub players: Vec<Player>,
}

/// What a team owner sees: their application and the tournament it is for.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TeamApplicationView {
    #[serde(flatten)]
    pub details: ApplicationDetails,
    pub tournament_title: String,
}

/// What a tournament owner sees: a submitted application and the team
/// behind it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TournamentApplicationView {
    #[serde(flatten)]
    pub details: ApplicationDetails,
    pub team_title: String,
}
