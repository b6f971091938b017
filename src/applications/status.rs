//! The application lifecycle.
//!
//! Teams move their own applications between `Draft`, `InProgress` and
//! `Canceled`; tournament owners decide on submitted ones. Every transition
//! the service performs goes through [`ApplicationStatus::team_transition`]
//! or [`ApplicationStatus::tournament_decision`].

use std::{fmt, str::FromStr};

use diesel::{
    backend::Backend,
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text,
    sqlite::Sqlite,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    InProgress,
    Accepted,
    Rejected,
    Canceled,
}

/// The outcome a tournament owner can give to a submitted application.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl From<Decision> for ApplicationStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accepted => ApplicationStatus::Accepted,
            Decision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Team asks for a status change.
    SetStatus(ApplicationStatus),
    /// Team replaces the roster.
    EditRoster,
    /// Tournament owner accepts or rejects.
    Decide(Decision),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SetStatus(ApplicationStatus::InProgress) => {
                f.write_str("submit")
            }
            Action::SetStatus(ApplicationStatus::Canceled) => {
                f.write_str("cancel")
            }
            Action::SetStatus(status) => {
                write!(f, "set status `{}` on", status.as_str())
            }
            Action::EditRoster => f.write_str("edit the roster of"),
            Action::Decide(Decision::Accepted) => f.write_str("accept"),
            Action::Decide(Decision::Rejected) => f.write_str("reject"),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot {action} an application which is {from}")]
pub struct TransitionError {
    pub from: ApplicationStatus,
    pub action: Action,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Draft,
        ApplicationStatus::InProgress,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Canceled,
    ];

    pub const VISIBLE_TO_TOURNAMENT: [ApplicationStatus; 3] = [
        ApplicationStatus::InProgress,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Canceled => "canceled",
        }
    }

    /// Whether the tournament owner may see (and act on) the application.
    /// Drafts and withdrawn applications belong to the team alone.
    pub fn visible_to_tournament(self) -> bool {
        !matches!(self, ApplicationStatus::Draft | ApplicationStatus::Canceled)
    }

    pub fn roster_editable(self) -> bool {
        matches!(self, ApplicationStatus::Draft | ApplicationStatus::Canceled)
    }

    /// Computes the status that results from a team-side update.
    ///
    /// A request may carry a status change, a roster edit, or both; both
    /// parts have to be permitted from the current status. Cancelling is
    /// always permitted, including after the tournament owner has decided.
    pub fn team_transition(
        self,
        requested: Option<ApplicationStatus>,
        edits_roster: bool,
    ) -> Result<ApplicationStatus, TransitionError> {
        if edits_roster && !self.roster_editable() {
            return Err(TransitionError {
                from: self,
                action: Action::EditRoster,
            });
        }

        match (self, requested) {
            (current, None) => Ok(current),
            (_, Some(ApplicationStatus::Canceled)) => {
                Ok(ApplicationStatus::Canceled)
            }
            (ApplicationStatus::Draft, Some(ApplicationStatus::InProgress)) => {
                Ok(ApplicationStatus::InProgress)
            }
            (from, Some(to)) => Err(TransitionError {
                from,
                action: Action::SetStatus(to),
            }),
        }
    }

    /// Computes the status that results from a tournament owner's decision.
    ///
    /// Only drafts and canceled applications are off limits; a decided
    /// application can be decided again.
    pub fn tournament_decision(
        self,
        decision: Decision,
    ) -> Result<ApplicationStatus, TransitionError> {
        if self.visible_to_tournament() {
            Ok(decision.into())
        } else {
            Err(TransitionError {
                from: self,
                action: Action::Decide(decision),
            })
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApplicationStatus::Draft => "a draft",
            ApplicationStatus::InProgress => "in progress",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Canceled => "canceled",
        })
    }
}

#[derive(Debug, Error)]
#[error("unknown application status `{0}`")]
pub struct ParseStatusError(String);

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

impl ToSql<Text, Sqlite> for ApplicationStatus {
    fn to_sql<'b>(
        &'b self,
        out: &mut Output<'b, '_, Sqlite>,
    ) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for ApplicationStatus {
    fn from_sql(
        bytes: <Sqlite as Backend>::RawValue<'_>,
    ) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(raw.parse()?)
    }
}
