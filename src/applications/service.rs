use std::sync::Arc;

use chrono::Utc;

use crate::{
    applications::{
        Application, ApplicationDetails, ApplicationStatus, Decision,
        TeamApplicationView, TournamentApplicationView,
        error::{ApplicationError, ApplicationResult, Entity, StoreContext},
        repository::{
            ApplicationChanges, ApplicationRepository, NewApplication,
            StatusChange,
        },
        roster::effective_roster,
        status::TransitionError,
    },
    directory::{RosterDirectory, Team, Tournament, TournamentDirectory},
    error::StoreError,
};

/// Maps a failed repository write. A missing row or a lost race are
/// reported as such rather than as a storage failure.
fn write_error(
    context: &'static str,
) -> impl Fn(StoreError) -> ApplicationError {
    move |source| match source {
        StoreError::NotFound => ApplicationError::NotFound(Entity::Application),
        StoreError::Conflict => ApplicationError::Conflict,
        source => ApplicationError::Store { context, source },
    }
}

pub struct ApplicationService {
    tournaments: Arc<dyn TournamentDirectory>,
    rosters: Arc<dyn RosterDirectory>,
    repository: Arc<dyn ApplicationRepository>,
}

impl ApplicationService {
    pub fn new(
        tournaments: Arc<dyn TournamentDirectory>,
        rosters: Arc<dyn RosterDirectory>,
        repository: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            tournaments,
            rosters,
            repository,
        }
    }

    /// The team, if it exists and `actor` owns it.
    fn owned_team(
        &self,
        actor: &str,
        team_id: &str,
    ) -> ApplicationResult<Team> {
        self.rosters
            .team(team_id)
            .context("load team")?
            .filter(|team| team.is_owned_by(actor))
            .ok_or(ApplicationError::NotFound(Entity::Team))
    }

    /// The tournament, if it exists and `actor` owns it.
    fn owned_tournament(
        &self,
        actor: &str,
        tournament_id: &str,
    ) -> ApplicationResult<Tournament> {
        self.tournaments
            .tournament(tournament_id)
            .context("load tournament")?
            .filter(|tournament| tournament.owner_id == actor)
            .ok_or(ApplicationError::NotFound(Entity::Tournament))
    }

    fn application(
        &self,
        application_id: &str,
        belongs: impl FnOnce(&Application) -> bool,
    ) -> ApplicationResult<Application> {
        self.repository
            .find(application_id)
            .context("load application")?
            .filter(belongs)
            .ok_or(ApplicationError::NotFound(Entity::Application))
    }

    fn details(
        &self,
        application: Application,
    ) -> ApplicationResult<ApplicationDetails> {
        let players = self
            .rosters
            .resolve_players(&application.roster)
            .context("resolve players")?;

        Ok(ApplicationDetails {
            application,
            players,
        })
    }

    /// Writes `changes`, which were computed from `current.status`. If
    /// another request moved the application first, `transition` judges the
    /// request again against the status it has now.
    fn write(
        &self,
        current: &Application,
        changes: ApplicationChanges,
        context: &'static str,
        transition: impl Fn(
            ApplicationStatus,
        ) -> Result<ApplicationStatus, TransitionError>,
    ) -> ApplicationResult<Application> {
        match self.repository.update(&current.id, changes) {
            Err(StoreError::StatusChanged(now)) => {
                tracing::debug!(read = ?current.status, ?now, "lost a race");
                transition(now)?;
                Err(ApplicationError::Stale)
            }
            result => result.map_err(write_error(context)),
        }
    }

    /// Registers `team_id` for `tournament_id` with a new draft application.
    ///
    /// Requested players who are not on the team's roster are left out.
    #[tracing::instrument(skip(self, players))]
    pub fn create(
        &self,
        actor: &str,
        team_id: &str,
        tournament_id: &str,
        players: &[String],
    ) -> ApplicationResult<ApplicationDetails> {
        let team = self.owned_team(actor, team_id)?;

        if self
            .tournaments
            .tournament(tournament_id)
            .context("load tournament")?
            .is_none()
        {
            return Err(ApplicationError::NotFound(Entity::Tournament));
        }

        if self
            .repository
            .find_for_pair(team_id, tournament_id)
            .context("look for an existing application")?
            .is_some()
        {
            return Err(ApplicationError::Conflict);
        }

        let application = self
            .repository
            .create(NewApplication {
                team_id: team.id,
                tournament_id: tournament_id.to_string(),
                roster: effective_roster(&team.roster, players),
                now: Utc::now().naive_utc(),
            })
            .map_err(write_error("create application"))?;

        self.details(application)
    }

    /// Applies a team owner's change: a status change, a roster
    /// replacement, or both at once.
    #[tracing::instrument(skip(self, players))]
    pub fn update_by_team(
        &self,
        actor: &str,
        team_id: &str,
        application_id: &str,
        status: Option<ApplicationStatus>,
        players: Option<&[String]>,
    ) -> ApplicationResult<ApplicationDetails> {
        let team = self.owned_team(actor, team_id)?;
        let current =
            self.application(application_id, |a| a.team_id == team.id)?;

        let transition = |from: ApplicationStatus| {
            from.team_transition(status, players.is_some())
        };
        let next = transition(current.status)?;

        let changes = ApplicationChanges {
            expected: current.status,
            status: status.map(|_| StatusChange {
                status: next,
                at: Utc::now().naive_utc(),
            }),
            roster: players.map(|ids| effective_roster(&team.roster, ids)),
        };

        if changes.is_empty() {
            return self.details(current);
        }

        let updated =
            self.write(&current, changes, "update application", transition)?;

        tracing::info!(
            from = ?current.status,
            to = ?updated.status,
            "team updated application"
        );

        self.details(updated)
    }

    /// Records the tournament owner's decision on a submitted application.
    #[tracing::instrument(skip(self))]
    pub fn update_by_tournament_owner(
        &self,
        actor: &str,
        tournament_id: &str,
        application_id: &str,
        decision: Decision,
    ) -> ApplicationResult<ApplicationDetails> {
        let tournament = self.owned_tournament(actor, tournament_id)?;
        let current = self.application(application_id, |a| {
            a.tournament_id == tournament.id
        })?;

        let transition =
            |from: ApplicationStatus| from.tournament_decision(decision);
        let next = transition(current.status)?;

        let updated = self.write(
            &current,
            ApplicationChanges {
                expected: current.status,
                status: Some(StatusChange {
                    status: next,
                    at: Utc::now().naive_utc(),
                }),
                roster: None,
            },
            "record decision",
            transition,
        )?;

        tracing::info!(?decision, "tournament owner decided on application");

        self.details(updated)
    }

    #[tracing::instrument(skip(self))]
    pub fn list_for_team(
        &self,
        team_id: &str,
    ) -> ApplicationResult<Vec<Application>> {
        self.repository
            .list_for_team(team_id)
            .context("list team applications")
    }

    /// Only submitted and decided applications; drafts and canceled ones
    /// stay with the team.
    #[tracing::instrument(skip(self))]
    pub fn list_for_tournament(
        &self,
        tournament_id: &str,
    ) -> ApplicationResult<Vec<Application>> {
        self.repository
            .list_for_tournament(
                tournament_id,
                &ApplicationStatus::VISIBLE_TO_TOURNAMENT,
            )
            .context("list tournament applications")
    }

    pub fn team_applications(
        &self,
        actor: &str,
        team_id: &str,
    ) -> ApplicationResult<Vec<Application>> {
        let team = self.owned_team(actor, team_id)?;
        self.list_for_team(&team.id)
    }

    pub fn tournament_applications(
        &self,
        actor: &str,
        tournament_id: &str,
    ) -> ApplicationResult<Vec<Application>> {
        let tournament = self.owned_tournament(actor, tournament_id)?;
        self.list_for_tournament(&tournament.id)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_for_team(
        &self,
        actor: &str,
        team_id: &str,
        application_id: &str,
    ) -> ApplicationResult<TeamApplicationView> {
        let team = self.owned_team(actor, team_id)?;
        let application =
            self.application(application_id, |a| a.team_id == team.id)?;

        let tournament = self
            .tournaments
            .tournament(&application.tournament_id)
            .context("load tournament")?
            .ok_or(ApplicationError::NotFound(Entity::Tournament))?;

        Ok(TeamApplicationView {
            details: self.details(application)?,
            tournament_title: tournament.title,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn get_for_tournament(
        &self,
        actor: &str,
        tournament_id: &str,
        application_id: &str,
    ) -> ApplicationResult<TournamentApplicationView> {
        let tournament = self.owned_tournament(actor, tournament_id)?;
        let application = self.application(application_id, |a| {
            a.tournament_id == tournament.id && a.status.visible_to_tournament()
        })?;

        let team = self
            .rosters
            .team(&application.team_id)
            .context("load team")?
            .ok_or(ApplicationError::NotFound(Entity::Team))?;

        Ok(TournamentApplicationView {
            details: self.details(application)?,
            team_title: team.title,
        })
    }
}
