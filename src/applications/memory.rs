use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    applications::{
        Application, ApplicationStatus,
        repository::{ApplicationChanges, ApplicationRepository, NewApplication},
    },
    error::StoreError,
};

#[derive(Debug, Default)]
struct Inner {
    applications: HashMap<String, Application>,
    /// `(team_id, tournament_id)` -> application id
    by_pair: HashMap<(String, String), String>,
}

/// Keeps applications in memory. The pair check and the insert happen under
/// one write lock, which gives the same guarantee as the SQLite unique index.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    inner: RwLock<Inner>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut applications: Vec<Application>) -> Vec<Application> {
        applications.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))
        });
        applications
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn find(&self, id: &str) -> Result<Option<Application>, StoreError> {
        Ok(self.inner.read().applications.get(id).cloned())
    }

    fn find_for_pair(
        &self,
        team_id: &str,
        tournament_id: &str,
    ) -> Result<Option<Application>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .by_pair
            .get(&(team_id.to_string(), tournament_id.to_string()))
            .and_then(|id| inner.applications.get(id))
            .cloned())
    }

    fn create(&self, new: NewApplication) -> Result<Application, StoreError> {
        let mut inner = self.inner.write();

        let pair = (new.team_id.clone(), new.tournament_id.clone());
        if inner.by_pair.contains_key(&pair) {
            return Err(StoreError::Conflict);
        }

        let application = Application {
            id: Uuid::now_v7().to_string(),
            team_id: new.team_id,
            tournament_id: new.tournament_id,
            status: ApplicationStatus::Draft,
            status_changed_at: new.now,
            created_at: new.now,
            roster: new.roster,
        };

        inner.by_pair.insert(pair, application.id.clone());
        inner
            .applications
            .insert(application.id.clone(), application.clone());

        Ok(application)
    }

    fn update(
        &self,
        id: &str,
        changes: ApplicationChanges,
    ) -> Result<Application, StoreError> {
        let mut inner = self.inner.write();

        let application =
            inner.applications.get_mut(id).ok_or(StoreError::NotFound)?;

        if application.status != changes.expected {
            return Err(StoreError::StatusChanged(application.status));
        }

        if let Some(change) = changes.status {
            application.status = change.status;
            application.status_changed_at = change.at;
        }
        if let Some(roster) = changes.roster {
            application.roster = roster;
        }

        Ok(application.clone())
    }

    fn list_for_team(
        &self,
        team_id: &str,
    ) -> Result<Vec<Application>, StoreError> {
        let inner = self.inner.read();
        Ok(Self::sorted(
            inner
                .applications
                .values()
                .filter(|a| a.team_id == team_id)
                .cloned()
                .collect(),
        ))
    }

    fn list_for_tournament(
        &self,
        tournament_id: &str,
        statuses: &[ApplicationStatus],
    ) -> Result<Vec<Application>, StoreError> {
        let inner = self.inner.read();
        Ok(Self::sorted(
            inner
                .applications
                .values()
                .filter(|a| {
                    a.tournament_id == tournament_id
                        && statuses.contains(&a.status)
                })
                .cloned()
                .collect(),
        ))
    }
}
