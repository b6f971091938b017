use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::{
    applications::{Application, ApplicationStatus},
    error::StoreError,
};

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub team_id: String,
    pub tournament_id: String,
    pub roster: BTreeSet<String>,
    pub now: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub at: NaiveDateTime,
}

/// A set of changes which is applied to an application in one transaction.
#[derive(Debug, Clone)]
pub struct ApplicationChanges {
    /// The status the changes were computed from. Nothing is written if the
    /// stored application has moved on since.
    pub expected: ApplicationStatus,
    pub status: Option<StatusChange>,
    /// Replaces the whole roster when present.
    pub roster: Option<BTreeSet<String>>,
}

impl ApplicationChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.roster.is_none()
    }
}

/// Durable storage for applications.
///
/// Implementations must make [`ApplicationRepository::create`] an atomic
/// insert-if-absent on `(team_id, tournament_id)`: when two callers race,
/// one of them gets [`StoreError::Conflict`]. Every write commits the
/// application and its roster together or not at all.
pub trait ApplicationRepository: Send + Sync {
    fn find(&self, id: &str) -> Result<Option<Application>, StoreError>;

    fn find_for_pair(
        &self,
        team_id: &str,
        tournament_id: &str,
    ) -> Result<Option<Application>, StoreError>;

    /// Stores a new draft application.
    fn create(&self, new: NewApplication) -> Result<Application, StoreError>;

    /// Fails with [`StoreError::NotFound`] if there is no such application
    /// and with [`StoreError::StatusChanged`] if its status is no longer
    /// `changes.expected`. The check and the write are atomic.
    fn update(
        &self,
        id: &str,
        changes: ApplicationChanges,
    ) -> Result<Application, StoreError>;

    fn list_for_team(
        &self,
        team_id: &str,
    ) -> Result<Vec<Application>, StoreError>;

    /// Lists a tournament's applications whose status is one of `statuses`.
    fn list_for_tournament(
        &self,
        tournament_id: &str,
        statuses: &[ApplicationStatus],
    ) -> Result<Vec<Application>, StoreError>;
}

/// Behaviour every [`ApplicationRepository`] has to show. The backends run
/// these against themselves.
#[cfg(test)]
pub(crate) mod contract {
    use std::{
        collections::BTreeSet,
        sync::{Arc, Barrier},
        thread,
    };

    use chrono::{TimeDelta, Utc};

    use super::*;

    /// A team, a tournament and some players the repository can refer to.
    pub struct Fixture {
        pub team_id: String,
        pub other_team_id: String,
        pub tournament_id: String,
        pub players: Vec<String>,
    }

    fn roster(ids: &[String]) -> BTreeSet<String> {
        ids.iter().cloned().collect()
    }

    fn draft(f: &Fixture, team_id: &str) -> NewApplication {
        NewApplication {
            team_id: team_id.to_string(),
            tournament_id: f.tournament_id.clone(),
            roster: roster(&f.players[..2]),
            now: Utc::now().naive_utc(),
        }
    }

    pub fn create_then_find(repo: &dyn ApplicationRepository, f: &Fixture) {
        let created = repo.create(draft(f, &f.team_id)).unwrap();

        assert_eq!(created.status, ApplicationStatus::Draft);
        assert_eq!(created.roster, roster(&f.players[..2]));
        assert_eq!(created.status_changed_at, created.created_at);

        assert_eq!(repo.find(&created.id).unwrap(), Some(created.clone()));
        assert_eq!(
            repo.find_for_pair(&f.team_id, &f.tournament_id).unwrap(),
            Some(created)
        );
        assert_eq!(repo.find("missing").unwrap(), None);
        assert_eq!(
            repo.find_for_pair(&f.other_team_id, &f.tournament_id)
                .unwrap(),
            None
        );
    }

    pub fn second_create_conflicts(
        repo: &dyn ApplicationRepository,
        f: &Fixture,
    ) {
        repo.create(draft(f, &f.team_id)).unwrap();

        assert!(matches!(
            repo.create(draft(f, &f.team_id)),
            Err(StoreError::Conflict)
        ));
        // a different team is a different slot
        repo.create(draft(f, &f.other_team_id)).unwrap();
        assert_eq!(repo.list_for_team(&f.team_id).unwrap().len(), 1);
    }

    pub fn update_replaces_roster_and_status(
        repo: &dyn ApplicationRepository,
        f: &Fixture,
    ) {
        let created = repo.create(draft(f, &f.team_id)).unwrap();
        let later = created.status_changed_at + TimeDelta::seconds(5);

        let updated = repo
            .update(
                &created.id,
                ApplicationChanges {
                    expected: ApplicationStatus::Draft,
                    status: Some(StatusChange {
                        status: ApplicationStatus::InProgress,
                        at: later,
                    }),
                    roster: Some(roster(&f.players[2..3])),
                },
            )
            .unwrap();

        assert_eq!(updated.status, ApplicationStatus::InProgress);
        assert_eq!(updated.status_changed_at, later);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.roster, roster(&f.players[2..3]));
        assert_eq!(repo.find(&created.id).unwrap(), Some(updated.clone()));

        // a roster-only change leaves the status alone
        let emptied = repo
            .update(
                &created.id,
                ApplicationChanges {
                    expected: ApplicationStatus::InProgress,
                    status: None,
                    roster: Some(BTreeSet::new()),
                },
            )
            .unwrap();
        assert!(emptied.roster.is_empty());
        assert_eq!(emptied.status, ApplicationStatus::InProgress);
        assert_eq!(emptied.status_changed_at, later);
    }

    pub fn update_of_missing_is_not_found(repo: &dyn ApplicationRepository) {
        assert!(matches!(
            repo.update(
                "missing",
                ApplicationChanges {
                    expected: ApplicationStatus::Draft,
                    status: None,
                    roster: None,
                }
            ),
            Err(StoreError::NotFound)
        ));
    }

    /// A write computed from an out of date status leaves the application
    /// untouched and reports what the status is now.
    pub fn update_from_stale_status_is_refused(
        repo: &dyn ApplicationRepository,
        f: &Fixture,
    ) {
        let created = repo.create(draft(f, &f.team_id)).unwrap();

        let result = repo.update(
            &created.id,
            ApplicationChanges {
                expected: ApplicationStatus::InProgress,
                status: Some(StatusChange {
                    status: ApplicationStatus::Accepted,
                    at: Utc::now().naive_utc(),
                }),
                roster: Some(BTreeSet::new()),
            },
        );

        assert!(matches!(
            result,
            Err(StoreError::StatusChanged(ApplicationStatus::Draft))
        ));
        assert_eq!(repo.find(&created.id).unwrap(), Some(created));
    }

    pub fn tournament_listing_filters_by_status(
        repo: &dyn ApplicationRepository,
        f: &Fixture,
    ) {
        let submitted = repo.create(draft(f, &f.team_id)).unwrap();
        repo.create(draft(f, &f.other_team_id)).unwrap();
        repo.update(
            &submitted.id,
            ApplicationChanges {
                expected: ApplicationStatus::Draft,
                status: Some(StatusChange {
                    status: ApplicationStatus::InProgress,
                    at: Utc::now().naive_utc(),
                }),
                roster: None,
            },
        )
        .unwrap();

        let visible = repo
            .list_for_tournament(
                &f.tournament_id,
                &[ApplicationStatus::InProgress],
            )
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, submitted.id);
        assert_eq!(visible[0].roster, roster(&f.players[..2]));

        let all = repo
            .list_for_tournament(&f.tournament_id, &ApplicationStatus::ALL)
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(
            repo.list_for_tournament("missing", &ApplicationStatus::ALL)
                .unwrap()
                .is_empty()
        );
    }

    /// Fires `n` creates for the same pair at once.
    pub fn concurrent_creates_admit_one(
        repo: Arc<dyn ApplicationRepository>,
        f: &Fixture,
        n: usize,
    ) {
        let barrier = Arc::new(Barrier::new(n));

        let results = thread::scope(|s| {
            let handles = (0..n)
                .map(|_| {
                    let repo = repo.clone();
                    let barrier = barrier.clone();
                    let new = draft(f, &f.team_id);
                    s.spawn(move || {
                        barrier.wait();
                        repo.create(new)
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::Conflict)))
            .count();

        assert_eq!(ok, 1, "{results:?}");
        assert_eq!(conflicts, n - 1, "{results:?}");
        assert_eq!(repo.list_for_team(&f.team_id).unwrap().len(), 1);
    }

    /// Fires `n` updates which all expect the application to be in progress
    /// and each move it somewhere else. Only the first may land.
    pub fn concurrent_updates_admit_one(
        repo: Arc<dyn ApplicationRepository>,
        f: &Fixture,
        n: usize,
    ) {
        let created = repo.create(draft(f, &f.team_id)).unwrap();
        repo.update(
            &created.id,
            ApplicationChanges {
                expected: ApplicationStatus::Draft,
                status: Some(StatusChange {
                    status: ApplicationStatus::InProgress,
                    at: Utc::now().naive_utc(),
                }),
                roster: None,
            },
        )
        .unwrap();

        let targets = [
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Canceled,
        ];
        let barrier = Arc::new(Barrier::new(n));

        let results = thread::scope(|s| {
            let handles = (0..n)
                .map(|i| {
                    let repo = repo.clone();
                    let barrier = barrier.clone();
                    let id = created.id.clone();
                    let to = targets[i % targets.len()];
                    s.spawn(move || {
                        barrier.wait();
                        repo.update(
                            &id,
                            ApplicationChanges {
                                expected: ApplicationStatus::InProgress,
                                status: Some(StatusChange {
                                    status: to,
                                    at: Utc::now().naive_utc(),
                                }),
                                roster: None,
                            },
                        )
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });

        let winners = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .collect::<Vec<_>>();
        assert_eq!(winners.len(), 1, "{results:?}");
        assert!(
            results.iter().all(|r| matches!(
                r,
                Ok(_) | Err(StoreError::StatusChanged(_))
            )),
            "{results:?}"
        );
        assert_eq!(
            repo.find(&created.id).unwrap().unwrap().status,
            winners[0].status
        );
    }
}
