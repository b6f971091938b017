use std::fmt;

use thiserror::Error;

use crate::{applications::status::TransitionError, error::StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Team,
    Tournament,
    Application,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Team => "team",
            Entity::Tournament => "tournament",
            Entity::Application => "application",
        })
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The entity does not exist, or the caller has no right to see it.
    /// Both cases look the same from outside.
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("this team has already applied to this tournament")]
    Conflict,
    /// Another request changed the application after it was read. The
    /// change asked for would still be allowed, so it may be retried.
    #[error("the application was changed by another request")]
    Stale,
    #[error(transparent)]
    Forbidden(#[from] TransitionError),
    #[error("failed to {context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Attaches the step that failed to a storage error.
pub(crate) trait StoreContext<T> {
    fn context(self, context: &'static str) -> ApplicationResult<T>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, context: &'static str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Store { context, source })
    }
}
