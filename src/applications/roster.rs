use std::collections::BTreeSet;

use itertools::{Either, Itertools};

/// The roster an application ends up with: the requested players that are
/// currently on the team. Anything else is dropped.
pub fn effective_roster(
    team_roster: &BTreeSet<String>,
    requested: &[String],
) -> BTreeSet<String> {
    let (kept, dropped): (BTreeSet<String>, Vec<&String>) =
        requested.iter().partition_map(|id| {
            if team_roster.contains(id) {
                Either::Left(id.clone())
            } else {
                Either::Right(id)
            }
        });

    if !dropped.is_empty() {
        tracing::debug!(?dropped, "ignoring players who are not on the team");
    }

    kept
}
