use log::{info, warn};
use olympics_parser::{Calendar, CalendarEntry, Registry};
use thiserror::Error;

use crate::source::{FetchError, ScheduleSource};

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown sport `{0}`")]
    UnknownSport(String),
    #[error("failed to fetch the {sport} schedule: {source}")]
    Fetch {
        sport: String,
        #[source]
        source: FetchError,
    },
}

/// What to do when a sport's schedule cannot be retrieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Give up on the whole calendar.
    #[default]
    Abort,
    /// Leave the sport out and carry on.
    Skip,
}

/// Fetches, parses and groups the schedule of one sport.
pub async fn collect_sport<S: ScheduleSource>(
    source: &S,
    registry: &Registry,
    name: &str,
) -> Result<Vec<CalendarEntry>, Error> {
    let mut sport = registry
        .instantiate(name)
        .ok_or_else(|| Error::UnknownSport(name.to_string()))?;

    info!("Fetching {} schedule from {}", name, sport.url());

    let html = source.fetch(sport.url()).await.map_err(|source| Error::Fetch {
        sport: name.to_string(),
        source,
    })?;

    let report = sport.parse_schedule(&html, registry.games().year);
    if !report.unclassified.is_empty() {
        warn!(
            "{name}: {} events matched no category",
            report.unclassified.len()
        );
    }

    let entries = sport.calendar_entries();
    info!(
        "{name}: {} events in {} calendar entries",
        report.events_added,
        entries.len()
    );

    Ok(entries)
}

/// Builds one calendar out of the selected sports, one sport at a time.
///
/// Unknown names are rejected before anything is fetched.
pub async fn build_calendar<S, N>(
    source: &S,
    registry: &Registry,
    names: &[N],
    policy: FailurePolicy,
) -> Result<Calendar, Error>
where
    S: ScheduleSource,
    N: AsRef<str>,
{
    if let Some(unknown) = names
        .iter()
        .map(|name| name.as_ref())
        .find(|name| registry.get(name).is_none())
    {
        return Err(Error::UnknownSport(unknown.to_string()));
    }

    let mut calendar = Calendar::new(registry.calendar_name(names));

    for name in names {
        match collect_sport(source, registry, name.as_ref()).await {
            Ok(mut entries) => calendar.entries.append(&mut entries),
            Err(err @ Error::Fetch { .. }) if policy == FailurePolicy::Skip => {
                warn!("Leaving out {}: {err}", name.as_ref());
            }
            Err(err) => return Err(err),
        }
    }

    Ok(calendar)
}
