use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{debug, warn};
use olympics_parser::{Calendar, CalendarEntry, Registry};
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::pipeline::{collect_sport, Error};
use crate::source::ScheduleSource;

pub struct AppState<S> {
    pub registry: Registry,
    pub source: S,
    pub cache: Arc<Cache<String, Vec<CalendarEntry>>>,
}

type SharedState<S> = Arc<AppState<S>>;

pub fn router<S>(state: AppState<S>) -> Router
where
    S: ScheduleSource + Send + Sync + 'static,
{
    Router::new()
        .route("/sports", get(handle_sports::<S>))
        .route("/calendar", get(handle_calendar::<S>))
        .with_state(Arc::new(state))
}

#[derive(Serialize)]
struct SportSummary<'a> {
    name: &'a str,
    url: &'a str,
    icon: &'a str,
}

async fn handle_sports<S>(State(state): State<SharedState<S>>) -> Response
where
    S: ScheduleSource + Send + Sync + 'static,
{
    let sports = state
        .registry
        .sports()
        .iter()
        .map(|sport| SportSummary {
            name: sport.name(),
            url: sport.url(),
            icon: sport.icon(),
        })
        .collect::<Vec<_>>();

    Json(sports).into_response()
}

#[derive(Deserialize)]
struct CalendarQuery {
    /// Comma separated sport names.
    sports: String,
    #[serde(default)]
    json: bool,
}

async fn handle_calendar<S>(
    State(state): State<SharedState<S>>,
    Query(query): Query<CalendarQuery>,
) -> Response
where
    S: ScheduleSource + Send + Sync + 'static,
{
    let names = query
        .sports
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>();

    if names.is_empty() {
        return (StatusCode::BAD_REQUEST, "No sports selected").into_response();
    }

    if let Some(unknown) = names.iter().find(|name| state.registry.get(name).is_none()) {
        let err = Error::UnknownSport(unknown.to_string());
        return (StatusCode::NOT_FOUND, err.to_string()).into_response();
    }

    let mut calendar = Calendar::new(state.registry.calendar_name(&names));

    for name in &names {
        match fetch_entries(&state, name).await {
            Ok(entries) => calendar.entries.extend(entries.iter().cloned()),
            Err(err @ Error::UnknownSport(_)) => {
                return (StatusCode::NOT_FOUND, err.to_string()).into_response();
            }
            Err(err) => {
                warn!("{err}");
                return (StatusCode::BAD_GATEWAY, err.to_string()).into_response();
            }
        }
    }

    if query.json {
        return Json(calendar).into_response();
    }

    (
        [("content-type", "text/calendar")],
        calendar.to_ics().to_string(),
    )
        .into_response()
}

async fn fetch_entries<S>(
    state: &SharedState<S>,
    name: &str,
) -> Result<Arc<Vec<CalendarEntry>>, Error>
where
    S: ScheduleSource + Send + Sync + 'static,
{
    let key = name.to_string();
    if let Some(entries) = state.cache.get(&key).await {
        return Ok(entries);
    }

    let entries = collect_sport(&state.source, &state.registry, name).await?;
    let entries = Arc::clone(&state.cache).insert(key, entries).await;
    if state.cache.is_enabled() {
        debug!("Cached {name}, {} sports cached", state.cache.len().await);
    }

    Ok(entries)
}
