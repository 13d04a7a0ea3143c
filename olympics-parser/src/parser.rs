use chrono::{Month, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{Event, Sport};

macro_rules! selector {
    ($query:expr) => {{
        static SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse($query).unwrap());
        &SELECTOR
    }};
}

macro_rules! regex {
    ($pattern:expr) => {{
        static REGEX: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).unwrap());
        &REGEX
    }};
}

/// What a single [`Sport::parse_schedule`] run did with the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub events_added: usize,
    /// Heading pairs without a usable date/time or venue.
    pub blocks_skipped: usize,
    /// Raw names no category matched.
    pub unclassified: Vec<String>,
}

impl Sport {
    /// Extracts every event from a schedule page and appends it to the
    /// matching category.
    ///
    /// Each article part holds `h4` headings in pairs (date and time, then
    /// venue) and one `ul` per pair whose items are the event names. The
    /// heading following a date heading is taken as its venue without
    /// further checks, so a stray heading shifts every later pair of the
    /// part.
    pub fn parse_schedule<S: AsRef<str>>(&mut self, html: S, year: i32) -> ParseReport {
        let html = Html::parse_document(html.as_ref());
        let mut report = ParseReport::default();

        for part in html.select(selector!(".tk-article__part.markdown")) {
            let headings = part.select(selector!("h4")).map(inner_text).collect::<Vec<_>>();
            let lists = part.select(selector!("ul")).collect::<Vec<_>>();

            for (index, pair) in headings.chunks(2).enumerate() {
                let Some((start, end)) = parse_date_time(&pair[0], year) else {
                    debug!("{}: skipping heading {:?}", self.name(), pair[0]);
                    report.blocks_skipped += 1;
                    continue;
                };

                let Some(location) = pair.get(1).and_then(|heading| parse_venue(heading)) else {
                    warn!("{}: no venue after {:?}", self.name(), pair[0]);
                    report.blocks_skipped += 1;
                    continue;
                };

                let Some(list) = lists.get(index) else {
                    continue;
                };

                for item in list.select(selector!("li")) {
                    let name = inner_text(item);

                    let Some(category) = self.classify(&name).map(str::to_owned) else {
                        warn!("{}: no category for {:?}", self.name(), name);
                        report.unclassified.push(name);
                        continue;
                    };

                    let event = Event::new(name, location.clone(), start, end);
                    if self.add_event(&category, event) {
                        report.events_added += 1;
                    }
                }
            }
        }

        debug!(
            "{}: {} events, {} blocks skipped, {} unclassified",
            self.name(),
            report.events_added,
            report.blocks_skipped,
            report.unclassified.len()
        );

        report
    }
}

/// Rendered text of an element with whitespace runs collapsed.
fn inner_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_date_time(heading: &str, year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let captures =
        regex!(r"Date and Time: (.+) (\d{1,2}:\d{2}) - (\d{1,2}:\d{2})").captures(heading)?;

    let date = parse_date(&captures[1], year)?;
    let start = NaiveTime::parse_from_str(&captures[2], "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(&captures[3], "%H:%M").ok()?;

    Some((date.and_time(start), date.and_time(end)))
}

fn parse_venue(heading: &str) -> Option<String> {
    let captures = regex!(r"Venues: (.+)").captures(heading)?;
    Some(captures[1].trim().to_string())
}

/// Picks the day number and month name out of phrases like `24 July`,
/// `Sat, 24 Jul` or `July 24th`. Weekday names are ignored.
fn parse_date(phrase: &str, year: i32) -> Option<NaiveDate> {
    let mut day = None;
    let mut month = None;

    for token in phrase.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }

        if day.is_none() {
            let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
            if let Ok(value) = digits.parse::<u32>() {
                day = Some(value);
                continue;
            }
        }

        if month.is_none() {
            if let Ok(value) = token.trim_end_matches('.').parse::<Month>() {
                month = Some(value);
            }
        }
    }

    NaiveDate::from_ymd_opt(year, month?.number_from_month(), day?)
}
