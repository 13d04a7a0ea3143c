mod group;
mod parser;
mod sport;
mod taxonomy;

#[cfg(feature = "ics")]
mod ics;

pub use group::{group_events, Group, GroupKey, MAIN_EVENT};
pub use parser::ParseReport;
pub use sport::{Calendar, CalendarEntry, Category, Event, Sport};
pub use taxonomy::{Games, Registry, TaxonomyError};
