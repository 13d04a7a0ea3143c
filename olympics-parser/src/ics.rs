use ics::{
    properties::{Description, DtEnd, DtStart, Location, Summary, TzName, URL},
    Standard, TimeZone,
};

use crate::{Calendar, CalendarEntry};

const TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

impl Calendar {
    #[must_use]
    pub fn to_ics(&self) -> ics::ICalendar<'_> {
        let mut jst = Standard::new("19700101T000000", "+0900", "+0900");
        jst.push(TzName::new("JST"));

        let mut icalendar = ics::ICalendar::new("2.0", &self.name);
        icalendar.add_timezone(TimeZone::standard("Asia/Tokyo", jst));

        for entry in &self.entries {
            icalendar.add_event(entry.to_ics());
        }

        icalendar
    }
}

impl CalendarEntry {
    /// Times are written as floating local time.
    #[must_use]
    pub fn to_ics(&self) -> ics::Event<'_> {
        let start = self.start.format(TIME_FORMAT).to_string();
        let end = self.end.format(TIME_FORMAT).to_string();

        let id = format!(
            "{}_{}_{}_{}",
            start,
            end,
            self.title.replace(' ', "-"),
            self.location.replace(' ', "-")
        );

        let mut ics_event = ics::Event::new(id, start.clone());

        ics_event.push(DtStart::new(start));
        ics_event.push(DtEnd::new(end));
        ics_event.push(Summary::new(escape(&self.title)));
        ics_event.push(Description::new(escape(&self.description)));
        ics_event.push(Location::new(escape(&self.location)));
        ics_event.push(URL::new(&self.url));

        ics_event
    }
}

/// Escapes `,` and `;`. Backslashes are left alone: descriptions already
/// carry escaped line breaks.
fn escape(text: &str) -> String {
    text.replace(',', "\\,").replace(';', "\\;")
}
