use chrono::NaiveDateTime;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// One scheduled occurrence pulled out of a schedule page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Event {
    pub name: String,
    pub location: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Name of the owning category, stamped when the event is appended.
    pub category: String,
}

impl Event {
    pub fn new<S, L>(name: S, location: L, start: NaiveDateTime, end: NaiveDateTime) -> Self
    where
        S: Into<String>,
        L: Into<String>,
    {
        Self {
            name: name.into(),
            location: location.into(),
            start,
            end,
            category: String::new(),
        }
    }
}

/// A named classification bucket inside a [`Sport`].
///
/// The name doubles as the prefix used to classify raw event names. The
/// optional redirect only changes the label events are listed under in
/// calendar descriptions, never how they are classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    redirect: Option<String>,
    events: Vec<Event>,
}

impl Category {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            redirect: None,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_redirect<S: Into<String>>(mut self, redirect: S) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Label used when rendering: the redirect if set, the own name otherwise.
    pub fn label(&self) -> &str {
        self.redirect.as_deref().unwrap_or(&self.name)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// One discipline with its own schedule page and category taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sport {
    name: String,
    url: String,
    icon: String,
    categories: Vec<Category>,
}

impl Sport {
    pub fn new<N, U, I>(name: N, url: U, icon: I, categories: Vec<Category>) -> Self
    where
        N: Into<String>,
        U: Into<String>,
        I: Into<String>,
    {
        Self {
            name: name.into(),
            url: url.into(),
            icon: icon.into(),
            categories,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns the first category, in declaration order, whose name is a
    /// case-sensitive prefix of `raw_name`.
    ///
    /// Declaration order wins over specificity: with `Men's` declared before
    /// `Men's Team`, `"Men's Team Foil"` lands in `Men's`.
    pub fn classify(&self, raw_name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| raw_name.starts_with(category.name.as_str()))
            .map(|category| category.name.as_str())
    }

    /// Appends `event` to the named category. Returns `false` if the sport
    /// has no such category.
    pub fn add_event(&mut self, category: &str, mut event: Event) -> bool {
        let Some(target) = self.categories.iter_mut().find(|c| c.name == category) else {
            return false;
        };

        event.category = target.name.clone();
        target.events.push(event);
        true
    }

    /// All events, category by category.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.categories.iter().flat_map(|category| category.events.iter())
    }

    pub fn event_count(&self) -> usize {
        self.categories.iter().map(|category| category.events.len()).sum()
    }
}

/// Input for one calendar entry: everything the calendar writer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CalendarEntry {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Calendar {
    pub name: String,
    pub entries: Vec<CalendarEntry>,
}

impl Calendar {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// File name the calendar is written to.
    pub fn file_name(&self) -> String {
        format!("{}.ics", self.name)
    }
}
