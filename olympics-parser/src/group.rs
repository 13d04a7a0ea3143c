use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::{CalendarEntry, Category, Sport};

/// Name listed for an event whose raw name is nothing but its category.
pub const MAIN_EVENT: &str = "Main Event";

// Calendar descriptions carry escaped line breaks, not real ones.
const LINE: &str = "\\n";
const BLANK_LINE: &str = "\\n\\n";

/// Events sharing a key end up in the same calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: String,
}

/// Cleaned event names of one time slot and venue, keyed by category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: GroupKey,
    labels: Vec<(String, Vec<String>)>,
}

impl Group {
    fn new(key: GroupKey) -> Self {
        Self {
            key,
            labels: Vec::new(),
        }
    }

    fn push(&mut self, label: &str, name: String) {
        match self.labels.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, names)) => names.push(name),
            None => self.labels.push((label.to_string(), vec![name])),
        }
    }

    /// Labels in order of first appearance.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(label, _)| label.as_str())
    }

    /// Names listed under `label`, in insertion order.
    pub fn names(&self, label: &str) -> Option<&[String]> {
        self.labels
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, names)| names.as_slice())
    }

    /// Renders the group as a calendar description.
    ///
    /// Every label is followed by its names as `- name` lines, sorted
    /// case-insensitively; labels are separated by a blank line.
    pub fn describe(&self) -> String {
        let mut description = String::new();

        for (label, names) in &self.labels {
            description.push_str(BLANK_LINE);
            description.push_str(label);

            let mut names = names.iter().map(String::as_str).collect::<Vec<_>>();
            names.sort_by_cached_key(|name| name.to_lowercase());

            for name in names {
                description.push_str(LINE);
                description.push_str("- ");
                description.push_str(name);
            }
        }

        description
            .strip_prefix(BLANK_LINE)
            .unwrap_or(&description)
            .to_string()
    }
}

/// Partitions the events of `sport` by start, end and location.
///
/// Groups come out in order of their first event, walking categories in
/// declaration order.
pub fn group_events(sport: &Sport) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();

    for category in sport.categories() {
        for event in category.events() {
            let key = GroupKey {
                start: event.start,
                end: event.end,
                location: event.location.clone(),
            };

            let slot = *slots.entry(key.clone()).or_insert_with(|| {
                groups.push(Group::new(key));
                groups.len() - 1
            });

            groups[slot].push(category.label(), clean_name(&event.name, category));
        }
    }

    groups
}

/// `"Men's 100m - Heats"` under `Men's 100m` becomes `"Heats"`.
///
/// After the category prefix is gone, a leading separator followed by a space
/// is dropped only when the separator is punctuation. An alphanumeric first
/// word survives, so `"Men's 100m A Final"` keeps `"A Final"` rather than
/// losing its `A`.
fn clean_name(raw: &str, category: &Category) -> String {
    let stripped = raw
        .strip_prefix(category.label())
        .or_else(|| raw.strip_prefix(category.name()))
        .unwrap_or(raw)
        .trim();

    let mut chars = stripped.chars();
    let cleaned = match (chars.next(), chars.next()) {
        (Some(separator), Some(' ')) if !separator.is_alphanumeric() => {
            &stripped[separator.len_utf8() + 1..]
        }
        _ => stripped,
    };

    if cleaned.is_empty() {
        MAIN_EVENT.to_string()
    } else {
        cleaned.to_string()
    }
}

impl Sport {
    /// One calendar entry per group of this sport's events.
    pub fn calendar_entries(&self) -> Vec<CalendarEntry> {
        group_events(self)
            .into_iter()
            .map(|group| {
                let description = group.describe();
                CalendarEntry {
                    title: self.name().to_string(),
                    description,
                    location: group.key.location,
                    start: group.key.start,
                    end: group.key.end,
                    url: self.url().to_string(),
                }
            })
            .collect()
    }
}
