use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::{Category, Sport};

const TOKYO_2020: &str = include_str!("../data/tokyo-2020.toml");

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("invalid taxonomy file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("sport `{0}` is declared more than once")]
    DuplicateSport(String),
    #[error("sport `{sport}` declares category `{category}` more than once")]
    DuplicateCategory { sport: String, category: String },
    #[error("sport `{0}` declares a category with an empty name")]
    EmptyCategory(String),
    #[error("category `{category}` of sport `{sport}` has an empty redirect")]
    EmptyRedirect { sport: String, category: String },
}

/// Settings shared by every sport of one edition of the games.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Games {
    pub name: String,
    /// Year combined with the day/month found in schedule headings.
    pub year: i32,
    pub schedule_url: String,
    pub asset_url: String,
}

#[derive(Deserialize)]
struct TaxonomyFile {
    games: Games,
    #[serde(default)]
    sports: Vec<SportEntry>,
}

#[derive(Deserialize)]
struct SportEntry {
    name: String,
    icon: String,
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryEntry {
    Plain(String),
    Aliased { name: String, redirect: String },
}

/// Every known sport, in declaration order.
///
/// Built once at startup and handed to whoever needs to look sports up.
/// The sports held here never carry events; [`Registry::instantiate`] hands
/// out copies to parse into.
#[derive(Debug, Clone)]
pub struct Registry {
    games: Games,
    sports: Vec<Sport>,
}

impl Registry {
    pub fn from_toml<S: AsRef<str>>(s: S) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = toml::from_str(s.as_ref())?;

        let mut seen = HashSet::new();
        let mut sports = Vec::with_capacity(file.sports.len());

        for entry in file.sports {
            if !seen.insert(entry.name.clone()) {
                return Err(TaxonomyError::DuplicateSport(entry.name));
            }

            let categories = build_categories(&entry.name, entry.categories)?;
            let url = schedule_url(&file.games.schedule_url, &entry.name);
            let icon = format!("{}{}", file.games.asset_url, entry.icon);

            sports.push(Sport::new(entry.name, url, icon, categories));
        }

        Ok(Self {
            games: file.games,
            sports,
        })
    }

    /// The built-in Tokyo 2020 taxonomy.
    pub fn tokyo_2020() -> Result<Self, TaxonomyError> {
        Self::from_toml(TOKYO_2020)
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.games.year = year;
        self
    }

    pub fn games(&self) -> &Games {
        &self.games
    }

    pub fn sports(&self) -> &[Sport] {
        &self.sports
    }

    pub fn get(&self, name: &str) -> Option<&Sport> {
        self.sports.iter().find(|sport| sport.name() == name)
    }

    /// A fresh, event-free copy of the named sport.
    pub fn instantiate(&self, name: &str) -> Option<Sport> {
        self.get(name).cloned()
    }

    /// Name of the calendar holding `sports`: the games name, suffixed with
    /// the sport when exactly one is selected.
    pub fn calendar_name<S: AsRef<str>>(&self, sports: &[S]) -> String {
        match sports {
            [sport] => format!("{} - {}", self.games.name, sport.as_ref()),
            _ => self.games.name.clone(),
        }
    }
}

fn build_categories(
    sport: &str,
    entries: Vec<CategoryEntry>,
) -> Result<Vec<Category>, TaxonomyError> {
    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(entries.len());

    for entry in entries {
        let category = match entry {
            CategoryEntry::Plain(name) => Category::new(name),
            CategoryEntry::Aliased { name, redirect } => {
                if redirect.is_empty() {
                    return Err(TaxonomyError::EmptyRedirect {
                        sport: sport.to_string(),
                        category: name,
                    });
                }
                Category::new(name).with_redirect(redirect)
            }
        };

        // An empty prefix would swallow every event of the sport.
        if category.name().is_empty() {
            return Err(TaxonomyError::EmptyCategory(sport.to_string()));
        }

        if !seen.insert(category.name().to_string()) {
            return Err(TaxonomyError::DuplicateCategory {
                sport: sport.to_string(),
                category: category.name().to_string(),
            });
        }

        categories.push(category);
    }

    Ok(categories)
}

/// `"Baseball/Softball"` -> `{base}baseball-schedule/`
pub(crate) fn schedule_url(base: &str, sport: &str) -> String {
    let slug = sport.to_lowercase().replace(' ', "-");
    let slug = slug.split('/').next().unwrap_or_default();
    format!("{base}{slug}-schedule/")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const BASE: &str = "https://olympics.com/tokyo-2020/en/schedule/";

    const SMALL: &str = r#"
        [games]
        name = "Test Games"
        year = 2030
        schedule_url = "https://example.test/schedule/"
        asset_url = "https://example.test"

        [[sports]]
        name = "Triathlon"
        icon = "/picto-tri.svg"
        categories = [
            "Men's",
            { name = "Men", redirect = "Men's" },
            "Mixed Relay",
        ]
    "#;

    #[rstest]
    #[case("Archery", "archery")]
    #[case("3x3 Basketball", "3x3-basketball")]
    #[case("Baseball/Softball", "baseball")]
    #[case("Cycling BMX Freestyle", "cycling-bmx-freestyle")]
    fn derives_schedule_url(#[case] sport: &str, #[case] slug: &str) {
        assert_eq!(
            schedule_url(BASE, sport),
            format!("{BASE}{slug}-schedule/")
        );
    }

    #[test]
    fn builtin_taxonomy_loads() {
        let registry = Registry::tokyo_2020().unwrap();

        assert_eq!(registry.games().name, "Tokyo 2020");
        assert_eq!(registry.games().year, 2021);
        assert_eq!(registry.sports().len(), 46);

        let swimming = registry.get("Swimming").unwrap();
        let relay = swimming
            .categories()
            .iter()
            .find(|category| category.name() == "Men's 4 x 200m Freestyle")
            .unwrap();
        assert_eq!(relay.label(), "Men's 4 x 200m Freestyle Relay");

        let gymnastics = registry.get("Artistic Gymnastics").unwrap();
        let names = gymnastics
            .categories()
            .iter()
            .map(Category::name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["Men's Team", "Women's Team", "Men's", "Women's"]);
    }

    #[test]
    fn builds_urls_and_icons() {
        let registry = Registry::from_toml(SMALL).unwrap();
        let triathlon = registry.get("Triathlon").unwrap();

        assert_eq!(triathlon.url(), "https://example.test/schedule/triathlon-schedule/");
        assert_eq!(triathlon.icon(), "https://example.test/picto-tri.svg");
        assert_eq!(triathlon.categories()[1].redirect(), Some("Men's"));
    }

    #[test]
    fn year_can_be_overridden() {
        let registry = Registry::from_toml(SMALL).unwrap().with_year(2021);
        assert_eq!(registry.games().year, 2021);
    }

    #[test]
    fn calendar_name_depends_on_selection() {
        let registry = Registry::from_toml(SMALL).unwrap();

        assert_eq!(registry.calendar_name(&["Triathlon"]), "Test Games - Triathlon");
        assert_eq!(registry.calendar_name(&["Triathlon", "Rowing"]), "Test Games");
    }

    #[test]
    fn instantiated_sports_are_independent() {
        let registry = Registry::from_toml(SMALL).unwrap();
        let mut sport = registry.instantiate("Triathlon").unwrap();
        let at = chrono::NaiveDate::from_ymd_opt(2030, 7, 26)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();

        sport.add_event("Men's", crate::Event::new("Men's Final", "Odaiba", at, at));

        assert_eq!(sport.event_count(), 1);
        assert_eq!(registry.get("Triathlon").unwrap().event_count(), 0);
    }

    #[rstest]
    #[case::duplicate_sport(
        "[[sports]]\nname = \"A\"\nicon = \"\"\n[[sports]]\nname = \"A\"\nicon = \"\"",
        "sport `A` is declared more than once"
    )]
    #[case::duplicate_category(
        "[[sports]]\nname = \"A\"\nicon = \"\"\ncategories = [\"Men's\", \"Men's\"]",
        "sport `A` declares category `Men's` more than once"
    )]
    #[case::empty_category(
        "[[sports]]\nname = \"A\"\nicon = \"\"\ncategories = [\"\"]",
        "sport `A` declares a category with an empty name"
    )]
    #[case::empty_redirect(
        "[[sports]]\nname = \"A\"\nicon = \"\"\ncategories = [{ name = \"Men\", redirect = \"\" }]",
        "category `Men` of sport `A` has an empty redirect"
    )]
    fn rejects_invalid_taxonomies(#[case] sports: &str, #[case] message: &str) {
        let toml = format!(
            "[games]\nname = \"G\"\nyear = 2021\nschedule_url = \"\"\nasset_url = \"\"\n{sports}"
        );

        let err = Registry::from_toml(toml).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            Registry::from_toml("[games"),
            Err(TaxonomyError::Toml(_))
        ));
    }
}
