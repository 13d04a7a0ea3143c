use chrono::{NaiveDate, NaiveDateTime};
use olympics_ical::pipeline::{build_calendar, collect_sport, Error, FailurePolicy};
use olympics_ical::source::StaticSource;
use olympics_parser::Registry;

const ATHLETICS_URL: &str = "https://olympics.com/tokyo-2020/en/schedule/athletics-schedule/";
const ATHLETICS_PAGE: &str = include_str!("fixtures/athletics-schedule.html");

const GOLF_URL: &str = "https://olympics.com/tokyo-2020/en/schedule/golf-schedule/";
const GOLF_PAGE: &str = r#"
    <div class="tk-article__part markdown">
      <h4>Date and Time: 29 July 07:30 - 16:00</h4>
      <h4>Venues: Kasumigaseki Country Club</h4>
      <ul><li>Men's Round 1</li></ul>
    </div>
"#;

fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn source() -> StaticSource {
    StaticSource::new()
        .with_page(ATHLETICS_URL, ATHLETICS_PAGE)
        .with_page(GOLF_URL, GOLF_PAGE)
}

#[tokio::test]
async fn athletics_page_becomes_grouped_entries() {
    let registry = Registry::tokyo_2020().unwrap();

    let entries = collect_sport(&source(), &registry, "Athletics").await.unwrap();

    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].title, "Athletics");
    assert_eq!(entries[0].location, "Olympic Stadium");
    assert_eq!(entries[0].start, at(7, 30, 9, 0));
    assert_eq!(entries[0].end, at(7, 30, 11, 30));
    assert_eq!(entries[0].url, ATHLETICS_URL);
    // `Women's 100m` is declared before `Women's 100m Hurdles` and wins.
    assert_eq!(
        entries[0].description,
        "Men's 100m\\n- Preliminary Round\\n\\nWomen's 100m\\n- Hurdles Round 1\\n- Round 1"
    );

    assert_eq!(entries[1].start, at(7, 30, 19, 0));
    assert_eq!(
        entries[1].description,
        "Men's 10,000m\\n- Final\\n\\nWomen's 100m\\n- Hurdles Semi-Final\\n\\nMixed 4 x 400m Relay\\n- Round 1"
    );

    assert_eq!(entries[2].location, "Sapporo Odori Park");
    assert_eq!(entries[2].start, at(8, 5, 5, 30));
    assert_eq!(entries[2].description, "Men's 20km Race Walk\\n- Main Event");
}

#[tokio::test]
async fn single_sport_calendar_is_named_after_it() {
    let registry = Registry::tokyo_2020().unwrap();

    let calendar = build_calendar(&source(), &registry, &["Athletics"], FailurePolicy::Abort)
        .await
        .unwrap();

    assert_eq!(calendar.name, "Tokyo 2020 - Athletics");
    assert_eq!(calendar.file_name(), "Tokyo 2020 - Athletics.ics");
    assert_eq!(calendar.entries.len(), 3);
}

#[tokio::test]
async fn sports_are_appended_in_selection_order() {
    let registry = Registry::tokyo_2020().unwrap();

    let calendar = build_calendar(
        &source(),
        &registry,
        &["Golf", "Athletics"],
        FailurePolicy::Abort,
    )
    .await
    .unwrap();

    assert_eq!(calendar.name, "Tokyo 2020");
    let titles = calendar
        .entries
        .iter()
        .map(|entry| entry.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, ["Golf", "Athletics", "Athletics", "Athletics"]);
}

#[tokio::test]
async fn fetch_failure_aborts_the_batch() {
    let registry = Registry::tokyo_2020().unwrap();

    let result = build_calendar(
        &source(),
        &registry,
        &["Athletics", "Fencing"],
        FailurePolicy::Abort,
    )
    .await;

    assert!(matches!(result, Err(Error::Fetch { sport, .. }) if sport == "Fencing"));
}

#[tokio::test]
async fn fetch_failure_can_be_skipped() {
    let registry = Registry::tokyo_2020().unwrap();

    let calendar = build_calendar(
        &source(),
        &registry,
        &["Fencing", "Golf"],
        FailurePolicy::Skip,
    )
    .await
    .unwrap();

    assert_eq!(calendar.entries.len(), 1);
    assert_eq!(calendar.entries[0].title, "Golf");
}

#[tokio::test]
async fn unknown_sport_is_rejected_up_front() {
    let registry = Registry::tokyo_2020().unwrap();

    let result = build_calendar(
        &StaticSource::new(),
        &registry,
        &["Quidditch"],
        FailurePolicy::Skip,
    )
    .await;

    assert!(matches!(result, Err(Error::UnknownSport(name)) if name == "Quidditch"));
}

#[tokio::test]
async fn reference_year_comes_from_registry() {
    let registry = Registry::tokyo_2020().unwrap().with_year(2020);

    let entries = collect_sport(&source(), &registry, "Golf").await.unwrap();

    assert_eq!(
        entries[0].start,
        NaiveDate::from_ymd_opt(2020, 7, 29)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap()
    );
}

#[tokio::test]
async fn repeated_runs_do_not_accumulate_events() {
    let registry = Registry::tokyo_2020().unwrap();

    let first = collect_sport(&source(), &registry, "Golf").await.unwrap();
    let second = collect_sport(&source(), &registry, "Golf").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second[0].description, "Men's\\n- Round 1");
}
