//! End-to-end walks over recorded portal pages
//!
//! The pages under `tests/fixtures` are served by `ReplayDriver`, so the full
//! summary → flat type → block → unit walk runs without a browser.

use hdb_flats::config::Config;
use hdb_flats::crawler::{select_links, ScrapeRequest, Walker};
use hdb_flats::driver::ReplayDriver;
use hdb_flats::grammar::{parse_available_flats, parse_block_page};
use hdb_flats::output::{write_records, OutputFormat};
use hdb_flats::retry::{Delay, NoDelay};
use hdb_flats::{LaunchSummary, ScrapeError, WalkState};
use std::cell::RefCell;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

const SUMMARY: &str = include_str!("../fixtures/summary.html");
const FLAT_TYPE_YISHUN_3: &str = include_str!("../fixtures/flat_type_yishun_3.html");
const BLOCK_315A: &str = include_str!("../fixtures/block_315a.html");
const BLOCK_316B: &str = include_str!("../fixtures/block_316b.html");
const BLOCK_EMPTY: &str = include_str!("../fixtures/block_empty.html");
const BLOCK_NO_SENTINEL: &str = include_str!("../fixtures/block_no_sentinel.html");

const SUMMARY_URL: &str =
    "https://services2.hdb.gov.sg/webapp/BP13AWFlatAvail/BP13SEstateSummary?sel=BTO";
const BLOCK_315A_SCRIPT: &str = "checkBlk('315A','N9C21','YS','3-Room')";
const BLOCK_316B_SCRIPT: &str = "checkBlk('316B','N9C21','YS','3-Room')";

/// Records every requested wait instead of sleeping
#[derive(Default)]
struct RecordingDelay {
    waits: RefCell<Vec<Duration>>,
}

impl RecordingDelay {
    fn count(&self, duration: Duration) -> usize {
        self.waits.borrow().iter().filter(|d| **d == duration).count()
    }
}

impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}

fn launches(summary: &str) -> Vec<LaunchSummary> {
    let base = Url::parse("https://services2.hdb.gov.sg").unwrap();
    parse_available_flats(summary, &base).unwrap()
}

/// URL of the Yishun 3-Room flat-type page as the summary publishes it
fn yishun_3_link() -> String {
    let launches = launches(SUMMARY);
    let request = ScrapeRequest::new("BTO", "Feb 2024")
        .with_flat_type(Some("3"))
        .with_town(Some("Yishun"));
    let links = select_links(&launches, &request);
    assert_eq!(links.len(), 1);
    links[0].link.clone()
}

fn portal() -> ReplayDriver {
    ReplayDriver::new()
        .with_page(SUMMARY_URL, SUMMARY)
        .with_page(yishun_3_link(), FLAT_TYPE_YISHUN_3)
        .with_render(BLOCK_315A_SCRIPT, BLOCK_315A)
        .with_render(BLOCK_316B_SCRIPT, BLOCK_316B)
}

/// Defaults with a settle wait distinct from the retry delays, so recorded
/// waits can be told apart
fn timed_config() -> Config {
    let mut config = Config::default();
    config.retry.render_settle = 2_000;
    config
}

fn yishun_3_request() -> ScrapeRequest {
    ScrapeRequest::new("BTO", "Feb 2024")
        .with_flat_type(Some("3"))
        .with_town(Some("Yishun"))
}

#[tokio::test]
async fn test_scrape_yishun_three_room() {
    let mut driver = portal();
    let config = Config::default();

    let records = Walker::new(&mut driver, &config, NoDelay)
        .scrape(&yishun_3_request())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].block_id, "315A");
    assert_eq!(records[1].block_id, "316B");
    for record in &records {
        assert_eq!(record.town, "Yishun");
        assert_eq!(record.flat_type, "3");
        assert_eq!(record.price, "$250,000");
        assert_eq!(record.size, "70 Sqm");
        assert_eq!(record.details.street(), Some("Yishun Avenue 9"));
        assert_eq!(record.details.get("Delivery Possession Date"), Some("Q1 2028"));
        assert_eq!(record.details.get("Lease Commencement Date"), None);
    }
    assert_eq!(records[0].unit, "#05-123");
    assert_eq!(records[1].unit, "#11-456");

    assert_eq!(driver.executions(), &[BLOCK_315A_SCRIPT, BLOCK_316B_SCRIPT]);
}

#[tokio::test]
async fn test_scraped_records_export_as_csv() {
    let mut driver = portal();
    let config = Config::default();
    let records = Walker::new(&mut driver, &config, NoDelay)
        .scrape(&yishun_3_request())
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("units.csv");
    write_records(&records, OutputFormat::Csv, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Town,Flat Type,Block,Street,Probable Completion Date,Delivery Possession Date,Ethnic Quota,Price,Size,Unit"
    );
    assert!(lines[1].starts_with("Yishun,3,315A,Yishun Avenue 9,"));
    assert!(lines[2].ends_with(",\"$250,000\",70 Sqm,#11-456"));
}

#[tokio::test]
async fn test_unknown_or_ambiguous_launch_scrapes_nothing() {
    let config = Config::default();

    let mut driver = portal();
    let records = Walker::new(&mut driver, &config, NoDelay)
        .scrape(&ScrapeRequest::new("BTO", "Aug 2031"))
        .await
        .unwrap();
    assert!(records.is_empty());
    assert!(driver.executions().is_empty());

    let duplicated = SUMMARY.replace("May 2024", "Feb 2024");
    let mut driver = portal().with_page(SUMMARY_URL, duplicated);
    let records = Walker::new(&mut driver, &config, NoDelay)
        .scrape(&yishun_3_request())
        .await
        .unwrap();
    assert!(records.is_empty());
    assert_eq!(driver.navigations(), &[SUMMARY_URL]);
}

#[test]
fn test_filters_select_matching_links_only() {
    let launches = launches(SUMMARY);

    let four_rooms = ScrapeRequest::new("BTO", "Feb 2024").with_flat_type(Some("4"));
    let selected = select_links(&launches, &four_rooms);
    assert_eq!(selected.len(), 2);
    assert!(selected.iter().all(|f| f.flat_type_label.contains("4-Room")));

    let tengah = four_rooms.clone().with_town(Some("TENGAH"));
    let selected = select_links(&launches, &tengah);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].context().town, "Tengah");

    let everything = ScrapeRequest::new("BTO", "Feb 2024")
        .with_flat_type(Some("All"))
        .with_town(Some(""));
    assert_eq!(select_links(&launches, &everything).len(), 3);
}

#[test]
fn test_percent_encoded_town_is_decoded() {
    let launches = launches(SUMMARY);
    let request = ScrapeRequest::new("BTO", "May 2024").with_flat_type(Some("2"));
    let selected = select_links(&launches, &request);

    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].flat_type_label, "2-Room Flexi");
    assert_eq!(selected[0].context().town, "Kallang/Whampoa");
    assert_eq!(selected[0].context().flat_type, "2");
}

#[tokio::test]
async fn test_empty_renders_are_retried_with_unit_delay() {
    let mut driver = portal().with_renders(
        BLOCK_316B_SCRIPT,
        vec![
            BLOCK_EMPTY.to_string(),
            BLOCK_EMPTY.to_string(),
            BLOCK_316B.to_string(),
        ],
    );
    let config = timed_config();
    let delay = RecordingDelay::default();

    let records = Walker::new(&mut driver, &config, &delay)
        .scrape(&yishun_3_request())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(driver.execution_count(BLOCK_316B_SCRIPT), 3);
    assert_eq!(delay.count(config.retry.unit_delay()), 2);
    // one settle wait per block execution
    assert_eq!(delay.count(config.retry.render_settle()), 4);
    assert_eq!(delay.count(config.retry.link_delay()), 0);
}

#[tokio::test]
async fn test_flaky_summary_is_retried_with_link_delay() {
    let mut driver = portal().failing_navigation(SUMMARY_URL, 2);
    let config = Config::default();
    let delay = RecordingDelay::default();

    let records = Walker::new(&mut driver, &config, &delay)
        .scrape(&yishun_3_request())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(delay.count(config.retry.link_delay()), 2);
    assert_eq!(
        driver.navigations().iter().filter(|u| *u == SUMMARY_URL).count(),
        3
    );
}

#[tokio::test]
async fn test_lingering_previous_block_is_not_scraped_twice() {
    let mut driver = portal().with_renders(
        BLOCK_316B_SCRIPT,
        vec![BLOCK_315A.to_string(), BLOCK_316B.to_string()],
    );
    let config = timed_config();
    let delay = RecordingDelay::default();

    let records = Walker::new(&mut driver, &config, &delay)
        .scrape(&yishun_3_request())
        .await
        .unwrap();

    let blocks: Vec<&str> = records.iter().map(|r| r.block_id.as_str()).collect();
    assert_eq!(blocks, vec!["315A", "316B"]);
    assert_eq!(driver.execution_count(BLOCK_316B_SCRIPT), 2);
    assert_eq!(delay.count(config.retry.unit_delay()), 1);
    assert_eq!(delay.count(config.retry.render_settle()), 3);
}

#[tokio::test]
async fn test_missing_sentinel_aborts_without_retry() {
    let mut driver = portal().with_render(BLOCK_316B_SCRIPT, BLOCK_NO_SENTINEL);
    let config = Config::default();

    let err = Walker::new(&mut driver, &config, NoDelay)
        .scrape(&yishun_3_request())
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::StructuralMismatch { .. }));
    assert_eq!(err.state(), Some(WalkState::AtBlockDetail));
    assert_eq!(driver.execution_count(BLOCK_316B_SCRIPT), 1);
}

#[tokio::test]
async fn test_bounded_retries_give_up() {
    let mut driver = portal().with_render(BLOCK_315A_SCRIPT, BLOCK_EMPTY);
    let mut config = Config::default();
    config.retry.max_attempts = Some(4);

    let err = Walker::new(&mut driver, &config, NoDelay)
        .scrape(&yishun_3_request())
        .await
        .unwrap_err();

    match err {
        ScrapeError::RetriesExhausted { state, attempts, last } => {
            assert_eq!(state, WalkState::AtBlockLinks);
            assert_eq!(attempts, 4);
            assert!(matches!(*last, ScrapeError::EmptyRender { .. }));
        }
        other => panic!("expected exhausted retries, got {}", other),
    }
    assert_eq!(driver.execution_count(BLOCK_315A_SCRIPT), 4);
    assert_eq!(driver.execution_count(BLOCK_316B_SCRIPT), 0);
}

#[test]
fn test_block_details_are_stable_across_reads() {
    let first = parse_block_page(BLOCK_315A).unwrap();
    let second = parse_block_page(BLOCK_315A).unwrap();

    assert_eq!(first.details, second.details);
    assert_eq!(
        first.details.get("Ethnic Quota"),
        Some("Malay-2, Chinese-8, Indian/Others-1")
    );
}
