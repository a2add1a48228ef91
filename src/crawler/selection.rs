//! Caller selection: which launch, flat type and town to walk
//!
//! `flat_type` is a room count ("3") matched as a substring of the row label
//! (`"3-Room"`); `town` matches a town name exactly, ignoring ASCII case. An
//! absent filter, an empty one, or `All` selects everything.

use crate::grammar::patterns;
use crate::models::{FlatTypeSummary, LaunchSummary};
use std::collections::BTreeSet;

/// Choice label meaning "no filter"
pub const ALL: &str = "All";

/// What to scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    /// Portal mode such as "BTO" or "SBF", passed through verbatim
    pub selection_type: String,
    /// Launch date label, matched exactly
    pub launch_date: String,
    pub flat_type: Option<String>,
    pub town: Option<String>,
}

impl ScrapeRequest {
    pub fn new(selection_type: impl Into<String>, launch_date: impl Into<String>) -> Self {
        Self {
            selection_type: selection_type.into(),
            launch_date: launch_date.into(),
            flat_type: None,
            town: None,
        }
    }

    pub fn with_flat_type(mut self, flat_type: Option<&str>) -> Self {
        self.flat_type = normalize_filter(flat_type);
        self
    }

    pub fn with_town(mut self, town: Option<&str>) -> Self {
        self.town = normalize_filter(town);
        self
    }

    /// Flat-type filter as shown to users ("3" or "All")
    pub fn flat_type_label(&self) -> &str {
        self.flat_type.as_deref().unwrap_or(ALL)
    }

    /// Town filter as shown to users ("Yishun" or "All")
    pub fn town_label(&self) -> &str {
        self.town.as_deref().unwrap_or(ALL)
    }
}

/// Maps empty and `All` filters to `None`
pub fn normalize_filter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
        .map(str::to_string)
}

/// Finds the single launch with this exact date label
///
/// Returns `None` when no launch or more than one launch carries the label.
pub fn find_launch<'a>(launches: &'a [LaunchSummary], launch_date: &str) -> Option<&'a LaunchSummary> {
    let mut matching = launches.iter().filter(|l| l.launch_date == launch_date);
    match (matching.next(), matching.next()) {
        (Some(launch), None) => Some(launch),
        _ => None,
    }
}

/// Flat-type links selected by a request, in page order
///
/// An ambiguous or unknown launch date selects nothing; that is an empty
/// walk, not an error.
pub fn select_links<'a>(
    launches: &'a [LaunchSummary],
    request: &ScrapeRequest,
) -> Vec<&'a FlatTypeSummary> {
    let Some(launch) = find_launch(launches, &request.launch_date) else {
        let count = launches
            .iter()
            .filter(|l| l.launch_date == request.launch_date)
            .count();
        tracing::warn!(
            "Launch date '{}' matches {} launches; nothing to scrape",
            request.launch_date,
            count
        );
        return Vec::new();
    };

    launch
        .towns
        .iter()
        .filter(|t| matches_town(&t.town, request.town.as_deref()))
        .flat_map(|t| t.flat_types.iter())
        .filter(|f| matches_flat_type(&f.flat_type_label, request.flat_type.as_deref()))
        .collect()
}

fn matches_town(town: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |wanted| town.trim().eq_ignore_ascii_case(wanted.trim()))
}

fn matches_flat_type(label: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |rooms| label.contains(&format!("{}-Room", rooms)))
}

/// Room counts offered by a launch, sorted, followed by `All`
pub fn flat_type_choices(launch: &LaunchSummary) -> Vec<String> {
    let rooms: BTreeSet<String> = launch
        .towns
        .iter()
        .flat_map(|t| t.flat_types.iter())
        .filter_map(|f| patterns::room_count(&f.flat_type_label))
        .collect();

    rooms.into_iter().chain([ALL.to_string()]).collect()
}

/// Towns offering the flat type, sorted, followed by `All`
pub fn town_choices(launch: &LaunchSummary, flat_type: Option<&str>) -> Vec<String> {
    let towns: BTreeSet<String> = launch
        .towns
        .iter()
        .filter(|t| {
            t.flat_types
                .iter()
                .any(|f| matches_flat_type(&f.flat_type_label, flat_type))
        })
        .map(|t| t.town.clone())
        .collect();

    towns.into_iter().chain([ALL.to_string()]).collect()
}
