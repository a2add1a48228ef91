/// Walk state definitions for the portal hierarchy
///
/// This module defines the states the hierarchy walker moves through while
/// descending from the launch summary down to individual units.
use std::fmt;

/// Represents the walker's current position in the portal hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkState {
    /// Walker created, nothing fetched yet
    Idle,

    /// Reading the launch → town → flat-type summary page
    AtSummary,

    /// Enumerating block links on a flat-type page
    AtFlatTypeLinks,

    /// Activating a block and waiting for its units to render
    AtBlockLinks,

    /// Extracting block metadata and unit records from a rendered block
    AtBlockDetail,

    /// Every selected link has been walked
    Done,
}

impl WalkState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from this state to `next` is a legal step
    ///
    /// Moving back up the hierarchy is allowed only to continue with the
    /// next sibling (next block, next flat-type link).
    pub fn can_transition_to(&self, next: WalkState) -> bool {
        use WalkState::*;
        matches!(
            (self, next),
            (Idle, AtSummary)
                | (AtSummary, AtFlatTypeLinks)
                | (AtSummary, Done)
                | (AtFlatTypeLinks, AtBlockLinks)
                | (AtFlatTypeLinks, AtFlatTypeLinks)
                | (AtFlatTypeLinks, Done)
                | (AtBlockLinks, AtBlockDetail)
                | (AtBlockDetail, AtBlockLinks)
                | (AtBlockDetail, AtFlatTypeLinks)
                | (AtBlockDetail, Done)
        )
    }

    /// Human-readable name of the hierarchy level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AtSummary => "launch summary",
            Self::AtFlatTypeLinks => "flat-type links",
            Self::AtBlockLinks => "block links",
            Self::AtBlockDetail => "block detail",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WalkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
