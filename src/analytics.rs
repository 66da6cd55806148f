use crate::resource::{AnalyticsEvent, Bookmark, ResourceRecord};
use serde::Serialize;
use std::{collections::HashMap, fmt::Display};

/// Default amount of entries on the dashboard leaderboard.
pub const DEFAULT_TOP_N: usize = 5;

/// The kind of interaction recorded in the analytics log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Download,
    View,
    Bookmark,
    Other(String),
}

impl From<&str> for ActionKind {
    fn from(value: &str) -> Self {
        match value {
            "download" => Self::Download,
            "view" => Self::View,
            "bookmark" => Self::Bookmark,
            other => Self::Other(other.to_string()),
        }
    }
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Download => "download",
            Self::View => "view",
            Self::Bookmark => "bookmark",
            Self::Other(other) => other,
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AnalyticsEvent {
    pub fn kind(&self) -> ActionKind {
        ActionKind::from(self.action.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResource {
    pub resource: ResourceRecord,
    pub effective_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_downloads: usize,
    pub total_views: usize,
    pub total_bookmarks: usize,
    pub top: Vec<RankedResource>,
}

/// Number of download events per resource. Resources without any
/// download event are absent from the map.
pub fn event_counts(events: &[AnalyticsEvent]) -> HashMap<uuid::Uuid, u64> {
    let mut counts = HashMap::new();
    for event in events {
        if event.kind() == ActionKind::Download {
            *counts.entry(event.resource_id).or_insert(0) += 1;
        }
    }
    counts
}

/// Download figure used for ranking.
///
/// The event log wins whenever it has at least one download for the
/// resource, otherwise the denormalized counter is used, and a missing
/// counter is 0. The fallback is decided per resource.
pub fn effective_count(resource: &ResourceRecord, counts: &HashMap<uuid::Uuid, u64>) -> u64 {
    counts
        .get(&resource.id)
        .copied()
        .or_else(|| {
            resource
                .download_count
                .map(|count| u64::try_from(count).unwrap_or(0))
        })
        .unwrap_or(0)
}

/// Order resources by effective download count, highest first, and keep
/// the first `top_n`. Equal counts keep their input order.
pub fn rank(
    resources: &[ResourceRecord],
    counts: &HashMap<uuid::Uuid, u64>,
    top_n: usize,
) -> Vec<RankedResource> {
    let mut ranked = resources
        .iter()
        .map(|resource| (resource, effective_count(resource, counts)))
        .collect::<Vec<_>>();

    // `sort_by` is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(resource, effective_count)| RankedResource {
            resource: resource.clone(),
            effective_count,
        })
        .collect()
}

/// Build the dashboard figures from an already fetched snapshot.
///
/// `events` is `None` when the event log could not be read, in which case
/// the ranking runs purely on the denormalized counters.
pub fn summarize(
    resources: &[ResourceRecord],
    events: Option<&[AnalyticsEvent]>,
    bookmarks: &[Bookmark],
    top_n: usize,
) -> AnalyticsSummary {
    let events = events.unwrap_or_default();
    let counts = event_counts(events);

    let count_kind = |kind: ActionKind| events.iter().filter(|e| e.kind() == kind).count();

    AnalyticsSummary {
        total_downloads: count_kind(ActionKind::Download),
        total_views: count_kind(ActionKind::View),
        total_bookmarks: bookmarks.len(),
        top: rank(resources, &counts, top_n),
    }
}
