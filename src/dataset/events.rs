use std::time::Duration;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecommenderError, Result};
use crate::Bag;

/// One laboratory result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabEvent {
    pub subject_id: u64,
    /// Chart time, seconds since the Unix epoch
    pub charttime: i64,
    /// Test name
    pub label: String,
}

impl LabEvent {
    pub fn new(subject_id: u64, charttime: i64, label: impl Into<String>) -> Self {
        Self { subject_id, charttime, label: label.into() }
    }
}

/// Group events into bags of tests requested together.
///
/// Events of the same subject whose chart time falls in the same `window`
/// bucket form one bag. Items inside a bag are deduplicated and sorted;
/// bags with fewer than two tests are dropped, and identical bags are kept
/// once, in order of first appearance.
pub fn bags_from_events<I>(events: I, window: Duration) -> Result<Vec<Bag>>
where
    I: IntoIterator<Item = LabEvent>,
{
    let window_secs = window.as_secs() as i64;
    if window_secs <= 0 {
        return Err(RecommenderError::invalid("window", format!("{window:?}")));
    }
    let mut groups: IndexMap<(u64, i64), IndexSet<String>> = IndexMap::new();
    let mut n_events = 0usize;
    for event in events {
        n_events += 1;
        groups
            .entry((event.subject_id, event.charttime.div_euclid(window_secs)))
            .or_default()
            .insert(event.label);
    }

    let mut bags: IndexSet<Bag> = IndexSet::new();
    for (_, items) in groups {
        if items.len() > 1 {
            let mut bag: Bag = items.into_iter().collect();
            bag.sort();
            bags.insert(bag);
        }
    }
    debug!(events = n_events, bags = bags.len(), "grouped lab events into bags");
    Ok(bags.into_iter().collect())
}
