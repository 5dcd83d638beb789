//! Winner resolution for `pencatatan` records.
//!
//! Each parent record carries zero or more nested winners. Resolution
//! flattens them into one row per winner, joins each row back to its parent
//! through an id-keyed arena, and keeps only rows whose provider name
//! contains the organization name.

use std::collections::HashMap;

use tracing::{debug, warn};

use tenderstat_shared::{RawRecord, RecordId, Winner};

/// One flattened row: a parent record paired with a single winner.
#[derive(Debug, Clone, Copy)]
pub struct WinnerRow<'a> {
    pub parent: &'a RawRecord,
    pub winner: &'a Winner,
}

/// Output of [`resolve`].
#[derive(Debug, Default)]
pub struct Resolution<'a> {
    /// Rows whose provider matched, in flatten order.
    pub rows: Vec<WinnerRow<'a>>,
    /// Rows produced by the join before filtering.
    pub flattened: usize,
    /// Joined rows dropped by the provider filter.
    pub unmatched: usize,
    /// Ids shared by more than one parent record (these fan out).
    pub duplicate_ids: Vec<RecordId>,
}

/// Parent records indexed by id. Parents sharing an id keep input order.
struct ParentArena<'a> {
    by_id: HashMap<&'a RecordId, Vec<&'a RawRecord>>,
    duplicate_ids: Vec<RecordId>,
}

impl<'a> ParentArena<'a> {
    fn build(records: &[&'a RawRecord]) -> Self {
        let mut by_id: HashMap<&'a RecordId, Vec<&'a RawRecord>> = HashMap::new();
        let mut duplicate_ids = Vec::new();

        for &record in records {
            let parents = by_id.entry(&record.id).or_default();
            if parents.len() == 1 {
                duplicate_ids.push(record.id.clone());
            }
            parents.push(record);
        }

        Self {
            by_id,
            duplicate_ids,
        }
    }

    fn parents(&self, id: &RecordId) -> &[&'a RawRecord] {
        self.by_id.get(id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Case-insensitive substring match of `organization` in a provider name.
///
/// A missing or non-string provider name never matches.
pub fn provider_matches(winner: &Winner, organization_lower: &str) -> bool {
    winner
        .provider_name
        .as_text()
        .is_some_and(|name| name.to_lowercase().contains(organization_lower))
}

/// Flatten winners, join them to their parents by id, and filter by provider.
///
/// A record with no winners contributes no rows. When several parents share
/// an id, every winner row under that id joins to every one of them.
pub fn resolve<'a>(records: &[&'a RawRecord], organization: &str) -> Resolution<'a> {
    let arena = ParentArena::build(records);
    for id in &arena.duplicate_ids {
        warn!(%id, "several pencatatan records share an id; winner rows will fan out");
    }

    let flat: Vec<(&'a RecordId, &'a Winner)> = records
        .iter()
        .flat_map(|&record| record.winners.entries().iter().map(move |w| (&record.id, w)))
        .collect();

    let needle = organization.to_lowercase();
    let mut resolution = Resolution::default();

    for (id, winner) in flat {
        for &parent in arena.parents(id) {
            resolution.flattened += 1;
            if provider_matches(winner, &needle) {
                resolution.rows.push(WinnerRow { parent, winner });
            } else {
                resolution.unmatched += 1;
            }
        }
    }

    debug!(
        parents = records.len(),
        flattened = resolution.flattened,
        matched = resolution.rows.len(),
        "winners resolved"
    );

    resolution.duplicate_ids = arena.duplicate_ids;
    resolution
}
