//! Greedy conflict resolution within mutual-exclusion groups.
//!
//! Candidates sharing a `(patient, group)` key are scanned in tie-break order:
//! priority descending, then order ID ascending, then instant ascending. A
//! candidate is accepted unless an already-accepted candidate of the same key
//! lies strictly within the overlap window of it. Accepted doses are never
//! bumped by later ones, so the result is a greedy packing rather than an
//! optimal one. Ungrouped candidates pass through untouched.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::Excluded;

use chrono::{DateTime, Duration, Utc};

use crate::occurrence::CandidateDose;
use crate::types::PatientId;

/// A candidate dropped because it overlapped an accepted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub candidate: CandidateDose,
    /// The accepted candidate it collided with.
    pub blocked_by: CandidateDose,
}

/// Outcome of conflict resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Surviving candidates, grouped candidates first in tie-break order.
    pub accepted: Vec<CandidateDose>,
    pub rejected: Vec<Rejection>,
}

/// Tie-break order used inside a group.
pub fn tie_break(a: &CandidateDose, b: &CandidateDose) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.order_id.cmp(&b.order_id))
        .then_with(|| a.instant.cmp(&b.instant))
}

/// Resolves overlaps between candidates of the same patient and group.
///
/// Two accepted candidates of one group are always at least `overlap_window`
/// apart.
pub fn resolve_conflicts(candidates: Vec<CandidateDose>, overlap_window: Duration) -> Resolution {
    let mut groups: BTreeMap<(PatientId, String), Vec<CandidateDose>> = BTreeMap::new();
    let mut ungrouped = Vec::new();

    for candidate in candidates {
        match &candidate.group {
            Some(group) => groups
                .entry((candidate.patient_id.clone(), group.clone()))
                .or_default()
                .push(candidate),
            None => ungrouped.push(candidate),
        }
    }

    let mut resolution = Resolution::default();
    for ((patient_id, group), mut members) in groups {
        members.sort_by(tie_break);
        let before = resolution.rejected.len();
        resolve_group(members, overlap_window, &mut resolution);
        tracing::debug!(
            patient = %patient_id,
            group = %group,
            rejected = resolution.rejected.len() - before,
            "resolved exclusion group"
        );
    }
    resolution.accepted.extend(ungrouped);
    resolution
}

fn resolve_group(members: Vec<CandidateDose>, overlap_window: Duration, resolution: &mut Resolution) {
    // Accepted instants of this group, pointing into `accepted`
    let mut index: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    let mut accepted: Vec<CandidateDose> = Vec::new();
    let mut rejected = Vec::new();

    for candidate in members {
        let blocker = if overlap_window > Duration::zero() {
            let low = candidate.instant - overlap_window;
            let high = candidate.instant + overlap_window;
            index
                .range((Excluded(low), Excluded(high)))
                .next()
                .map(|(_, &position)| position)
        } else {
            None
        };

        if let Some(position) = blocker {
            tracing::debug!(
                order = %candidate.order_id,
                instant = %candidate.instant,
                blocked_by = %accepted[position].order_id,
                "rejected overlapping dose"
            );
            rejected.push(Rejection {
                blocked_by: accepted[position].clone(),
                candidate,
            });
        } else {
            index.insert(candidate.instant, accepted.len());
            accepted.push(candidate);
        }
    }

    resolution.accepted.extend(accepted);
    resolution.rejected.extend(rejected);
}

/// Groups rejection counts by order, for summaries.
pub fn rejections_by_order(rejected: &[Rejection]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for rejection in rejected {
        *counts.entry(rejection.candidate.order_id.as_str()).or_insert(0) += 1;
    }
    counts
}
