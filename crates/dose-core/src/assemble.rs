//! Final dose events built from accepted candidates.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::occurrence::CandidateDose;
use crate::time::render_local;
use crate::types::OrderId;

/// Lifecycle marker of a dose event. Scheduling only ever produces one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoseStatus {
    Scheduled,
}

impl DoseStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
        }
    }
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled administration of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseEvent {
    /// Content-derived identifier, see [`event_id`].
    pub id: String,
    pub order_id: OrderId,
    /// Local ISO 8601 time in the order's own offset.
    pub scheduled_at: String,
    pub status: DoseStatus,
}

/// Hex SHA-256 of the order ID followed by the rendered local timestamp.
///
/// The same order and timestamp always produce the same ID.
pub fn event_id(order_id: &str, scheduled_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(order_id.as_bytes());
    hasher.update(scheduled_at.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Turns accepted candidates into events sorted by instant, then order ID.
pub fn assemble_events(mut accepted: Vec<CandidateDose>) -> Vec<DoseEvent> {
    accepted.sort_by(|a, b| {
        a.instant
            .cmp(&b.instant)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });

    accepted
        .into_iter()
        .map(|candidate| {
            let scheduled_at = render_local(candidate.instant, candidate.utc_offset);
            DoseEvent {
                id: event_id(candidate.order_id.as_str(), &scheduled_at),
                order_id: candidate.order_id,
                scheduled_at,
                status: DoseStatus::Scheduled,
            }
        })
        .collect()
}
