//! Candidate dose generation for a single order.
//!
//! # Algorithm Summary
//!
//! 1. Resolve the horizon `[local midnight of start date, + days]` in the order's offset
//! 2. Intersect it with the order's own `[start, end]` window (end may be open)
//! 3. Lay a daily template over `days + 1` cycles anchored at the daily anchor
//!    (08:00 local by default), with `n` doses spaced evenly across 24 hours
//! 4. Keep template instants inside the intersection, inclusive on both ends

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::order::Order;
use crate::time::{MalformedTimestamp, UtcOffset, local_midnight, parse_instant};
use crate::types::{DosesPerDay, HorizonDays, OrderId, PatientId, Priority};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// The calendar window doses are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    /// First calendar day, interpreted in each order's own offset.
    pub start_date: NaiveDate,
    pub days: HorizonDays,
}

impl Horizon {
    pub const fn new(start_date: NaiveDate, days: HorizonDays) -> Self {
        Self { start_date, days }
    }

    /// Absolute `[start, end]` of the horizon for an order at `offset`.
    pub fn window(
        &self,
        offset: UtcOffset,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), MalformedTimestamp> {
        let start = local_midnight(self.start_date, offset)?;
        let end = start
            .checked_add_signed(Duration::days(i64::from(self.days.get())))
            .ok_or_else(|| MalformedTimestamp {
                value: self.start_date.to_string(),
            })?;
        Ok((start, end))
    }
}

/// A generated dose instant awaiting conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDose {
    pub order_id: OrderId,
    pub patient_id: PatientId,
    pub group: Option<String>,
    pub priority: Priority,
    /// When the dose is due.
    pub instant: DateTime<Utc>,
    /// The order's offset, kept for rendering the final event.
    pub utc_offset: UtcOffset,
    pub dose_window_minutes: u32,
}

/// Minute offsets of each dose from the daily anchor.
///
/// Dose `i` of `n` sits at `round(i * 1440 / n)` minutes.
pub fn daily_dose_offsets(frequency: DosesPerDay) -> Vec<i64> {
    let n = i64::from(frequency.get());
    (0..n)
        .map(|i| (2 * i * MINUTES_PER_DAY + n) / (2 * n))
        .collect()
}

/// Generates the candidate doses of one order over `horizon`.
///
/// `daily_anchor_minutes` is the local time of the first dose of each day,
/// in minutes after midnight. Returns an empty list when the order's active
/// window misses the horizon entirely.
pub fn generate_candidates(
    horizon: &Horizon,
    order: &Order,
    daily_anchor_minutes: u32,
) -> Result<Vec<CandidateDose>, MalformedTimestamp> {
    let offset = order.utc_offset;
    let (horizon_start, horizon_end) = horizon.window(offset)?;

    let order_start = parse_instant(&order.start, offset)?;
    let order_end = order
        .end
        .as_deref()
        .map(|end| parse_instant(end, offset))
        .transpose()?;

    let window_start = horizon_start.max(order_start);
    let window_end = order_end.map_or(horizon_end, |end| end.min(horizon_end));
    if window_start > window_end {
        return Ok(Vec::new());
    }

    let anchor = Duration::minutes(i64::from(daily_anchor_minutes));
    let dose_offsets = daily_dose_offsets(order.frequency);

    // One extra cycle catches doses pushed past the nominal end
    let mut instants = BTreeSet::new();
    for cycle in 0..=i64::from(horizon.days.get()) {
        // Slots past chrono's range are past the window too
        let Some(cycle_anchor) = horizon_start.checked_add_signed(Duration::days(cycle) + anchor)
        else {
            break;
        };
        for &minutes in &dose_offsets {
            let Some(instant) = cycle_anchor.checked_add_signed(Duration::minutes(minutes)) else {
                break;
            };
            if (window_start..=window_end).contains(&instant) {
                instants.insert(instant);
            }
        }
    }

    Ok(instants
        .into_iter()
        .map(|instant| CandidateDose {
            order_id: order.id.clone(),
            patient_id: order.patient_id.clone(),
            group: order.group.clone(),
            priority: order.priority,
            instant,
            utc_offset: offset,
            dose_window_minutes: order.dose_window_minutes,
        })
        .collect())
}
