//! Batch dose scheduling.
//!
//! Runs the full pipeline over an in-memory order list:
//! validation → per-order candidate generation → conflict resolution → event
//! assembly. Any invalid input aborts the batch with the first violation in
//! input order; no partial schedule is returned.

use chrono::Duration;
use rayon::prelude::*;
use thiserror::Error;

use crate::assemble::{DoseEvent, assemble_events};
use crate::conflict::{Rejection, resolve_conflicts};
use crate::occurrence::{CandidateDose, Horizon, generate_candidates};
use crate::order::{OrderInput, order_label, validate_orders};
use crate::time::{MalformedTimestamp, parse_date};
use crate::types::{HorizonDays, ValidationError};

/// Configuration for dose scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Minimum spacing between doses of one exclusion group.
    /// Default: 60 minutes.
    pub overlap_window_minutes: u32,

    /// Local time of each day's first template dose, in minutes after midnight.
    /// Default: 480 (08:00).
    pub daily_anchor_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            overlap_window_minutes: 60,
            daily_anchor_minutes: 8 * 60,
        }
    }
}

/// Reasons a scheduling batch is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The horizon or an order failed a field check.
    #[error("{context}: {source}")]
    Validation {
        context: String,
        #[source]
        source: ValidationError,
    },

    /// A date or timestamp could not be parsed.
    #[error("{context}: {source}")]
    MalformedTimestamp {
        context: String,
        #[source]
        source: MalformedTimestamp,
    },
}

impl ScheduleError {
    /// Name of the violated field, for validation failures.
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { source, .. } => Some(source.field()),
            Self::MalformedTimestamp { .. } => None,
        }
    }
}

/// Everything a scheduling run produced.
#[derive(Debug, Clone)]
pub struct SchedulePlan {
    /// Final events, sorted by instant then order ID.
    pub events: Vec<DoseEvent>,
    /// Candidates dropped by exclusion groups, with the dose that blocked each.
    pub rejected: Vec<Rejection>,
}

/// Generates dose events with the default configuration.
///
/// # Arguments
///
/// * `start_date` - First horizon day as `YYYY-MM-DD`
/// * `days` - Horizon length, 1 to 30
/// * `orders` - Orders to schedule
pub fn generate_dose_events(
    start_date: &str,
    days: i64,
    orders: &[OrderInput],
) -> Result<Vec<DoseEvent>, ScheduleError> {
    generate_dose_events_with(&ScheduleConfig::default(), start_date, days, orders)
}

/// Generates dose events with an explicit configuration.
pub fn generate_dose_events_with(
    config: &ScheduleConfig,
    start_date: &str,
    days: i64,
    orders: &[OrderInput],
) -> Result<Vec<DoseEvent>, ScheduleError> {
    plan_dose_events(config, start_date, days, orders).map(|plan| plan.events)
}

/// Runs the pipeline and keeps the rejected candidates alongside the events.
///
/// Field errors take precedence over timestamp errors: every order is
/// validated before any `start` or `end` is parsed, so a later order's field
/// violation is reported ahead of an earlier order's malformed timestamp.
pub fn plan_dose_events(
    config: &ScheduleConfig,
    start_date: &str,
    days: i64,
    orders: &[OrderInput],
) -> Result<SchedulePlan, ScheduleError> {
    // Horizon checks happen before any order is looked at
    let days = HorizonDays::new(days).map_err(|source| ScheduleError::Validation {
        context: "horizon".to_string(),
        source,
    })?;
    let start_date = parse_date(start_date).map_err(|source| ScheduleError::MalformedTimestamp {
        context: "start date".to_string(),
        source,
    })?;
    let horizon = Horizon::new(start_date, days);

    let orders = validate_orders(orders).map_err(|invalid| ScheduleError::Validation {
        context: invalid.label(),
        source: invalid.error,
    })?;

    tracing::debug!(
        orders = orders.len(),
        days = days.get(),
        start = %start_date,
        "generating dose candidates"
    );

    // Generation is independent per order; errors are still reported in input order
    let generated: Vec<Result<Vec<CandidateDose>, ScheduleError>> = orders
        .par_iter()
        .enumerate()
        .map(|(index, order)| {
            generate_candidates(&horizon, order, config.daily_anchor_minutes).map_err(|source| {
                ScheduleError::MalformedTimestamp {
                    context: order_label(index, order.id.as_str()),
                    source,
                }
            })
        })
        .collect();

    let mut candidates = Vec::new();
    for (order, result) in orders.iter().zip(generated) {
        let order_candidates = result?;
        tracing::trace!(order = %order.id, count = order_candidates.len(), "order candidates");
        candidates.extend(order_candidates);
    }

    let total = candidates.len();
    let overlap_window = Duration::minutes(i64::from(config.overlap_window_minutes));
    let resolution = resolve_conflicts(candidates, overlap_window);
    tracing::debug!(
        candidates = total,
        accepted = resolution.accepted.len(),
        rejected = resolution.rejected.len(),
        "resolved dose conflicts"
    );

    Ok(SchedulePlan {
        events: assemble_events(resolution.accepted),
        rejected: resolution.rejected,
    })
}
