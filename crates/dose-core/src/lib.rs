//! Core domain logic for medication dose scheduling.
//!
//! This crate turns a batch of medication orders into concrete dose events
//! over a fixed multi-day horizon:
//! - Time arithmetic: fixed-offset local time to absolute instants and back
//! - Validation: range checks on every order field
//! - Occurrence generation: evenly spaced daily doses clipped to each order's window
//! - Conflict resolution: greedy packing inside mutual-exclusion groups
//! - Assembly: sorted events with content-derived identifiers

mod assemble;
pub mod conflict;
pub mod occurrence;
pub mod order;
mod schedule;
pub mod time;
pub mod types;

pub use assemble::{DoseEvent, DoseStatus, assemble_events, event_id};
pub use conflict::{Rejection, Resolution, rejections_by_order, resolve_conflicts};
pub use occurrence::{CandidateDose, Horizon, daily_dose_offsets, generate_candidates};
pub use order::{
    InvalidOrder, Order, OrderInput, find_invalid_orders, order_label, validate_order,
    validate_orders,
};
pub use schedule::{
    ScheduleConfig, ScheduleError, SchedulePlan, generate_dose_events, generate_dose_events_with,
    plan_dose_events,
};
pub use time::{MalformedTimestamp, UtcOffset};
pub use types::ValidationError;
