//! Medication orders and their field validation.
//!
//! [`OrderInput`] is the wire shape callers deserialize; [`Order`] is the
//! validated form the scheduler works with. Timestamps stay as strings here
//! and are parsed against the order's offset during occurrence generation.

use serde::{Deserialize, Serialize};

use crate::time::UtcOffset;
use crate::types::{DosesPerDay, OrderId, PatientId, Priority, ValidationError};

/// An order as received from a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInput {
    pub id: String,
    pub patient_id: String,
    pub utc_offset_minutes: i64,
    /// Start of the active window, local to the order's offset unless qualified.
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub frequency_per_day: i64,
    pub dose_window_minutes: i64,
    /// Mutual-exclusion group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub priority: i64,
}

/// A validated medication order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub patient_id: PatientId,
    pub utc_offset: UtcOffset,
    pub start: String,
    /// `None` means the order never ends.
    pub end: Option<String>,
    pub frequency: DosesPerDay,
    pub dose_window_minutes: u32,
    /// `None` means the order's doses never conflict with anything.
    pub group: Option<String>,
    pub priority: Priority,
}

impl TryFrom<OrderInput> for Order {
    type Error = ValidationError;

    /// Checks fields in declaration order and reports the first violation.
    fn try_from(input: OrderInput) -> Result<Self, Self::Error> {
        let id = OrderId::new(input.id)?;
        let patient_id = PatientId::new(input.patient_id)?;
        let utc_offset = UtcOffset::from_minutes(input.utc_offset_minutes)?;
        let frequency = DosesPerDay::new(input.frequency_per_day)?;
        let priority = Priority::new(input.priority)?;
        let dose_window_minutes = dose_window(input.dose_window_minutes)?;
        let group = input.group.filter(|name| !name.trim().is_empty());

        Ok(Self {
            id,
            patient_id,
            utc_offset,
            start: input.start,
            end: input.end,
            frequency,
            dose_window_minutes,
            group,
            priority,
        })
    }
}

fn dose_window(minutes: i64) -> Result<u32, ValidationError> {
    if minutes < 0 {
        return Err(ValidationError::Negative {
            field: "dose_window_minutes",
            value: minutes,
        });
    }
    u32::try_from(minutes).map_err(|_| ValidationError::OutOfRange {
        field: "dose_window_minutes",
        value: minutes,
        min: 0,
        max: i64::from(u32::MAX),
    })
}

/// Validates a single order.
pub fn validate_order(input: &OrderInput) -> Result<Order, ValidationError> {
    Order::try_from(input.clone())
}

/// A validation failure tied to its position in the order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOrder {
    /// Zero-based position in the input list.
    pub index: usize,
    /// The raw identifier, which may itself be the invalid field.
    pub order_id: String,
    pub error: ValidationError,
}

impl InvalidOrder {
    /// Human-readable label such as `order 'rx-1'` or `order #3`.
    pub fn label(&self) -> String {
        order_label(self.index, &self.order_id)
    }
}

/// Label for the order at `index`, falling back to its position when the ID is blank.
pub fn order_label(index: usize, order_id: &str) -> String {
    if order_id.trim().is_empty() {
        format!("order #{index}")
    } else {
        format!("order '{order_id}'")
    }
}

/// Validates every order, stopping at the first violation in list order.
pub fn validate_orders(inputs: &[OrderInput]) -> Result<Vec<Order>, InvalidOrder> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            validate_order(input).map_err(|error| InvalidOrder {
                index,
                order_id: input.id.clone(),
                error,
            })
        })
        .collect()
}

/// Validates every order independently and returns all failures.
pub fn find_invalid_orders(inputs: &[OrderInput]) -> Vec<InvalidOrder> {
    inputs
        .iter()
        .enumerate()
        .filter_map(|(index, input)| {
            validate_order(input).err().map(|error| InvalidOrder {
                index,
                order_id: input.id.clone(),
                error,
            })
        })
        .collect()
}
