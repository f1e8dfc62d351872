//! Validate command for checking an order file without scheduling it.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use dose_core::time::parse_instant;
use dose_core::{OrderInput, UtcOffset, find_invalid_orders, order_label};

use super::util::load_orders;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// JSON file with an array of orders, or `-` for stdin.
    #[arg(long)]
    pub orders: PathBuf,
}

pub fn run<W: Write>(writer: &mut W, args: &ValidateArgs) -> Result<()> {
    let orders = load_orders(&args.orders)?;
    let problems = check_orders(&orders);

    for problem in &problems {
        writeln!(writer, "{problem}")?;
    }

    if !problems.is_empty() {
        let invalid = count_invalid(&problems);
        bail!("{invalid} of {} order(s) invalid", orders.len());
    }

    writeln!(writer, "{} order(s) valid", orders.len())?;
    Ok(())
}

/// A single problem found in one order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Problem {
    index: usize,
    label: String,
    message: String,
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// Checks every order, reporting field violations first and then any
/// timestamp the scheduler would fail to parse.
fn check_orders(orders: &[OrderInput]) -> Vec<Problem> {
    let invalid = find_invalid_orders(orders);
    let invalid_indexes: HashSet<usize> = invalid.iter().map(|order| order.index).collect();

    let mut problems: Vec<Problem> = invalid
        .iter()
        .map(|order| Problem {
            index: order.index,
            label: order.label(),
            message: order.error.to_string(),
        })
        .collect();

    for (index, input) in orders.iter().enumerate() {
        if invalid_indexes.contains(&index) {
            continue;
        }
        // Field validation already accepted this offset
        let Ok(offset) = UtcOffset::from_minutes(input.utc_offset_minutes) else {
            continue;
        };

        let timestamps = std::iter::once(("start", input.start.as_str()))
            .chain(input.end.as_deref().map(|end| ("end", end)));
        for (field, value) in timestamps {
            if let Err(error) = parse_instant(value, offset) {
                problems.push(Problem {
                    index,
                    label: order_label(index, &input.id),
                    message: format!("{field}: {error}"),
                });
            }
        }
    }
    problems.sort_by_key(|problem| problem.index);

    tracing::debug!(
        orders = orders.len(),
        problems = problems.len(),
        "orders checked"
    );
    problems
}

fn count_invalid(problems: &[Problem]) -> usize {
    let mut indexes: Vec<usize> = problems.iter().map(|p| p.index).collect();
    indexes.dedup();
    indexes.len()
}
