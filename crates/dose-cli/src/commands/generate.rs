//! Generate command for expanding orders into dose events.
//!
//! This module implements `dosesched generate`, which schedules every order
//! over the requested horizon and prints the events either as aligned text
//! or as a JSON array.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dose_core::{SchedulePlan, plan_dose_events, rejections_by_order};

use super::util::load_orders;
use crate::Config;

/// Number of event ID characters shown in text output.
const SHORT_ID_LEN: usize = 12;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// First day of the horizon (YYYY-MM-DD).
    #[arg(long)]
    pub start: String,

    /// Horizon length in days (1-30). Defaults to `default_days` from config.
    #[arg(long, allow_negative_numbers = true)]
    pub days: Option<i64>,

    /// JSON file with an array of orders, or `-` for stdin.
    #[arg(long)]
    pub orders: PathBuf,

    /// Print events as a JSON array.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &GenerateArgs, config: &Config) -> Result<()> {
    let orders = load_orders(&args.orders)?;
    let days = args.days.unwrap_or(config.default_days);
    let schedule = config.schedule_config()?;

    let plan = plan_dose_events(&schedule, &args.start, days, &orders)?;
    tracing::debug!(events = plan.events.len(), "schedule generated");

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&plan.events)?)?;
    } else {
        write_schedule(writer, &plan, &args.start, days)?;
    }
    Ok(())
}

/// Writes the human-readable schedule.
pub fn write_schedule<W: Write>(
    writer: &mut W,
    plan: &SchedulePlan,
    start: &str,
    days: i64,
) -> std::io::Result<()> {
    if plan.events.is_empty() {
        writeln!(writer, "No doses scheduled.")?;
    }

    let width = plan
        .events
        .iter()
        .map(|event| event.order_id.as_str().chars().count())
        .max()
        .unwrap_or(0);
    for event in &plan.events {
        let short_id: String = event.id.chars().take(SHORT_ID_LEN).collect();
        writeln!(
            writer,
            "{}  {:<width$}  {}  {}",
            event.scheduled_at,
            event.order_id.as_str(),
            event.status.as_str(),
            short_id
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{} event(s) over {} day(s) starting {}",
        plan.events.len(),
        days,
        start
    )?;

    if !plan.rejected.is_empty() {
        let mut dropped: Vec<(&str, usize)> =
            rejections_by_order(&plan.rejected).into_iter().collect();
        dropped.sort_unstable();

        writeln!(
            writer,
            "{} dose(s) dropped by exclusion groups:",
            plan.rejected.len()
        )?;
        for (order_id, count) in dropped {
            writeln!(writer, "- {order_id}: {count}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    const ORDERS: &str = r#"[
        {
            "id": "rx-warfarin",
            "patient_id": "p-1",
            "utc_offset_minutes": 0,
            "start": "2026-01-15T00:00",
            "frequency_per_day": 2,
            "dose_window_minutes": 30,
            "group": "anticoagulant",
            "priority": 4
        },
        {
            "id": "rx-heparin",
            "patient_id": "p-1",
            "utc_offset_minutes": 0,
            "start": "2026-01-15T00:00",
            "frequency_per_day": 3,
            "dose_window_minutes": 15,
            "group": "anticoagulant",
            "priority": 2
        }
    ]"#;

    fn write_orders(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("orders.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn args(orders: PathBuf, days: Option<i64>, json: bool) -> GenerateArgs {
        GenerateArgs {
            start: "2026-01-15".to_string(),
            days,
            orders,
            json,
        }
    }

    #[test]
    fn generate_prints_aligned_schedule() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_orders(&temp, ORDERS);

        let mut output = Vec::new();
        run(&mut output, &args(path, Some(1), false), &Config::default()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        2026-01-15T08:00:00+00:00  rx-warfarin  SCHEDULED  492e936a2326
        2026-01-15T16:00:00+00:00  rx-heparin   SCHEDULED  d74c97c62d7a
        2026-01-15T20:00:00+00:00  rx-warfarin  SCHEDULED  a41a9e2ed2f3
        2026-01-16T00:00:00+00:00  rx-heparin   SCHEDULED  ad8471fccade

        4 event(s) over 1 day(s) starting 2026-01-15
        1 dose(s) dropped by exclusion groups:
        - rx-heparin: 1
        ");
    }

    #[test]
    fn generate_json_outputs_full_events() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_orders(&temp, ORDERS);

        let mut output = Vec::new();
        run(&mut output, &args(path, Some(1), true), &Config::default()).unwrap();

        let events: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let events = events.as_array().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0]["order_id"], "rx-warfarin");
        assert_eq!(events[0]["scheduled_at"], "2026-01-15T08:00:00+00:00");
        assert_eq!(events[0]["status"], "SCHEDULED");
        assert_eq!(
            events[0]["id"],
            "492e936a23268495a1f210dfc3976d2b14ee7089047035d317734bcc15ccb4e7"
        );
    }

    #[test]
    fn generate_uses_configured_default_days() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_orders(&temp, ORDERS);
        let config = Config {
            default_days: 2,
            ..Config::default()
        };

        let mut output = Vec::new();
        run(&mut output, &args(path, None, false), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("over 2 day(s) starting 2026-01-15"));
    }

    #[test]
    fn generate_reports_empty_schedule() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_orders(&temp, "[]");

        let mut output = Vec::new();
        run(&mut output, &args(path, Some(3), false), &Config::default()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        No doses scheduled.

        0 event(s) over 3 day(s) starting 2026-01-15
        ");
    }

    #[test]
    fn generate_rejects_out_of_range_days() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_orders(&temp, ORDERS);

        let mut output = Vec::new();
        let err = run(&mut output, &args(path, Some(31), false), &Config::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "horizon: days must be between 1 and 30, got 31"
        );
        assert!(output.is_empty());
    }
}
