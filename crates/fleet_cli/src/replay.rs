//! Drive one delivery through its whole round trip against a manual clock.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use fleet_core::clock::{seconds_between, Clock, ManualClock};
use fleet_core::config::TrackerConfig;
use fleet_core::destinations::{demo_destinations, find_demo_destination};
use fleet_core::model::{DeliveryId, Destination, DriverId, TripPhase};
use fleet_core::store::MemoryStore;
use fleet_core::telemetry_export::write_delivery_history_parquet;
use fleet_core::tracker::{AssignRequest, FleetTracker};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// The seeded default driver.
const REPLAY_DRIVER: DriverId = DriverId(1);

/// Longest simulated gap allowed between two polls.
const MAX_STEP_SECS: f64 = 86_400.0;

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Demo destination name; a seeded random pick when omitted
    #[arg(long)]
    pub destination: Option<String>,
    /// Seed for the random destination pick
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Simulated seconds between polls
    #[arg(long, default_value_t = 60.0)]
    pub step_secs: f64,
    /// Assignment time as unix seconds (defaults to now)
    #[arg(long)]
    pub start_unix: Option<i64>,
    /// Write the delivery history to this parquet file when done
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// One poll of the replayed trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub t_secs: f64,
    pub phase: TripPhase,
    pub lat: f64,
    pub lng: f64,
    pub status_label: String,
    pub eta: String,
    pub progress_pct: u8,
    pub wrote: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub delivery_id: DeliveryId,
    pub destination: String,
    pub frames: usize,
    pub trip_secs: f64,
}

fn pick_destination(args: &ReplayArgs) -> Result<Destination, Box<dyn Error>> {
    match &args.destination {
        Some(name) => find_demo_destination(name)
            .ok_or_else(|| format!("unknown demo destination '{name}'").into()),
        None => {
            let mut rng = StdRng::seed_from_u64(args.seed);
            demo_destinations()
                .choose(&mut rng)
                .cloned()
                .ok_or_else(|| "demo destination pool is empty".into())
        }
    }
}

fn start_time(args: &ReplayArgs) -> Result<DateTime<Utc>, Box<dyn Error>> {
    match args.start_unix {
        Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| format!("start time {secs} is out of range").into()),
        None => Ok(Utc::now()),
    }
}

pub fn run(
    config: TrackerConfig,
    args: &ReplayArgs,
    out: &mut impl Write,
) -> Result<ReplaySummary, Box<dyn Error>> {
    if !(args.step_secs.is_finite() && args.step_secs > 0.0) {
        return Err(format!("step must be positive, got {}", args.step_secs).into());
    }
    if args.step_secs > MAX_STEP_SECS {
        return Err(format!(
            "step must be at most {MAX_STEP_SECS} seconds, got {}",
            args.step_secs
        )
        .into());
    }
    let step = Duration::milliseconds((args.step_secs * 1000.0).round().max(1.0) as i64);
    let destination = pick_destination(args)?;
    let started = start_time(args)?;

    let clock = Arc::new(ManualClock::new(started));
    let tracker = FleetTracker::new(config, MemoryStore::seeded()?, clock.clone())?;
    let receipt = tracker.assign(AssignRequest {
        driver_id: Some(REPLAY_DRIVER),
        dest_name: destination.name.clone(),
        dest_lat: Some(destination.coordinate.lat),
        dest_lng: Some(destination.coordinate.lng),
        package_id: None,
    })?;
    tracing::info!(
        destination = %destination.name,
        distance_km = receipt.distance_km,
        eta_min = receipt.eta_to_dest_min,
        "replaying delivery"
    );

    let mut frames = 0;
    loop {
        let observation = tracker.driver_status(REPLAY_DRIVER)?;
        let Some(trip) = observation.trip else {
            return Err("replayed delivery disappeared before completing".into());
        };
        let frame = ReplayFrame {
            t_secs: seconds_between(started, clock.now()),
            phase: trip.phase,
            lat: trip.coordinate.lat,
            lng: trip.coordinate.lng,
            status_label: trip.status_label,
            eta: trip.eta,
            progress_pct: trip.progress_pct,
            wrote: observation
                .reconciliation
                .map(|outcome| outcome.wrote())
                .unwrap_or(false),
        };
        serde_json::to_writer(&mut *out, &frame)?;
        writeln!(out)?;
        frames += 1;

        if trip.phase == TripPhase::Completed {
            break;
        }
        let next = clock
            .now()
            .checked_add_signed(step)
            .ok_or("replay clock ran past the representable time range")?;
        clock.set(next);
    }

    if let Some(path) = &args.export {
        let history = tracker.history()?;
        write_delivery_history_parquet(path, &history)?;
        tracing::info!(path = %path.display(), rows = history.len(), "history exported");
    }

    Ok(ReplaySummary {
        delivery_id: receipt.delivery.id,
        destination: destination.name,
        frames,
        trip_secs: seconds_between(started, clock.now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(destination: Option<&str>) -> ReplayArgs {
        ReplayArgs {
            destination: destination.map(str::to_string),
            seed: 42,
            step_secs: 60.0,
            start_unix: Some(1_700_000_000),
            export: None,
        }
    }

    fn frames(output: &[u8]) -> Vec<ReplayFrame> {
        String::from_utf8(output.to_vec())
            .expect("utf8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("frame json"))
            .collect()
    }

    #[test]
    fn replay_walks_phases_in_order_and_ends_completed() {
        let mut out = Vec::new();
        let summary = run(TrackerConfig::default(), &args(Some("Pearson Airport")), &mut out)
            .expect("replay");
        let frames = frames(&out);

        assert_eq!(summary.frames, frames.len());
        assert_eq!(summary.destination, "Pearson Airport");
        assert!(frames.windows(2).all(|pair| pair[0].phase <= pair[1].phase));
        assert_eq!(frames[0].phase, TripPhase::EnRoute);
        assert_eq!(frames[0].progress_pct, 0);
        let last = frames.last().expect("at least one frame");
        assert_eq!(last.phase, TripPhase::Completed);
        assert_eq!(last.eta, "Arrived");
        assert!(last.wrote);
        assert!(frames.iter().any(|f| f.phase == TripPhase::Returning));
    }

    #[test]
    fn omitted_destination_is_a_reproducible_pick() {
        let first = pick_destination(&args(None)).expect("pick");
        let second = pick_destination(&args(None)).expect("pick");
        assert_eq!(first, second);
        assert!(demo_destinations().contains(&first));
    }

    #[test]
    fn unknown_destination_and_bad_step_are_errors() {
        let mut out = Vec::new();
        assert!(run(TrackerConfig::default(), &args(Some("Union Station")), &mut out).is_err());

        let mut bad_step = args(Some("Ajax GO Station"));
        bad_step.step_secs = 0.0;
        assert!(run(TrackerConfig::default(), &bad_step, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn oversized_step_is_refused_before_any_poll() {
        let mut out = Vec::new();
        let mut huge = args(Some("Pearson Airport"));
        huge.step_secs = 1e15;
        let err = run(TrackerConfig::default(), &huge, &mut out).expect_err("step rejected");
        assert!(err.to_string().contains("at most"), "{err}");
        assert!(out.is_empty());

        let mut day = args(Some("Pearson Airport"));
        day.step_secs = MAX_STEP_SECS;
        let summary = run(TrackerConfig::default(), &day, &mut out).expect("replay");
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn clock_overflow_is_an_error_not_a_panic() {
        let mut out = Vec::new();
        let mut late = args(Some("Pearson Airport"));
        late.start_unix = Some(DateTime::<Utc>::MAX_UTC.timestamp() - 60);
        late.step_secs = MAX_STEP_SECS;
        let err = run(TrackerConfig::default(), &late, &mut out).expect_err("overflow");
        assert!(err.to_string().contains("time range"), "{err}");
    }

    #[test]
    fn export_writes_history_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("replay.parquet");
        let mut replay = args(Some("North York Centre"));
        replay.step_secs = 300.0;
        replay.export = Some(path.clone());

        let mut out = Vec::new();
        run(TrackerConfig::default(), &replay, &mut out).expect("replay");
        assert!(path.exists());
        assert!(std::fs::metadata(&path).expect("metadata").len() > 0);
    }

    #[test]
    fn manual_clock_starts_at_requested_instant() {
        let start = start_time(&args(None)).expect("start");
        let clock = ManualClock::new(start);
        assert_eq!(clock.now().timestamp(), 1_700_000_000);
    }
}
