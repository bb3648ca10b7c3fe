//! Per-source refresh scheduler.
//!
//! A single thread ticks once a second and counts every source down from its descriptor's
//! refresh interval. Due sources are fetched on their own worker thread; a source whose
//! previous fetch is still running is skipped until its next due tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use block_contract::BlockId;

use crate::state::{RefreshOutcome, ServerState};

const TICK: Duration = Duration::from_secs(1);
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Countdown {
    block_id: BlockId,
    interval: u64,
    remaining: u64,
}

/// Countdown table driving the scheduler thread.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshSchedule {
    entries: Vec<Countdown>,
}

impl RefreshSchedule {
    /// Starts every source one full interval away from its first refresh. Zero intervals are
    /// treated as one second.
    pub fn new(intervals: impl IntoIterator<Item = (BlockId, u64)>) -> Self {
        let entries = intervals
            .into_iter()
            .map(|(block_id, interval)| {
                let interval = interval.max(1);
                Countdown {
                    block_id,
                    interval,
                    remaining: interval,
                }
            })
            .collect();
        Self { entries }
    }

    /// Advances one second and returns the sources that are due.
    pub fn tick(&mut self) -> Vec<BlockId> {
        let mut due = Vec::new();
        for entry in &mut self.entries {
            entry.remaining = entry.remaining.saturating_sub(1);
            if entry.remaining == 0 {
                entry.remaining = entry.interval;
                due.push(entry.block_id.clone());
            }
        }
        due
    }
}

fn sleep_tick(shutdown: &AtomicBool) {
    let mut slept = Duration::ZERO;
    while slept < TICK && !shutdown.load(Ordering::Relaxed) {
        thread::sleep(SHUTDOWN_POLL);
        slept += SHUTDOWN_POLL;
    }
}

fn spawn_refresh(state: &Arc<ServerState>, block_id: BlockId) {
    let worker_state = Arc::clone(state);
    let name = format!("refresh-{block_id}");
    let spawned = thread::Builder::new().name(name).spawn(move || {
        match worker_state.refresh(&block_id) {
            RefreshOutcome::Updated => tracing::debug!(block = %block_id, "block refreshed"),
            RefreshOutcome::Busy => {
                tracing::debug!(block = %block_id, "previous fetch still running; skipped")
            }
            RefreshOutcome::Failed(err) => {
                tracing::warn!(block = %block_id, error = %err, "block refresh failed")
            }
            RefreshOutcome::Unknown => {}
        }
    });
    if let Err(err) = spawned {
        tracing::error!(error = %err, "failed to spawn refresh worker");
    }
}

/// Runs the scheduler on the current thread until `shutdown` is set.
pub fn run_scheduler(state: Arc<ServerState>, shutdown: Arc<AtomicBool>) {
    let mut schedule = RefreshSchedule::new(state.intervals());
    loop {
        sleep_tick(&shutdown);
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        for block_id in schedule.tick() {
            spawn_refresh(&state, block_id);
        }
    }
    tracing::debug!("refresh scheduler stopped");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(raw: &str) -> BlockId {
        BlockId::trusted(raw)
    }

    #[test]
    fn every_second_source_fires_each_tick() {
        let mut schedule = RefreshSchedule::new([(id("clock"), 1), (id("emails"), 120)]);
        assert_eq!(schedule.tick(), vec![id("clock")]);
        assert_eq!(schedule.tick(), vec![id("clock")]);
    }

    #[test]
    fn sources_fire_after_their_interval_and_rearm() {
        let mut schedule = RefreshSchedule::new([(id("clock"), 1), (id("weather"), 3)]);
        let fired: Vec<Vec<BlockId>> = (0..6).map(|_| schedule.tick()).collect();

        assert_eq!(fired[0], vec![id("clock")]);
        assert_eq!(fired[1], vec![id("clock")]);
        assert_eq!(fired[2], vec![id("clock"), id("weather")]);
        assert_eq!(fired[5], vec![id("clock"), id("weather")]);
    }

    #[test]
    fn zero_interval_is_clamped_to_one_second() {
        let mut schedule = RefreshSchedule::new([(id("tight"), 0)]);
        assert_eq!(schedule.tick(), vec![id("tight")]);
    }
}
