use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::warn;

pub(crate) const STATS_WINDOW_LEN: usize = 120;

static STATS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_stats_lock_poison_once(operation: &'static str) {
    if STATS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "decal stats lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollingMsStats {
    pub last_ms: f32,
    pub avg_ms: f32,
    pub max_ms: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecalStatsSnapshot {
    /// Radial erase time per `on_frame_update`.
    pub erase: RollingMsStats,
    /// Window copy time per completed render.
    pub render: RollingMsStats,
    pub frames: u64,
    pub stamps: u64,
    pub line_clears: u64,
    pub radial_clears: u64,
}

/// Cloneable read side of the system's statistics.
#[derive(Clone, Debug)]
pub struct StatsHandle {
    snapshot: Arc<RwLock<DecalStatsSnapshot>>,
}

impl Default for StatsHandle {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(DecalStatsSnapshot::default())),
        }
    }
}

impl StatsHandle {
    pub fn snapshot(&self) -> DecalStatsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_stats_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: DecalStatsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_stats_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}

/// Owned by the system; every mutation republishes to the handle.
#[derive(Debug, Default)]
pub(crate) struct DecalStats {
    erase: RollingWindowMs,
    render: RollingWindowMs,
    frames: u64,
    stamps: u64,
    line_clears: u64,
    radial_clears: u64,
    handle: StatsHandle,
}

impl DecalStats {
    pub(crate) fn handle(&self) -> StatsHandle {
        self.handle.clone()
    }

    pub(crate) fn record_frame(&mut self, erase: Duration, agents: u64) {
        self.erase.push_ms(duration_to_ms(erase));
        self.frames = self.frames.saturating_add(1);
        self.radial_clears = self.radial_clears.saturating_add(agents);
        self.publish();
    }

    pub(crate) fn record_render(&mut self, render: Duration) {
        self.render.push_ms(duration_to_ms(render));
        self.publish();
    }

    pub(crate) fn record_stamp(&mut self) {
        self.stamps = self.stamps.saturating_add(1);
        self.publish();
    }

    pub(crate) fn record_line_clear(&mut self) {
        self.line_clears = self.line_clears.saturating_add(1);
        self.publish();
    }

    pub(crate) fn record_radial_clear(&mut self) {
        self.radial_clears = self.radial_clears.saturating_add(1);
        self.publish();
    }

    fn publish(&self) {
        self.handle.publish(DecalStatsSnapshot {
            erase: self.erase.snapshot(),
            render: self.render.snapshot(),
            frames: self.frames,
            stamps: self.stamps,
            line_clears: self.line_clears,
            radial_clears: self.radial_clears,
        });
    }
}

#[derive(Debug)]
struct RollingWindowMs {
    samples_ms: [f32; STATS_WINDOW_LEN],
    head: usize,
    count: usize,
    sum_ms: f32,
    last_ms: f32,
}

impl Default for RollingWindowMs {
    fn default() -> Self {
        Self {
            samples_ms: [0.0; STATS_WINDOW_LEN],
            head: 0,
            count: 0,
            sum_ms: 0.0,
            last_ms: 0.0,
        }
    }
}

impl RollingWindowMs {
    fn push_ms(&mut self, value_ms: f32) {
        self.last_ms = value_ms;
        let evicted = if self.count < STATS_WINDOW_LEN {
            self.count += 1;
            0.0
        } else {
            self.samples_ms[self.head]
        };
        self.samples_ms[self.head] = value_ms;
        self.head = (self.head + 1) % STATS_WINDOW_LEN;
        self.sum_ms += value_ms - evicted;
    }

    fn snapshot(&self) -> RollingMsStats {
        if self.count == 0 {
            return RollingMsStats::default();
        }
        let max_ms = self.samples_ms[..self.count]
            .iter()
            .copied()
            .fold(f32::MIN, f32::max);
        RollingMsStats {
            last_ms: self.last_ms,
            avg_ms: self.sum_ms / self.count as f32,
            max_ms,
        }
    }
}

fn duration_to_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}
