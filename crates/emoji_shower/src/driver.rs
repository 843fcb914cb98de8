//! # Frame Driver
//!
//! Wall-clock pacing for a [`ManualHost`](crate::host::ManualHost).
//!
//! The controller runs on virtual time. The driver maps real elapsed time
//! onto it: sleep until the next callback is due, then deliver everything
//! due by now. Late callbacks (delivered past their due time by more than a
//! frame) are counted. After a stall, overdue frames collapse into one tick
//! instead of being replayed.

use std::time::{Duration, Instant};

use rand::Rng;
use shower_shared::constants::FRAME_INTERVAL_MS;

use crate::controller::ShowerController;
use crate::host::{EventPump, Host};

/// Part of a wait that is not slept, to absorb scheduler wake-up jitter.
const WAKE_MARGIN: Duration = Duration::from_micros(500);

/// Pacing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Pumps executed.
    pub pumps: u64,
    /// Callbacks delivered.
    pub delivered: u64,
    /// Pumps that started more than one frame after the due callback.
    pub late_pumps: u64,
    /// Worst lateness observed, in ms.
    pub max_lateness_ms: u64,
    /// Frame intervals dropped by coalescing overdue frames.
    pub skipped_frames: u64,
}

/// Paces a controller against the wall clock.
pub struct FrameDriver {
    /// Virtual time zero.
    start: Instant,
    /// Longest single sleep.
    max_wait: Duration,
    /// Counters.
    stats: DriverStats,
}

impl FrameDriver {
    /// Starts the clock now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            max_wait: Duration::from_millis(FRAME_INTERVAL_MS),
            stats: DriverStats::default(),
        }
    }

    /// Caps a single sleep. Shorter caps react faster to external triggers.
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Milliseconds since the driver started.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Sleeps until the host's next callback is due (capped by `max_wait`).
    pub fn wait_for_next<P: EventPump>(&self, pump: &P) {
        let now = self.elapsed_ms();
        let wait = pump
            .next_due_ms()
            .map_or(self.max_wait, |due| {
                Duration::from_millis(due.saturating_sub(now)).min(self.max_wait)
            });

        if wait > WAKE_MARGIN {
            std::thread::sleep(wait - WAKE_MARGIN);
        }
    }

    /// Delivers every callback due by the current wall time.
    /// Returns the number delivered.
    pub fn pump<H, R>(&mut self, controller: &mut ShowerController<H, R>) -> usize
    where
        H: Host + EventPump,
        R: Rng,
    {
        let now = self.elapsed_ms();
        if let Some(due) = controller.host().next_due_ms() {
            let lateness = now.saturating_sub(due);
            if lateness > FRAME_INTERVAL_MS {
                self.stats.late_pumps += 1;
                tracing::trace!(lateness_ms = lateness, "late pump");
            }
            self.stats.max_lateness_ms = self.stats.max_lateness_ms.max(lateness);
        }

        let skipped = controller.host_mut().coalesce_frames(now);
        if skipped > 0 {
            self.stats.skipped_frames += skipped;
            tracing::trace!(skipped, "coalesced overdue frames");
        }

        let delivered = controller.run_until(now);
        self.stats.pumps += 1;
        self.stats.delivered += delivered as u64;
        delivered
    }

    /// Pacing statistics.
    #[must_use]
    pub const fn stats(&self) -> &DriverStats {
        &self.stats
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverride;
    use crate::host::ManualHost;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shower_ui::Rect;

    #[test]
    fn test_pump_delivers_due_callbacks() {
        let mut shower = ShowerController::with_rng(
            ManualHost::new(Rect::viewport(640.0, 480.0)),
            ChaCha8Rng::seed_from_u64(3),
        );
        let mut driver = FrameDriver::new().with_max_wait(Duration::from_millis(5));

        let mut config = ConfigOverride::with_emojis(["✨"]);
        config.burst_count = Some(1);
        config.particle_count = Some(2);
        shower.trigger(Some(&config));

        // Burst is due at 0, so the first pump always spawns
        assert!(driver.pump(&mut shower) >= 1);
        assert_eq!(shower.live_particle_count(), 2);

        driver.wait_for_next(shower.host());
        driver.pump(&mut shower);
        assert_eq!(driver.stats().pumps, 2);
        assert!(driver.stats().delivered >= 1);
    }

    #[test]
    fn test_stall_runs_one_tick() {
        let mut shower = ShowerController::with_rng(
            ManualHost::new(Rect::viewport(640.0, 480.0)),
            ChaCha8Rng::seed_from_u64(4),
        );
        let mut driver = FrameDriver::new();

        let mut config = ConfigOverride::with_emojis(["🎉"]);
        config.burst_count = Some(1);
        config.duration = Some(60_000);
        shower.trigger(Some(&config));
        driver.pump(&mut shower);
        let ticks = shower.session_stats().map_or(0, |s| s.ticks);

        std::thread::sleep(Duration::from_millis(100));
        driver.pump(&mut shower);

        assert_eq!(shower.session_stats().map(|s| s.ticks), Some(ticks + 1));
        assert!(driver.stats().skipped_frames >= 4);
        assert_eq!(shower.host().pending_frames(), 1);
    }

    #[test]
    fn test_wait_without_callbacks_is_capped() {
        let host = ManualHost::new(Rect::viewport(10.0, 10.0));
        let driver = FrameDriver::new().with_max_wait(Duration::from_millis(2));

        let before = Instant::now();
        driver.wait_for_next(&host);
        assert!(before.elapsed() < Duration::from_millis(500));
    }
}
