//! # Host Seams
//!
//! The controller never owns a clock. Delayed timers, the per-frame tick
//! source and the viewport all come from an injected [`Host`]:
//!
//! ```text
//! ┌──────────────┐ set_timeout / request_frame ┌──────────────┐
//! │  Controller  │ ──────────────────────────> │     Host     │
//! │              │ <────────────────────────── │  (queue)     │
//! └──────────────┘   HostEvent via EventPump   └──────────────┘
//! ```
//!
//! Every task and frame request carries the [`SessionId`] it was scheduled
//! for, so a callback that outlives its session can be recognized and ignored.
//!
//! [`ManualHost`] is the reference implementation: a deterministic queue
//! ordered by (due time, insertion order). Tests advance it explicitly;
//! [`crate::driver::FrameDriver`] advances it from the wall clock.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use shower_shared::constants::FRAME_INTERVAL_MS;
use shower_ui::Rect;

/// Generation number of a session. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

/// Handle of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Handle of a requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Work attached to a delayed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Spawn one burst of particles.
    Burst {
        /// Session the burst belongs to.
        session: SessionId,
        /// Burst index, 0-based.
        index: u32,
    },
    /// End the session: stop the loop and dispose every particle.
    Cleanup {
        /// Session to end.
        session: SessionId,
    },
}

/// A callback delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A delayed timer fired.
    Timer {
        /// Handle returned by `set_timeout`.
        handle: TimerHandle,
        /// Scheduled work.
        task: TimerTask,
    },
    /// A requested animation frame is due.
    Frame {
        /// Handle returned by `request_frame`.
        handle: FrameHandle,
        /// Session that requested the frame.
        session: SessionId,
    },
}

/// Delayed one-shot timers.
pub trait TimerQueue {
    /// Current host time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Schedules `task` to fire after `delay_ms`.
    fn set_timeout(&mut self, delay_ms: u64, task: TimerTask) -> TimerHandle;

    /// Cancels a timer. Unknown or already-fired handles are ignored.
    fn clear_timeout(&mut self, handle: TimerHandle);
}

/// Per-frame redraw callbacks.
pub trait TickSource {
    /// Requests one frame callback for `session`.
    fn request_frame(&mut self, session: SessionId) -> FrameHandle;

    /// Cancels a frame request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Everything the controller needs from its environment.
pub trait Host: TimerQueue + TickSource {
    /// Current viewport, read at spawn time and on every tick.
    fn viewport(&self) -> Rect;
}

/// Delivers due callbacks, one at a time, in firing order.
pub trait EventPump {
    /// Pops the next callback due at or before `until_ms`, advancing the
    /// host clock to its due time.
    fn poll_due(&mut self, until_ms: u64) -> Option<HostEvent>;

    /// Due time of the next live callback.
    fn next_due_ms(&self) -> Option<u64>;

    /// Moves the clock forward to `until_ms` once nothing else is due.
    fn settle(&mut self, until_ms: u64);

    /// Moves every frame request due before `until_ms` to `until_ms`, so a
    /// stalled host delivers one frame instead of replaying each missed one.
    /// Timers keep their due times. Returns the number of frame intervals skipped.
    fn coalesce_frames(&mut self, until_ms: u64) -> u64;
}

/// Queue entry.
#[derive(Debug, Clone, Copy)]
struct Pending {
    /// Due time in ms.
    due_ms: u64,
    /// Insertion order, breaks ties between equal due times.
    seq: u64,
    /// Raw handle value (shared id space for timers and frames).
    id: u64,
    /// Callback to deliver.
    event: HostEvent,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest entry first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deterministic host: a virtual clock plus one queue for timers and frames.
#[derive(Debug)]
pub struct ManualHost {
    /// Virtual time in ms.
    now_ms: u64,
    /// Delay between a frame request and its callback.
    frame_interval_ms: u64,
    /// Current viewport.
    viewport: Rect,
    /// Scheduled callbacks.
    queue: BinaryHeap<Pending>,
    /// Cancelled handle ids still sitting in the queue.
    cancelled: HashSet<u64>,
    /// Next handle id.
    next_id: u64,
    /// Next insertion sequence.
    next_seq: u64,
}

impl ManualHost {
    /// Creates a host at t=0 with a ~60 Hz frame interval.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            now_ms: 0,
            frame_interval_ms: FRAME_INTERVAL_MS,
            viewport,
            queue: BinaryHeap::with_capacity(64),
            cancelled: HashSet::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    /// Overrides the frame interval (at least 1 ms, so frames always advance time).
    #[must_use]
    pub fn with_frame_interval(mut self, frame_interval_ms: u64) -> Self {
        self.frame_interval_ms = frame_interval_ms.max(1);
        self
    }

    /// Simulates a host resize.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Frame interval in ms.
    #[must_use]
    pub const fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    /// Live (not cancelled) timers still waiting to fire.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.live()
            .filter(|p| matches!(p.event, HostEvent::Timer { .. }))
            .count()
    }

    /// Live (not cancelled) frame requests still waiting to fire.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.live()
            .filter(|p| matches!(p.event, HostEvent::Frame { .. }))
            .count()
    }

    fn live(&self) -> impl Iterator<Item = &Pending> + '_ {
        self.queue.iter().filter(|p| !self.cancelled.contains(&p.id))
    }

    fn schedule(&mut self, delay_ms: u64, event: impl FnOnce(u64) -> HostEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        self.queue.push(Pending {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq,
            id,
            event: event(id),
        });
        id
    }

    fn cancel(&mut self, id: u64) {
        if self.queue.iter().any(|p| p.id == id) {
            self.cancelled.insert(id);
        }
    }

    /// Drops cancelled entries from the front of the queue.
    fn skip_cancelled(&mut self) {
        while let Some(head) = self.queue.peek() {
            if !self.cancelled.remove(&head.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl TimerQueue for ManualHost {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn set_timeout(&mut self, delay_ms: u64, task: TimerTask) -> TimerHandle {
        TimerHandle(self.schedule(delay_ms, |id| HostEvent::Timer {
            handle: TimerHandle(id),
            task,
        }))
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.cancel(handle.0);
    }
}

impl TickSource for ManualHost {
    fn request_frame(&mut self, session: SessionId) -> FrameHandle {
        let delay = self.frame_interval_ms;
        FrameHandle(self.schedule(delay, |id| HostEvent::Frame {
            handle: FrameHandle(id),
            session,
        }))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancel(handle.0);
    }
}

impl Host for ManualHost {
    fn viewport(&self) -> Rect {
        self.viewport
    }
}

impl EventPump for ManualHost {
    fn poll_due(&mut self, until_ms: u64) -> Option<HostEvent> {
        self.skip_cancelled();
        let head = self.queue.peek()?;
        if head.due_ms > until_ms {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(entry.event)
    }

    fn next_due_ms(&self) -> Option<u64> {
        self.live().map(|p| p.due_ms).min()
    }

    fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn coalesce_frames(&mut self, until_ms: u64) -> u64 {
        self.skip_cancelled();
        let interval = self.frame_interval_ms;
        let mut skipped = 0;
        let mut entries = std::mem::take(&mut self.queue).into_vec();
        for entry in &mut entries {
            let live_frame = matches!(entry.event, HostEvent::Frame { .. })
                && !self.cancelled.contains(&entry.id);
            if live_frame && entry.due_ms < until_ms {
                skipped += (until_ms - entry.due_ms) / interval;
                entry.due_ms = until_ms;
            }
        }
        self.queue = BinaryHeap::from(entries);
        skipped
    }
}
