//! # Shower Controller
//!
//! Orchestrates one session at a time:
//!
//! ```text
//!            trigger(ok)                    cleanup timer
//!   ┌──────┐ ───────────> ┌─────────┐ ───────────────────> ┌──────┐
//!   │ Idle │              │ Running │                      │ Idle │
//!   └──────┘ <─────────── └─────────┘ ─┐                   └──────┘
//!      │   trigger(bad config)   ▲      │ trigger: supersede
//!      └── warn, stay Idle       └──────┘ (old session cancelled)
//! ```
//!
//! Starting a session:
//! 1. Resolve the effective config (a bad config stops here, nothing mutated).
//! 2. Create the overlay on first use, else reuse it; set its stacking order.
//! 3. End any previous session: cancel its timers and frame, dispose particles.
//! 4. Schedule `burst_count` bursts at `i * 200` ms, the cleanup at
//!    `duration`, and request the first frame.
//!
//! Every callback carries its [`SessionId`]. Callbacks for a session that is
//! no longer current are ignored, which covers hosts that cannot cancel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shower_shared::constants::BURST_INTERVAL_MS;
use shower_ui::{OverlayBatch, OverlayRenderer, ParticleInstance, RenderSurface};

use crate::config::{ConfigOverride, ConfigResolver, ShowerConfig};
use crate::host::{
    EventPump, FrameHandle, Host, HostEvent, SessionId, TimerHandle, TimerTask,
};
use crate::particle::{Particle, ParticleSpawn, SpawnRange};

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowerState {
    /// No session alive.
    Idle,
    /// A session is scheduling bursts and ticking.
    Running,
}

/// One burst as it actually fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstRecord {
    /// Burst index, 0-based.
    pub index: u32,
    /// Host time the burst fired at.
    pub fired_at_ms: u64,
    /// Particles it created.
    pub spawned: u32,
}

/// Counters of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Session the counters belong to.
    pub session: SessionId,
    /// Host time of the trigger.
    pub started_at_ms: u64,
    /// Bursts in firing order.
    pub bursts: Vec<BurstRecord>,
    /// Particles created, respawns not counted.
    pub spawned: u64,
    /// Frames processed.
    pub ticks: u64,
    /// Host time the session ended, `None` while running.
    pub ended_at_ms: Option<u64>,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    /// The cleanup timer fired.
    Expired,
    /// A new trigger replaced it.
    Superseded,
}

/// Live data of the current session.
struct Session {
    /// Generation tag carried by every callback.
    id: SessionId,
    /// Effective config, fixed for the session's lifetime.
    config: ShowerConfig,
    /// Live particles.
    particles: Vec<Particle>,
    /// Horizontal interval particles spawn and respawn in.
    spawn_range: SpawnRange,
    /// Bursts that have not fired yet.
    pending_bursts: Vec<TimerHandle>,
    /// End-of-session timer.
    cleanup: TimerHandle,
    /// Outstanding frame request.
    frame: Option<FrameHandle>,
    /// Counters.
    stats: SessionStats,
}

/// Drives shower sessions on an injected host.
pub struct ShowerController<H, R = StdRng> {
    /// Timers, frames and viewport.
    host: H,
    /// Randomness for content, position, velocity and glyph size.
    rng: R,
    /// Default + global + call-time config merge.
    resolver: ConfigResolver,
    /// Overlay, created by the first valid trigger.
    surface: Option<RenderSurface>,
    /// Current session.
    session: Option<Session>,
    /// Next session generation.
    next_session: u64,
    /// Counters of the most recently ended session.
    last_stats: Option<SessionStats>,
}

impl<H: Host> ShowerController<H, StdRng> {
    /// Creates an idle controller with an entropy-seeded RNG.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_rng(host, StdRng::from_entropy())
    }
}

impl<H: Host, R: Rng> ShowerController<H, R> {
    /// Creates an idle controller with the given RNG.
    #[must_use]
    pub fn with_rng(host: H, rng: R) -> Self {
        Self {
            host,
            rng,
            resolver: ConfigResolver::new(),
            surface: None,
            session: None,
            next_session: 1,
            last_stats: None,
        }
    }

    /// Installs or removes the process-wide config override.
    pub fn set_global_config(&mut self, global: Option<ConfigOverride>) {
        self.resolver.set_global(global);
    }

    /// Returns the process-wide config override.
    #[must_use]
    pub fn global_config(&self) -> Option<&ConfigOverride> {
        self.resolver.global()
    }

    /// Host-ready hook: starts a session if the global config asks for
    /// `app_load`. Returns true if a session is now running.
    pub fn host_ready(&mut self) -> bool {
        if !self.resolver.auto_starts() {
            tracing::debug!("no auto-start configured");
            return false;
        }
        self.trigger(None);
        self.is_running()
    }

    /// Starts (or restarts) a session.
    ///
    /// Never fails: an invalid config is logged as a warning and leaves the
    /// controller, the overlay and any running session untouched.
    pub fn trigger(&mut self, overrides: Option<&ConfigOverride>) {
        let config = match self.resolver.resolve(overrides) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!(%error, "emoji shower not started");
                return;
            }
        };

        let viewport = self.host.viewport();
        match self.surface.as_mut() {
            Some(surface) => {
                surface.resize(viewport);
                surface.set_z_index(config.z_index);
            }
            None => self.surface = Some(RenderSurface::new(viewport, config.z_index)),
        }

        self.end_session(EndReason::Superseded);

        let id = SessionId(self.next_session);
        self.next_session += 1;
        let started_at_ms = self.host.now_ms();

        let pending_bursts = (0..config.burst_count)
            .map(|index| {
                self.host.set_timeout(
                    u64::from(index) * BURST_INTERVAL_MS,
                    TimerTask::Burst { session: id, index },
                )
            })
            .collect();
        let cleanup = self
            .host
            .set_timeout(config.duration_ms, TimerTask::Cleanup { session: id });
        let frame = self.host.request_frame(id);

        tracing::info!(
            session = id.0,
            bursts = config.burst_count,
            per_burst = config.particle_count,
            duration_ms = config.duration_ms,
            z_index = config.z_index,
            "emoji shower started"
        );

        self.session = Some(Session {
            id,
            spawn_range: SpawnRange::across(viewport),
            config,
            particles: Vec::new(),
            pending_bursts,
            cleanup,
            frame: Some(frame),
            stats: SessionStats {
                session: id,
                started_at_ms,
                bursts: Vec::new(),
                spawned: 0,
                ticks: 0,
                ended_at_ms: None,
            },
        });
    }

    /// Delivers one host callback.
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Timer {
                handle,
                task: TimerTask::Burst { session, index },
            } => self.on_burst(handle, session, index),
            HostEvent::Timer {
                task: TimerTask::Cleanup { session },
                ..
            } => self.on_cleanup(session),
            HostEvent::Frame { handle, session } => self.on_frame(handle, session),
        }
    }

    fn on_burst(&mut self, handle: TimerHandle, id: SessionId, index: u32) {
        let now = self.host.now_ms();
        let Self {
            session,
            surface,
            rng,
            ..
        } = self;

        let (Some(session), Some(surface)) = (current(session, id), surface.as_mut()) else {
            tracing::trace!(session = id.0, index, "stale burst ignored");
            return;
        };
        session.pending_bursts.retain(|pending| *pending != handle);

        let mut spawned = 0;
        for _ in 0..session.config.particle_count {
            let Some(spawn) = ParticleSpawn::roll(&session.config, session.spawn_range, rng) else {
                break;
            };
            session
                .particles
                .push(Particle::spawn(spawn, &session.config, rng, surface));
            spawned += 1;
        }

        session.stats.bursts.push(BurstRecord {
            index,
            fired_at_ms: now,
            spawned,
        });
        session.stats.spawned += u64::from(spawned);
        tracing::debug!(
            session = id.0,
            index,
            spawned,
            live = session.particles.len(),
            "burst"
        );
    }

    fn on_cleanup(&mut self, id: SessionId) {
        if current(&mut self.session, id).is_none() {
            tracing::trace!(session = id.0, "stale cleanup ignored");
            return;
        }
        self.end_session(EndReason::Expired);
    }

    fn on_frame(&mut self, handle: FrameHandle, id: SessionId) {
        let viewport = self.host.viewport();
        let Self {
            host,
            session,
            surface,
            rng,
            ..
        } = self;

        let Some(session) = current(session, id).filter(|s| s.frame == Some(handle)) else {
            tracing::trace!(session = id.0, "stale frame ignored");
            return;
        };

        if let Some(surface) = surface.as_mut() {
            surface.resize(viewport);
            for particle in &mut session.particles {
                let transform = particle.update(viewport.height, rng);
                surface.set_transform(particle.visual(), transform);
            }
        }
        session.stats.ticks += 1;
        session.frame = Some(host.request_frame(id));
    }

    /// Cancels everything the current session scheduled and disposes its
    /// particles. No-op when idle.
    fn end_session(&mut self, reason: EndReason) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        for handle in session.pending_bursts.drain(..) {
            self.host.clear_timeout(handle);
        }
        self.host.clear_timeout(session.cleanup);
        if let Some(frame) = session.frame.take() {
            self.host.cancel_frame(frame);
        }

        let disposed = self.surface.as_mut().map_or(0, |surface| {
            session
                .particles
                .iter()
                .filter(|particle| particle.dispose(surface))
                .count()
        });

        session.stats.ended_at_ms = Some(self.host.now_ms());
        match reason {
            EndReason::Expired => tracing::info!(
                session = session.id.0,
                spawned = session.stats.spawned,
                ticks = session.stats.ticks,
                disposed,
                "emoji shower finished"
            ),
            EndReason::Superseded => tracing::debug!(
                session = session.id.0,
                disposed,
                "emoji shower superseded"
            ),
        }
        self.last_stats = Some(session.stats);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ShowerState {
        if self.session.is_some() {
            ShowerState::Running
        } else {
            ShowerState::Idle
        }
    }

    /// Returns true while a session is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Current session id.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Effective config of the current session.
    #[must_use]
    pub fn active_config(&self) -> Option<&ShowerConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    /// Live particles of the current session.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        self.session.as_ref().map_or(&[], |s| s.particles.as_slice())
    }

    /// Number of live particles.
    #[must_use]
    pub fn live_particle_count(&self) -> usize {
        self.particles().len()
    }

    /// Live particles whose position is inside the viewport.
    #[must_use]
    pub fn visible_particle_count(&self) -> usize {
        let Some(surface) = self.surface.as_ref() else {
            return 0;
        };
        let viewport = surface.viewport();
        self.particles()
            .iter()
            .filter(|p| viewport.contains(p.position().x, p.position().y))
            .count()
    }

    /// Counters of the current session, else of the last one that ended.
    #[must_use]
    pub fn session_stats(&self) -> Option<&SessionStats> {
        self.session
            .as_ref()
            .map(|s| &s.stats)
            .or(self.last_stats.as_ref())
    }

    /// The overlay, if any trigger has created it yet.
    #[must_use]
    pub fn surface(&self) -> Option<&RenderSurface> {
        self.surface.as_ref()
    }

    /// Renders the overlay. `None` until the overlay exists.
    pub fn render<'a>(&self, renderer: &'a mut OverlayRenderer) -> Option<&'a [OverlayBatch]> {
        self.surface.as_ref().map(|surface| surface.render(renderer))
    }

    /// Writes one GPU instance per mounted visual into `out` (cleared first)
    /// and returns how many were written.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) -> usize {
        match self.surface.as_ref() {
            Some(surface) => surface.write_instances(out),
            None => out.clear(),
        }
        out.len()
    }

    /// The injected host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the injected host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host + EventPump, R: Rng> ShowerController<H, R> {
    /// Delivers every callback due at or before `until_ms`, in order, then
    /// moves the host clock to `until_ms`. Returns the number delivered.
    pub fn run_until(&mut self, until_ms: u64) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.host.poll_due(until_ms) {
            self.handle(event);
            delivered += 1;
        }
        self.host.settle(until_ms);
        delivered
    }

    /// Advances the host clock by `delta_ms`. See [`Self::run_until`].
    pub fn advance(&mut self, delta_ms: u64) -> usize {
        let until = self.host.now_ms().saturating_add(delta_ms);
        self.run_until(until)
    }
}

/// The session, if it is the one `id` refers to.
fn current(session: &mut Option<Session>, id: SessionId) -> Option<&mut Session> {
    session.as_mut().filter(|s| s.id == id)
}
