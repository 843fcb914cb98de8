//! # Shower Demo
//!
//! Headless real-time run of one emoji shower session.
//!
//! ```bash
//! # Built-in party emojis
//! cargo run -p emoji_shower --features demo --bin shower_demo
//!
//! # Global config from a TOML file (camelCase keys, e.g. `burstCount = 3`)
//! cargo run -p emoji_shower --features demo --bin shower_demo -- shower.toml
//! ```
//!
//! The file is installed as the global config. The session starts from the
//! host-ready hook only if the file sets `trigger = "app_load"`; otherwise
//! (including the built-in set, which has no trigger key) the demo triggers
//! it manually.

use std::process::ExitCode;

use emoji_shower::ui::{OverlayRenderer, ParticleInstance, Rect};
use emoji_shower::{ConfigOverride, FrameDriver, ManualHost, ShowerController};

/// Viewport of the simulated host.
const VIEWPORT: Rect = Rect::viewport(1280.0, 720.0);

/// Status line period in ms.
const REPORT_EVERY_MS: u64 = 1000;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let global = match std::env::args().nth(1) {
        Some(path) => match ConfigOverride::from_toml_file(&path) {
            Ok(config) => config,
            Err(error) => {
                tracing::error!(%error, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => ConfigOverride::with_emojis(["🎉", "✨", "🎊"]),
    };

    let mut shower = ShowerController::new(ManualHost::new(VIEWPORT));
    shower.set_global_config(Some(global));
    if !shower.host_ready() {
        tracing::info!("auto-start not configured, triggering manually");
        shower.trigger(None);
    }
    if !shower.is_running() {
        return ExitCode::FAILURE;
    }

    let mut driver = FrameDriver::new();
    let mut renderer = OverlayRenderer::new();
    let mut instances = Vec::new();
    let mut next_report = 0;

    while shower.is_running() {
        driver.wait_for_next(shower.host());
        driver.pump(&mut shower);

        let now = driver.elapsed_ms();
        if now >= next_report {
            let batches = shower.render(&mut renderer).unwrap_or_default();
            let commands: usize = batches.iter().map(|b| b.commands.len()).sum();
            if let Some(first) = batches.iter().flat_map(|b| &b.commands).next() {
                tracing::debug!(transform = %first.transform(), "first visual");
            }

            shower.write_instances(&mut instances);
            tracing::info!(
                t_ms = now,
                live = shower.live_particle_count(),
                visible = shower.visible_particle_count(),
                commands,
                instance_bytes = ParticleInstance::as_bytes(&instances).len(),
                "shower status"
            );
            next_report = now + REPORT_EVERY_MS;
        }
    }

    let stats = driver.stats();
    if let Some(session) = shower.session_stats() {
        tracing::info!(
            spawned = session.spawned,
            bursts = session.bursts.len(),
            ticks = session.ticks,
            late_pumps = stats.late_pumps,
            skipped_frames = stats.skipped_frames,
            max_lateness_ms = stats.max_lateness_ms,
            "demo finished"
        );
    }
    ExitCode::SUCCESS
}
