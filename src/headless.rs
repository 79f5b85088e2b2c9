//! Run the engine without a terminal and report where everything ended up.

use crate::engine::camera::CameraPose;
use crate::engine::playback::ProgressReport;
use crate::engine::{AnimationState, FrameInput, FrameOutput};
use std::io::{self, Write};

/// Simulated render rate
pub const HEADLESS_FPS: f64 = 60.0;

/// Result of a headless run
#[derive(Debug, Clone)]
pub struct HeadlessRun {
    pub frame: FrameOutput,
    /// Last pose the director produced
    pub camera: Option<CameraPose>,
    /// Last progress report seen
    pub progress: Option<ProgressReport>,
    pub ticks: usize,
}

/// Replay from render time 0 to `progress` (0..=1) of the run at
/// [`HEADLESS_FPS`], with no user interaction.
pub fn simulate(state: &mut AnimationState, progress: f64) -> HeadlessRun {
    let until = state.clock().duration() * progress.clamp(0.0, 1.0);
    let ticks = (until * HEADLESS_FPS).round() as usize;
    let input = FrameInput { animating: true, interacted: false };

    let mut run = HeadlessRun { frame: FrameOutput::default(), camera: None, progress: None, ticks: 0 };
    for tick in 0..=ticks {
        let frame = state.update(tick as f64 / HEADLESS_FPS, input);
        run.camera = frame.camera.or(run.camera);
        run.progress = frame.progress.or(run.progress);
        run.frame = frame;
        run.ticks += 1;
    }
    run
}

/// Plain-text table of objects (at most `limit`) and the camera
pub fn write_report<W: Write>(out: &mut W, run: &HeadlessRun, limit: usize) -> io::Result<()> {
    if let Some(p) = run.progress {
        writeln!(out, "progress {:>3}%  {} hours before latest", p.percent, p.hour_label)?;
    }
    writeln!(
        out,
        "{:>5} {:>8} {:>9} {:>8} {:>8} {:>8} {:>8} {:>7} {}",
        "id", "lat", "lon", "alt_m", "x", "y", "z", "trail", "state"
    )?;
    for obj in run.frame.objects.iter().take(limit) {
        let trail = if obj.trail.visible { format!("{:.4}", obj.trail.length) } else { "-".into() };
        writeln!(
            out,
            "{:>5} {:>8.3} {:>9.3} {:>8.0} {:>8.4} {:>8.4} {:>8.4} {:>7} {}",
            obj.id.0,
            obj.coordinate.lat,
            obj.coordinate.lon,
            obj.coordinate.alt,
            obj.position.x,
            obj.position.y,
            obj.position.z,
            trail,
            if obj.stale { "stale" } else { "live" }
        )?;
    }
    if run.frame.objects.len() > limit {
        writeln!(out, "... {} more", run.frame.objects.len() - limit)?;
    }
    match run.camera {
        Some(pose) => writeln!(
            out,
            "camera ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})  distance {:.3}",
            pose.position.x,
            pose.position.y,
            pose.position.z,
            pose.target.x,
            pose.target.y,
            pose.target.z,
            pose.distance()
        )?,
        None => writeln!(out, "camera user-controlled")?,
    }
    Ok(())
}
