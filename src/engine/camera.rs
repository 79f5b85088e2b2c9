//! Scripted camera: a zoom-in while orbiting, a steady orbit, then permanent
//! hand-off to the user's orbit controls.

use nalgebra::Point3;
use tracing::info;

/// Seconds for the intro zoom
pub const INTRO_DURATION: f64 = 4.0;
/// Orbit radius at the start of the intro
pub const ORBIT_FAR: f64 = 6.0;
/// Orbit radius once the intro has finished
pub const ORBIT_NEAR: f64 = 3.2;
/// Radians per second of render time
pub const ORBIT_SPEED: f64 = 0.12;
/// Camera height as a fraction of the orbit radius
pub const ORBIT_ELEVATION: f64 = 0.35;

/// Where the camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
}

impl CameraPose {
    pub fn distance(&self) -> f64 {
        (self.position - self.target).norm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraPhase {
    /// Nothing rendered yet
    Pending,
    IntroZoomOrbit { started_at: f64, orbit_epoch: f64 },
    SteadyOrbit { orbit_epoch: f64 },
    /// Terminal: the director never moves the camera again
    UserControlled,
}

/// Result of one director update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraUpdate {
    /// Pose to apply this frame, `None` once the user owns the camera
    pub pose: Option<CameraPose>,
    /// Last scripted pose, returned once on the frame control is handed over
    pub handoff: Option<CameraPose>,
}

#[derive(Debug, Clone)]
pub struct CameraDirector {
    phase: CameraPhase,
    intro_complete: bool,
    last_pose: Option<CameraPose>,
}

impl Default for CameraDirector {
    fn default() -> Self {
        Self::new()
    }
}

/// Cubic ease-out on [0, 1]
pub fn ease_out_cubic(p: f64) -> f64 {
    1.0 - (1.0 - p).powi(3)
}

fn orbit_pose(radius: f64, angle: f64) -> CameraPose {
    let (sin, cos) = angle.sin_cos();
    CameraPose {
        position: Point3::new(radius * sin, radius * ORBIT_ELEVATION, radius * cos),
        target: Point3::origin(),
    }
}

impl CameraDirector {
    pub fn new() -> Self {
        Self {
            phase: CameraPhase::Pending,
            intro_complete: false,
            last_pose: None,
        }
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    /// Whether the intro zoom ever finished. Control can be taken before it
    /// does, in which case this stays false.
    pub fn intro_complete(&self) -> bool {
        self.intro_complete
    }

    pub fn is_user_controlled(&self) -> bool {
        self.phase == CameraPhase::UserControlled
    }

    /// Advance to `now`. `interacted` is the latched page-wide interaction
    /// signal; once seen, the director yields the camera for good.
    pub fn update(&mut self, now: f64, interacted: bool) -> CameraUpdate {
        if self.phase == CameraPhase::UserControlled {
            return CameraUpdate::default();
        }

        if interacted {
            info!(intro_complete = self.intro_complete, "camera handed to user");
            self.phase = CameraPhase::UserControlled;
            return CameraUpdate {
                pose: None,
                handoff: self.last_pose.take(),
            };
        }

        if self.phase == CameraPhase::Pending {
            self.phase = CameraPhase::IntroZoomOrbit { started_at: now, orbit_epoch: now };
        }

        let pose = match self.phase {
            CameraPhase::IntroZoomOrbit { started_at, orbit_epoch } => {
                let progress = ((now - started_at) / INTRO_DURATION).clamp(0.0, 1.0);
                let radius = ORBIT_FAR + (ORBIT_NEAR - ORBIT_FAR) * ease_out_cubic(progress);
                if progress >= 1.0 {
                    info!("intro zoom finished");
                    self.intro_complete = true;
                    self.phase = CameraPhase::SteadyOrbit { orbit_epoch };
                }
                orbit_pose(radius, (now - orbit_epoch) * ORBIT_SPEED)
            }
            CameraPhase::SteadyOrbit { orbit_epoch } => {
                orbit_pose(ORBIT_NEAR, (now - orbit_epoch) * ORBIT_SPEED)
            }
            CameraPhase::Pending | CameraPhase::UserControlled => return CameraUpdate::default(),
        };

        self.last_pose = Some(pose);
        CameraUpdate { pose: Some(pose), handoff: None }
    }
}

/// Seconds to fade the welcome message in
pub const WELCOME_FADE_IN: f64 = 2.0;
/// Seconds at which the fade-out begins
pub const WELCOME_HOLD_UNTIL: f64 = 4.0;
/// Seconds at which the message is gone
pub const WELCOME_GONE_AT: f64 = 6.0;

/// Welcome message opacity, driven by the same timer as the intro
#[derive(Debug, Clone, Default)]
pub struct WelcomeOverlay {
    started_at: Option<f64>,
    hidden: bool,
}

impl WelcomeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Opacity in [0, 1] at `now`; the first call latches the start time
    pub fn opacity(&mut self, now: f64) -> f64 {
        if self.hidden {
            return 0.0;
        }
        let start = *self.started_at.get_or_insert(now);
        let t = (now - start).max(0.0);

        if t < WELCOME_FADE_IN {
            t / WELCOME_FADE_IN
        } else if t < WELCOME_HOLD_UNTIL {
            1.0
        } else if t < WELCOME_GONE_AT {
            1.0 - (t - WELCOME_HOLD_UNTIL) / (WELCOME_GONE_AT - WELCOME_HOLD_UNTIL)
        } else {
            self.hidden = true;
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(update: CameraUpdate) -> CameraPose {
        update.pose.expect("director should own the camera")
    }

    #[test]
    fn intro_starts_far_and_ends_near() {
        let mut director = CameraDirector::new();
        let start = pose(director.update(10.0, false));
        assert!((start.distance() - ORBIT_FAR * (1.0 + ORBIT_ELEVATION.powi(2)).sqrt()).abs() < 1e-9);
        assert!(matches!(director.phase(), CameraPhase::IntroZoomOrbit { .. }));

        let end = pose(director.update(10.0 + INTRO_DURATION, false));
        assert!((end.distance() - ORBIT_NEAR * (1.0 + ORBIT_ELEVATION.powi(2)).sqrt()).abs() < 1e-9);
        assert!(director.intro_complete());
        assert!(matches!(director.phase(), CameraPhase::SteadyOrbit { .. }));
    }

    #[test]
    fn zoom_eases_out() {
        let mut director = CameraDirector::new();
        director.update(0.0, false);
        let half = pose(director.update(INTRO_DURATION / 2.0, false));
        let horizontal = (half.position.x.powi(2) + half.position.z.powi(2)).sqrt();
        let expected = ORBIT_FAR + (ORBIT_NEAR - ORBIT_FAR) * 0.875;
        assert!((horizontal - expected).abs() < 1e-9);
    }

    #[test]
    fn orbit_angle_tracks_render_time() {
        let mut director = CameraDirector::new();
        director.update(0.0, false);
        director.update(INTRO_DURATION, false);
        let t = 20.0;
        let p = pose(director.update(t, false));
        let angle = p.position.x.atan2(p.position.z);
        let expected = (t * ORBIT_SPEED).sin().atan2((t * ORBIT_SPEED).cos());
        assert!((angle - expected).abs() < 1e-9);
        assert_eq!(p.target, Point3::origin());
    }

    #[test]
    fn intro_complete_is_monotonic() {
        let mut director = CameraDirector::new();
        director.update(0.0, false);
        director.update(INTRO_DURATION + 1.0, false);
        assert!(director.intro_complete());
        director.update(INTRO_DURATION + 100.0, true);
        assert!(director.intro_complete());
    }

    #[test]
    fn user_control_is_permanent() {
        let mut director = CameraDirector::new();
        let last = pose(director.update(0.0, false));
        director.update(1.0, false);

        let handoff = director.update(2.0, true);
        assert_eq!(handoff.pose, None);
        assert!(handoff.handoff.is_some());
        assert_ne!(handoff.handoff, Some(last));

        for i in 0..100 {
            let update = director.update(3.0 + i as f64 / 60.0, i % 2 == 0);
            assert_eq!(update, CameraUpdate::default());
        }
        assert!(director.is_user_controlled());
        assert!(!director.intro_complete());
    }

    #[test]
    fn interaction_before_first_frame() {
        let mut director = CameraDirector::new();
        let update = director.update(0.0, true);
        assert_eq!(update, CameraUpdate::default());
        assert!(director.is_user_controlled());
    }

    #[test]
    fn welcome_fades_in_holds_and_hides() {
        let mut overlay = WelcomeOverlay::new();
        assert_eq!(overlay.opacity(5.0), 0.0);
        assert!((overlay.opacity(6.0) - 0.5).abs() < 1e-12);
        assert_eq!(overlay.opacity(8.0), 1.0);
        assert_eq!(overlay.opacity(8.9), 1.0);
        assert!((overlay.opacity(10.0) - 0.5).abs() < 1e-12);
        assert_eq!(overlay.opacity(11.0), 0.0);
        assert!(overlay.is_hidden());
        // Stays hidden even if the clock jumps backwards
        assert_eq!(overlay.opacity(6.0), 0.0);
    }
}
