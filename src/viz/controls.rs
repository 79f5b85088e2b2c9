//! Orbit controls: the user's camera once the director has handed over.

use crate::engine::camera::{CameraPose, ORBIT_ELEVATION, ORBIT_NEAR};
use crate::terminal::Pointer;
use crossterm::event::KeyCode;
use nalgebra::{Point3, Vector3};

const ROTATE_STEP: f64 = 0.08;
const DRAG_RADIANS_PER_COL: f64 = 0.04;
const DRAG_RADIANS_PER_ROW: f64 = 0.08;
const ZOOM_STEP: f64 = 1.1;
const PAN_STEP: f64 = 0.03;
const MIN_DISTANCE: f64 = 1.3;
const MAX_DISTANCE: f64 = 12.0;
const MAX_ELEVATION: f64 = 1.45;
/// The target may wander at most this far from the globe centre
const MAX_PAN: f64 = 1.5;

/// Spherical camera around a movable target
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    azimuth: f64,
    elevation: f64,
    distance: f64,
    target: Point3<f64>,
    drag_from: Option<(u16, u16)>,
}

impl Default for OrbitControls {
    /// The steady-orbit pose at azimuth 0
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: ORBIT_ELEVATION.atan(),
            distance: ORBIT_NEAR * (1.0 + ORBIT_ELEVATION * ORBIT_ELEVATION).sqrt(),
            target: Point3::origin(),
            drag_from: None,
        }
    }
}

impl OrbitControls {
    /// Continue from the director's last pose so the hand-off is seamless
    pub fn from_pose(pose: &CameraPose) -> Self {
        let offset = pose.position - pose.target;
        let distance = offset.norm();
        if !distance.is_finite() || distance < f64::EPSILON {
            return Self { target: pose.target, ..Self::default() };
        }
        Self {
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            target: pose.target,
            drag_from: None,
        }
    }

    pub fn pose(&self) -> CameraPose {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let offset = Vector3::new(cos_el * sin_az, sin_el, cos_el * cos_az) * self.distance;
        CameraPose { position: self.target + offset, target: self.target }
    }

    pub fn rotate(&mut self, d_azimuth: f64, d_elevation: f64) {
        self.azimuth = (self.azimuth + d_azimuth).rem_euclid(std::f64::consts::TAU);
        self.elevation = (self.elevation + d_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// `factor` < 1 moves closer
    pub fn zoom(&mut self, factor: f64) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Slide the target in the view plane, in units of the camera distance
    pub fn pan(&mut self, right: f64, up: f64) {
        let pose = self.pose();
        let forward = (pose.target - pose.position).normalize();
        let side = forward.cross(&Vector3::y()).normalize();
        let lift = side.cross(&forward);
        let moved = self.target + (side * right + lift * up) * self.distance;
        let offset = moved.coords;
        self.target = if offset.norm() > MAX_PAN {
            Point3::from(offset.normalize() * MAX_PAN)
        } else {
            moved
        };
    }

    /// Returns true if the key moved the camera
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.rotate(-ROTATE_STEP, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.rotate(ROTATE_STEP, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.rotate(0.0, ROTATE_STEP),
            KeyCode::Down | KeyCode::Char('j') => self.rotate(0.0, -ROTATE_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(ZOOM_STEP),
            KeyCode::Char('w') => self.pan(0.0, PAN_STEP),
            KeyCode::Char('s') => self.pan(0.0, -PAN_STEP),
            KeyCode::Char('a') => self.pan(-PAN_STEP, 0.0),
            KeyCode::Char('d') => self.pan(PAN_STEP, 0.0),
            _ => return false,
        }
        true
    }

    /// Drag to rotate, scroll to zoom
    pub fn handle_pointer(&mut self, pointer: Pointer) {
        match pointer {
            Pointer::Down { col, row } => self.drag_from = Some((col, row)),
            Pointer::Drag { col, row } => {
                if let Some((c0, r0)) = self.drag_from {
                    let dc = col as f64 - c0 as f64;
                    let dr = row as f64 - r0 as f64;
                    self.rotate(-dc * DRAG_RADIANS_PER_COL, dr * DRAG_RADIANS_PER_ROW);
                }
                self.drag_from = Some((col, row));
            }
            Pointer::Up => self.drag_from = None,
            Pointer::ScrollUp => self.zoom(1.0 / ZOOM_STEP),
            Pointer::ScrollDown => self.zoom(ZOOM_STEP),
        }
    }
}
