//! Perspective projection from a [`CameraPose`] onto the braille dot grid.

use crate::engine::camera::CameraPose;
use nalgebra::{Isometry3, Point3, Vector3};

/// Vertical field of view
pub const FIELD_OF_VIEW: f64 = 40.0 * std::f64::consts::PI / 180.0;
/// Points closer to the eye than this are dropped
const NEAR_PLANE: f64 = 0.05;

/// A point projected into dot coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Distance along the view direction
    pub depth: f64,
}

impl Projected {
    pub fn dot(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

pub struct Projector {
    view: Isometry3<f64>,
    eye: Point3<f64>,
    center: (f64, f64),
    scale: f64,
}

impl Projector {
    /// Projector for a canvas `width` × `height` dots. Braille dots are close
    /// to square, so one scale serves both axes.
    pub fn new(pose: &CameraPose, width: usize, height: usize) -> Self {
        let focal = 1.0 / (FIELD_OF_VIEW / 2.0).tan();
        Self {
            view: Isometry3::look_at_rh(&pose.position, &pose.target, &Vector3::y()),
            eye: pose.position,
            center: (width as f64 / 2.0, height as f64 / 2.0),
            scale: focal * height.min(width) as f64 / 2.0,
        }
    }

    pub fn project(&self, p: &Point3<f64>) -> Option<Projected> {
        let cam = self.view.transform_point(p);
        let depth = -cam.z;
        if depth < NEAR_PLANE {
            return None;
        }
        Some(Projected {
            x: self.center.0 + cam.x / depth * self.scale,
            y: self.center.1 - cam.y / depth * self.scale,
            depth,
        })
    }

    /// Whether `p`, on a sphere around `sphere_center`, lies on the
    /// hemisphere facing the eye
    pub fn faces_camera(&self, p: &Point3<f64>, sphere_center: &Point3<f64>) -> bool {
        (p - sphere_center).dot(&(self.eye - p)) > 0.0
    }
}
