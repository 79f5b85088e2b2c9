//! Velocity trails: a smoothed per-tick displacement per tracked object,
//! turned into a short oriented streak behind each balloon.

use super::ObjectId;
use crate::colors::Rgb;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

/// Weight of the newest displacement in the moving average
pub const TRAIL_SMOOTHING: f64 = 0.15;
/// Smoothed speeds at or below this are treated as stationary
pub const TRAIL_SPEED_EPSILON: f64 = 1.0e-6;
/// Render-space trail length per unit of per-tick speed
pub const TRAIL_LENGTH_SCALE: f64 = 40.0;
pub const TRAIL_MIN_LENGTH: f64 = 0.02;
pub const TRAIL_MAX_LENGTH: f64 = 0.25;
/// Trail color relative to its balloon
pub const TRAIL_DARKEN: f64 = 0.55;

/// Axis of an unrotated trail
pub fn trail_axis() -> Unit<Vector3<f64>> {
    Vector3::y_axis()
}

/// How a trail should be drawn this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailDirective {
    pub visible: bool,
    pub length: f64,
    /// Rotation taking [`trail_axis`] onto the direction of travel
    pub orientation: UnitQuaternion<f64>,
    pub color: Rgb,
}

impl TrailDirective {
    pub fn hidden(color: Rgb) -> Self {
        Self {
            visible: false,
            length: 0.0,
            orientation: UnitQuaternion::identity(),
            color,
        }
    }

    /// Unit direction of travel (the rotated trail axis)
    pub fn direction(&self) -> Vector3<f64> {
        self.orientation * trail_axis().into_inner()
    }
}

/// Last position and smoothed velocity for one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub position: Point3<f64>,
    pub velocity: Vector3<f64>,
}

/// Per-object motion arena, indexed by [`ObjectId`].
///
/// Velocity is the raw displacement between consecutive observations and is
/// not normalized by frame time, so trail length scales with frame rate.
#[derive(Debug, Default)]
pub struct TrailEstimator {
    states: Vec<Option<MotionState>>,
}

impl TrailEstimator {
    pub fn with_capacity(objects: usize) -> Self {
        Self { states: vec![None; objects] }
    }

    /// Re-arena for `objects` identities, dropping all motion state
    pub fn resize(&mut self, objects: usize) {
        self.states.clear();
        self.states.resize(objects, None);
    }

    /// Forget every object's motion without releasing the arena
    pub fn clear(&mut self) {
        self.states.iter_mut().for_each(|s| *s = None);
    }

    pub fn state(&self, id: ObjectId) -> Option<&MotionState> {
        self.states.get(id.0).and_then(|s| s.as_ref())
    }

    pub fn tracked(&self) -> usize {
        self.states.iter().filter(|s| s.is_some()).count()
    }

    /// Record a new position for `id` and return its trail
    pub fn observe(&mut self, id: ObjectId, position: Point3<f64>, color: Rgb) -> TrailDirective {
        if id.0 >= self.states.len() {
            self.states.resize(id.0 + 1, None);
        }
        let slot = &mut self.states[id.0];

        if let Some(prev) = slot.as_mut() {
            let raw = position - prev.position;
            prev.velocity = prev.velocity * (1.0 - TRAIL_SMOOTHING) + raw * TRAIL_SMOOTHING;
            prev.position = position;
            return directive_for(&prev.velocity, color);
        }

        *slot = Some(MotionState { position, velocity: Vector3::zeros() });
        TrailDirective::hidden(color.darken(TRAIL_DARKEN))
    }
}

fn directive_for(velocity: &Vector3<f64>, color: Rgb) -> TrailDirective {
    let trail_color = color.darken(TRAIL_DARKEN);
    let speed = velocity.norm();
    if !(speed > TRAIL_SPEED_EPSILON) {
        return TrailDirective::hidden(trail_color);
    }

    let direction = velocity / speed;
    let axis = trail_axis().into_inner();
    let orientation = UnitQuaternion::rotation_between(&axis, &direction)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI));

    TrailDirective {
        visible: true,
        length: (speed * TRAIL_LENGTH_SCALE).clamp(TRAIL_MIN_LENGTH, TRAIL_MAX_LENGTH),
        orientation,
        color: trail_color,
    }
}
