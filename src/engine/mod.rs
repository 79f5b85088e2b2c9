//! Balloon animation engine
//!
//! Everything here is pure computation driven by a render clock: the viewer
//! calls [`AnimationState::update`] once per frame and draws the returned
//! [`FrameOutput`]. Within a frame the order is fixed: playback clock, then
//! per-object interpolation and mapping, then trail estimation.

pub mod camera;
pub mod geo;
pub mod playback;
pub mod trail;

use crate::colors::{altitude_color, Rgb};
use camera::{CameraDirector, CameraPose, WelcomeOverlay};
use chrono::{DateTime, Duration, Utc};
use geo::{interpolate, map_to_position, Coordinate, GLOBE_RADIUS};
use nalgebra::Point3;
use playback::{PlaybackClock, ProgressReport};
use serde::{Deserialize, Serialize};
use tracing::info;
use trail::{TrailDirective, TrailEstimator};

/// Stable identity of a tracked object: its slot in every snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// One hour of fixes. A `None` slot is an object the feed had no usable
/// coordinate for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    slots: Vec<Option<Coordinate>>,
}

impl Snapshot {
    pub fn new(slots: Vec<Option<Coordinate>>) -> Self {
        Self { slots }
    }

    pub fn get(&self, id: ObjectId) -> Option<&Coordinate> {
        self.slots.get(id.0).and_then(|c| c.as_ref())
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding a coordinate
    pub fn present(&self) -> usize {
        self.slots.iter().filter(|c| c.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Coordinate)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (ObjectId(i), c)))
    }
}

impl FromIterator<Option<Coordinate>> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Option<Coordinate>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Hourly snapshots, oldest first. The last snapshot is the most recent hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSeries {
    snapshots: Vec<Snapshot>,
    /// Time of the most recent snapshot, when the source knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latest_at: Option<DateTime<Utc>>,
}

impl SnapshotSeries {
    pub fn from_oldest_first(snapshots: Vec<Snapshot>) -> Self {
        Self { snapshots, latest_at: None }
    }

    /// Feeds usually publish "hours ago" order; flip it to oldest first.
    pub fn from_newest_first(mut snapshots: Vec<Snapshot>) -> Self {
        snapshots.reverse();
        Self::from_oldest_first(snapshots)
    }

    pub fn with_latest_at(mut self, at: DateTime<Utc>) -> Self {
        self.latest_at = Some(at);
        self
    }

    pub fn latest_at(&self) -> Option<DateTime<Utc>> {
        self.latest_at
    }

    /// Wall time of the snapshot `hours_ago` hours before the latest one
    pub fn time_of(&self, hours_ago: usize) -> Option<DateTime<Utc>> {
        self.latest_at.map(|t| t - Duration::hours(hours_ago as i64))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, hour: usize) -> Option<&Snapshot> {
        self.snapshots.get(hour)
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Widest snapshot; every object id is below this
    pub fn object_count(&self) -> usize {
        self.snapshots.iter().map(Snapshot::width).max().unwrap_or(0)
    }
}

/// Per-frame input from the viewer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Whether the 24-hour replay is playing
    pub animating: bool,
    /// Latched: any pointer or key interaction since the scene started
    pub interacted: bool,
}

/// Render directive for one balloon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectFrame {
    pub id: ObjectId,
    pub coordinate: Coordinate,
    pub position: Point3<f64>,
    pub color: Rgb,
    pub trail: TrailDirective,
    /// Carried over from an earlier frame because this frame's data was missing
    pub stale: bool,
}

/// Everything the viewer needs to draw one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    pub objects: Vec<ObjectFrame>,
    /// Scripted camera pose; `None` once the user owns the camera
    pub camera: Option<CameraPose>,
    /// Pose to seed the user's controls with, on the hand-off frame only
    pub handoff: Option<CameraPose>,
    /// Emitted only when the whole percent changes
    pub progress: Option<ProgressReport>,
    pub overlay_opacity: f64,
}

/// All mutable state of a scene, threaded through [`AnimationState::update`]
#[derive(Debug)]
pub struct AnimationState {
    series: SnapshotSeries,
    clock: PlaybackClock,
    trails: TrailEstimator,
    director: CameraDirector,
    welcome: WelcomeOverlay,
    last_frames: Vec<Option<ObjectFrame>>,
    was_animating: bool,
    finished: bool,
}

impl AnimationState {
    /// `duration` is the replay length in seconds
    pub fn new(series: SnapshotSeries, duration: f64) -> Self {
        let objects = series.object_count();
        Self {
            clock: PlaybackClock::new(duration, series.len()),
            trails: TrailEstimator::with_capacity(objects),
            director: CameraDirector::new(),
            welcome: WelcomeOverlay::new(),
            last_frames: vec![None; objects],
            series,
            was_animating: false,
            finished: false,
        }
    }

    pub fn series(&self) -> &SnapshotSeries {
        &self.series
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn trails(&self) -> &TrailEstimator {
        &self.trails
    }

    pub fn director(&self) -> &CameraDirector {
        &self.director
    }

    /// Compute one frame at render time `now` (seconds)
    pub fn update(&mut self, now: f64, input: FrameInput) -> FrameOutput {
        if self.was_animating && !input.animating {
            self.stop();
        }

        let mut out = FrameOutput::default();

        if input.animating {
            self.animate(now, &mut out);
        } else {
            self.show_latest(&mut out);
        }
        self.was_animating = input.animating;

        let camera = self.director.update(now, input.interacted);
        out.camera = camera.pose;
        out.handoff = camera.handoff;
        out.overlay_opacity = self.welcome.opacity(now);
        out
    }

    fn stop(&mut self) {
        info!("animation stopped");
        self.clock.stop();
        self.trails.clear();
        self.finished = false;
    }

    fn animate(&mut self, now: f64, out: &mut FrameOutput) {
        if !self.was_animating {
            info!(hours = self.series.len(), duration = self.clock.duration(), "animation started");
        }

        let tick = self.clock.tick(now);
        out.progress = tick.report;
        if tick.is_finished() && !self.finished {
            info!("animation reached the latest hour");
            self.finished = true;
        }

        let Some(from) = self.series.get(tick.hour_index) else {
            self.carry_over(out);
            return;
        };
        // A lone snapshot has nothing to move towards.
        let to = if self.clock.total_hours() == 0 {
            Some(from)
        } else {
            self.series.get(tick.hour_index + 1)
        };
        let Some(to) = to else {
            self.carry_over(out);
            return;
        };

        for slot in 0..self.last_frames.len() {
            let id = ObjectId(slot);
            let (Some(a), Some(b)) = (from.get(id), to.get(id)) else {
                if let Some(prev) = self.last_frames[slot] {
                    out.objects.push(ObjectFrame { stale: true, ..prev });
                }
                continue;
            };

            let coordinate = interpolate(a, b, tick.fraction);
            let position = map_to_position(&coordinate, GLOBE_RADIUS);
            let color = altitude_color(coordinate.alt);
            let trail = self.trails.observe(id, position, color);

            let frame = ObjectFrame { id, coordinate, position, color, trail, stale: false };
            self.last_frames[slot] = Some(frame);
            out.objects.push(frame);
        }
    }

    fn show_latest(&mut self, out: &mut FrameOutput) {
        let Some(latest) = self.series.latest() else {
            return;
        };
        for (id, coord) in latest.iter() {
            let color = altitude_color(coord.alt);
            let frame = ObjectFrame {
                id,
                coordinate: *coord,
                position: map_to_position(coord, GLOBE_RADIUS),
                color,
                trail: TrailDirective::hidden(color.darken(trail::TRAIL_DARKEN)),
                stale: false,
            };
            if let Some(slot) = self.last_frames.get_mut(id.0) {
                *slot = Some(frame);
            }
            out.objects.push(frame);
        }
    }

    fn carry_over(&self, out: &mut FrameOutput) {
        out.objects.extend(
            self.last_frames
                .iter()
                .flatten()
                .map(|f| ObjectFrame { stale: true, ..*f }),
        );
    }
}
