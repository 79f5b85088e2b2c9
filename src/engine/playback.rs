//! Playback clock: maps elapsed render time onto (hour, fraction) across the
//! snapshot series and throttles progress reports to whole percents.

use tracing::debug;

/// Default wall-clock length of a full 24-hour replay, in seconds
pub const DEFAULT_DURATION_SECS: f64 = 30.0;

/// Progress notification, emitted once per integer percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    pub percent: u8,
    /// Hours before the most recent snapshot (counts down to 0)
    pub hour_label: usize,
}

/// Clock output for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTick {
    /// Index of the older snapshot of the pair being interpolated
    pub hour_index: usize,
    /// Position between `hour_index` and `hour_index + 1`
    pub fraction: f64,
    /// 0..=1 over the whole run
    pub progress: f64,
    pub report: Option<ProgressReport>,
}

impl PlaybackTick {
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    duration: f64,
    hour_count: usize,
    started_at: Option<f64>,
    last_percent: Option<u8>,
}

impl PlaybackClock {
    /// `duration` is the run length in seconds; `hour_count` the number of
    /// snapshots in the series.
    pub fn new(duration: f64, hour_count: usize) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            DEFAULT_DURATION_SECS
        };
        Self {
            duration,
            hour_count,
            started_at: None,
            last_percent: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn hour_count(&self) -> usize {
        self.hour_count
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Number of hour-to-hour steps in the series
    pub fn total_hours(&self) -> usize {
        self.hour_count.saturating_sub(1)
    }

    /// Advance to `now` (seconds on the render clock). The first call of a
    /// run latches the start time.
    pub fn tick(&mut self, now: f64) -> PlaybackTick {
        let start = *self.started_at.get_or_insert_with(|| {
            debug!(now, "playback started");
            now
        });

        let elapsed = (now - start).max(0.0);
        let progress = (elapsed / self.duration).min(1.0);

        let total_hours = self.total_hours();
        let position = progress * total_hours as f64;
        let whole = position.floor();

        let (hour_index, fraction) = if total_hours == 0 {
            (0, 0.0)
        } else if whole as usize >= total_hours {
            // Hold on the last pair at its far end.
            (total_hours - 1, 1.0)
        } else {
            (whole as usize, position - whole)
        };

        let percent = (progress * 100.0).floor() as u8;
        let report = if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            Some(ProgressReport {
                percent,
                hour_label: total_hours.saturating_sub(whole as usize),
            })
        } else {
            None
        };

        PlaybackTick {
            hour_index,
            fraction,
            progress,
            report,
        }
    }

    /// End the run: the next tick starts over from zero
    pub fn stop(&mut self) {
        if self.started_at.take().is_some() {
            debug!("playback stopped");
        }
        self.last_percent = None;
    }
}
