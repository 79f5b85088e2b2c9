use crate::settings::Settings;
use std::path::PathBuf;
use std::time::Duration;

/// Where balloon snapshots come from
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    /// Synthetic drifting balloons
    Demo { balloons: usize, hours: usize, seed: Option<u64> },
    /// Hourly JSON feed over HTTP
    Remote { base_url: String, hours: usize, timeout: Duration, altitude_unit_meters: f64 },
    /// Series file written by `skytrail fetch`
    File(PathBuf),
}

/// Resolved configuration for a globe session
#[derive(Clone, Debug)]
pub struct GlobeConfig {
    pub source: DataSource,
    /// Seconds for a full replay
    pub duration_secs: f64,
    /// Seconds per rendered frame
    pub time_step: f32,
    pub color_scheme: u8,
    /// Start the replay immediately
    pub autoplay: bool,
}

/// Source selection as given on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Demo,
    Remote,
    File,
}

/// Command-line overrides; `None` keeps the settings value
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub source: Option<SourceKind>,
    pub file: Option<PathBuf>,
    pub url: Option<String>,
    pub balloons: Option<usize>,
    pub seed: Option<u64>,
    pub duration: Option<f64>,
    pub time_step: Option<f32>,
    pub autoplay: bool,
}

pub const DEFAULT_DEMO_BALLOONS: usize = 120;

impl GlobeConfig {
    /// Layer command-line overrides over the settings file
    pub fn resolve(settings: &Settings, cli: Overrides) -> Self {
        let hours = settings.data.hours.max(1);
        let kind = cli.source.unwrap_or(if cli.file.is_some() {
            SourceKind::File
        } else {
            SourceKind::Demo
        });

        let source = match (kind, cli.file) {
            (SourceKind::File, Some(path)) => DataSource::File(path),
            (SourceKind::Remote, _) => DataSource::Remote {
                base_url: cli.url.unwrap_or_else(|| settings.data.base_url.clone()),
                hours,
                timeout: Duration::from_secs(settings.data.timeout_secs.max(1)),
                altitude_unit_meters: settings.data.altitude_unit_meters,
            },
            // A file source without a path has nothing to read: fall back to demo
            (SourceKind::File, None) | (SourceKind::Demo, _) => DataSource::Demo {
                balloons: cli.balloons.unwrap_or(DEFAULT_DEMO_BALLOONS),
                hours,
                seed: cli.seed,
            },
        };

        Self {
            source,
            duration_secs: cli.duration.unwrap_or(settings.animation.duration_secs),
            time_step: cli.time_step.unwrap_or(settings.animation.frame_secs).clamp(0.005, 1.0),
            color_scheme: settings.view.color_scheme,
            autoplay: cli.autoplay || settings.view.autoplay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_demo() {
        let cfg = GlobeConfig::resolve(&Settings::default(), Overrides::default());
        assert_eq!(
            cfg.source,
            DataSource::Demo { balloons: DEFAULT_DEMO_BALLOONS, hours: 24, seed: None }
        );
        assert_eq!(cfg.duration_secs, 30.0);
        assert!(!cfg.autoplay);
    }

    #[test]
    fn file_flag_implies_file_source() {
        let cli = Overrides { file: Some(PathBuf::from("series.json")), ..Default::default() };
        let cfg = GlobeConfig::resolve(&Settings::default(), cli);
        assert_eq!(cfg.source, DataSource::File(PathBuf::from("series.json")));
    }

    #[test]
    fn cli_wins_over_settings() {
        let mut settings = Settings::default();
        settings.data.timeout_secs = 3;
        let cli = Overrides {
            source: Some(SourceKind::Remote),
            url: Some("http://localhost:8000".into()),
            duration: Some(12.0),
            time_step: Some(5.0),
            ..Default::default()
        };
        let cfg = GlobeConfig::resolve(&settings, cli);
        match cfg.source {
            DataSource::Remote { base_url, timeout, .. } => {
                assert_eq!(base_url, "http://localhost:8000");
                assert_eq!(timeout, Duration::from_secs(3));
            }
            other => panic!("expected remote source, got {:?}", other),
        }
        assert_eq!(cfg.duration_secs, 12.0);
        assert_eq!(cfg.time_step, 1.0);
    }
}
