use clap::{Args, Parser, Subcommand, ValueEnum};
use skytrail::config::{DataSource, GlobeConfig, Overrides, SourceKind};
use skytrail::engine::AnimationState;
use skytrail::error::Result;
use skytrail::settings::Settings;
use skytrail::terminal::Terminal;
use skytrail::viz::canvas::BrailleCanvas;
use skytrail::viz::controls::OrbitControls;
use skytrail::viz::globe::{self, Hud};
use skytrail::{data, headless};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skytrail")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Replay the last day of stratospheric balloon flights on a terminal globe", long_about = None)]
struct Cli {
    /// Append logs to this file (overrides the config file)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    Demo,
    Remote,
    File,
}

impl From<Source> for SourceKind {
    fn from(s: Source) -> Self {
        match s {
            Source::Demo => SourceKind::Demo,
            Source::Remote => SourceKind::Remote,
            Source::File => SourceKind::File,
        }
    }
}

#[derive(Args)]
struct SourceArgs {
    /// Where snapshots come from
    #[arg(long, value_enum)]
    source: Option<Source>,

    /// Series file written by `skytrail fetch`
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Base URL of the hourly feed
    #[arg(long)]
    url: Option<String>,

    /// Number of demo balloons
    #[arg(short, long)]
    balloons: Option<usize>,

    /// Random seed for the demo source
    #[arg(short, long)]
    seed: Option<u64>,

    /// Seconds for a full replay
    #[arg(short, long)]
    duration: Option<f64>,
}

impl SourceArgs {
    fn overrides(self) -> Overrides {
        Overrides {
            source: self.source.map(SourceKind::from),
            file: self.file,
            url: self.url,
            balloons: self.balloons,
            seed: self.seed,
            duration: self.duration,
            ..Overrides::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive globe
    Globe {
        #[command(flatten)]
        source: SourceArgs,

        /// Seconds per frame
        #[arg(short, long)]
        time: Option<f32>,

        /// Start the replay without waiting for space
        #[arg(short, long)]
        autoplay: bool,
    },

    /// Download the hourly feed and save it as a series file
    Fetch {
        /// Output file
        #[arg(short, long, default_value = "series.json")]
        out: PathBuf,

        /// Base URL of the hourly feed
        #[arg(long)]
        url: Option<String>,

        /// Hours to download
        #[arg(long)]
        hours: Option<usize>,
    },

    /// Run the replay headless and print where everything is
    Print {
        #[command(flatten)]
        source: SourceArgs,

        /// Point of the replay to stop at (0 to 1)
        #[arg(long, default_value = "1.0")]
        at: f64,

        /// Rows of the object table
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Also draw the globe
        #[arg(short, long)]
        render: bool,

        #[arg(long, default_value = "100")]
        width: u16,

        #[arg(long, default_value = "40")]
        height: u16,
    },
}

/// Log to a file when one is configured; otherwise only the non-interactive
/// commands log, to stderr
fn init_logging(path: Option<&Path>, stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("SKYTRAIL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if let Some(path) = path {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else if stderr {
        builder.with_writer(io::stderr).init();
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load();
    let log_file = cli.log_file.or_else(|| settings.log_file.clone());
    let interactive = matches!(cli.command, Commands::Globe { .. });
    init_logging(log_file.as_deref(), !interactive)?;

    match cli.command {
        Commands::Globe { source, time, autoplay } => {
            let overrides = Overrides { time_step: time, autoplay, ..source.overrides() };
            let config = GlobeConfig::resolve(&settings, overrides);
            // Load before taking over the screen so errors stay readable
            let series = data::load(&config.source)?;
            let mut term = Terminal::new(true)?;
            globe::run(&mut term, &config, series)
        }
        Commands::Fetch { out, url, hours } => {
            let source = DataSource::Remote {
                base_url: url.unwrap_or_else(|| settings.data.base_url.clone()),
                hours: hours.unwrap_or(settings.data.hours).max(1),
                timeout: Duration::from_secs(settings.data.timeout_secs.max(1)),
                altitude_unit_meters: settings.data.altitude_unit_meters,
            };
            let series = data::load(&source)?;
            data::write_series(&out, &series)?;
            println!(
                "wrote {} hours ({} balloons) to {}",
                series.len(),
                series.object_count(),
                out.display()
            );
            Ok(())
        }
        Commands::Print { source, at, limit, render, width, height } => {
            let config = GlobeConfig::resolve(&settings, source.overrides());
            let series = data::load(&config.source)?;
            let mut state = AnimationState::new(series, config.duration_secs);
            let outcome = headless::simulate(&mut state, at);

            let mut stdout = io::stdout().lock();
            headless::write_report(&mut stdout, &outcome, limit)?;
            stdout.flush()?;
            drop(stdout);

            if render {
                let pose = outcome.camera.unwrap_or_else(|| OrbitControls::default().pose());
                let mut term = Terminal::offscreen(width, height);
                let mut canvas = BrailleCanvas::new(width, height);
                let hours_ago = outcome.progress.map_or(0, |p| p.hour_label);
                let hud = Hud {
                    progress: outcome.progress,
                    when: state.series().time_of(hours_ago),
                    balloons: outcome.frame.objects.len(),
                };
                let sun = hud.when.map(globe::subsolar_lon);
                globe::draw_frame(&mut term, &mut canvas, &outcome.frame, &pose, config.color_scheme, sun);
                globe::draw_hud(&mut term, &hud);
                term.print_to_stdout()?;
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "exiting");
            eprintln!("skytrail: {}", e);
            ExitCode::FAILURE
        }
    }
}
