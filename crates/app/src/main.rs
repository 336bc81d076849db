use std::path::{Path, PathBuf};

use autoplay_core::{
    AppConfig, AutoplayGenerator, Button, Chart, FrameRecorder, HitpointKind, RecordingSettings,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> autoplay_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            chart,
            output,
            tuning,
            pretty,
        } => run_generate(&chart, &output, &tuning, pretty),
        Commands::Inspect { chart, tuning } => run_inspect(&chart, &tuning),
    }
}

fn run_generate(
    chart_path: &Path,
    output: &Path,
    tuning: &Tuning,
    pretty: bool,
) -> autoplay_core::Result<()> {
    tracing::info!(chart = ?chart_path, ?output, "generating replay");

    let config = tuning.resolve()?;
    let chart = Chart::load(chart_path)?;
    let settings = RecordingSettings {
        output_path: output.to_string_lossy().into_owned(),
        pretty: pretty || config.recording.pretty,
    };

    let mut recorder = FrameRecorder::new(settings, config.autoplay.delayed_movements);
    AutoplayGenerator::new(config.autoplay).run(&chart, &mut recorder)?;
    recorder.save()
}

fn run_inspect(chart_path: &Path, tuning: &Tuning) -> autoplay_core::Result<()> {
    let config = tuning.resolve()?;
    let chart = Chart::load(chart_path)?;

    let mut generator = AutoplayGenerator::new(config.autoplay);
    generator.prepare(&chart)?;

    let timeline = generator.timeline();
    tracing::info!(
        targets = chart.targets.len(),
        buckets = timeline.bucket_count(),
        hitpoints = timeline.hitpoint_count(),
        first = timeline.first_time(),
        "timeline"
    );
    for kind in [
        HitpointKind::Circle,
        HitpointKind::SliderHead,
        HitpointKind::SliderTick,
        HitpointKind::SliderTail,
        HitpointKind::SpinnerStart,
        HitpointKind::SpinnerEnd,
    ] {
        tracing::info!(?kind, count = timeline.count_kind(kind), "hitpoints");
    }

    let summary = generator.summary();
    tracing::info!(
        threshold = generator.config().alternating_threshold,
        zones_opened = summary.zones_opened,
        zones_closed = summary.zones_closed,
        "assignment"
    );
    for button in Button::ALL {
        let tally = summary.tally(button);
        tracing::info!(
            ?button,
            clicks = tally.clicks,
            holds = tally.holds,
            releases = tally.releases,
            "buttons"
        );
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates perfect-play replays from charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the replay frames for a chart and write them as JSON.
    Generate {
        /// Path to the chart JSON file.
        chart: PathBuf,
        /// Output path for the replay document.
        output: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
        /// Pretty-print the replay document.
        #[arg(long)]
        pretty: bool,
    },
    /// Extract hitpoints and assign buttons without writing frames.
    Inspect {
        /// Path to the chart JSON file.
        chart: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
    },
}

/// Configuration file plus per-run overrides.
#[derive(Args, Debug)]
struct Tuning {
    /// Optional JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Alternating threshold in seconds.
    #[arg(long)]
    threshold: Option<f64>,
    /// Mods-adjusted reaction time in milliseconds.
    #[arg(long)]
    reaction_time: Option<f64>,
    /// Prefer delayed easing in the downstream interpolation layer.
    #[arg(long)]
    delayed_movements: bool,
}

impl Tuning {
    fn resolve(&self) -> autoplay_core::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(threshold) = self.threshold {
            config.autoplay.alternating_threshold = threshold;
        }
        if let Some(reaction_time) = self.reaction_time {
            config.autoplay.reaction_time = reaction_time;
        }
        if self.delayed_movements {
            config.autoplay.delayed_movements = true;
        }

        config.validate()?;
        Ok(config)
    }
}
