//! Core library for generating autoplay replays.
//!
//! A chart's targets are flattened into a timeline of hitpoints, every
//! hitpoint is given a left/right button action, and the annotated timeline is
//! turned into timed cursor frames. Each stage lives in its own module and can
//! be driven on its own; [`generate`] and [`AutoplayGenerator`] run them in
//! order.

pub mod arbiter;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod session;
pub mod synth;
pub mod timeline;

pub use arbiter::choose_button;
pub use chart::{Chart, NestedEvent, NestedKind, Position, Target};
pub use config::{AppConfig, AutoplayConfig};
pub use engine::{AssignmentSummary, ButtonAssigner, ButtonTally};
pub use error::{AutoplayError, Result};
pub use record::{FrameRecorder, FrameSink, RecordingSettings, ReplayDocument};
pub use session::{Button, ButtonSession, ButtonTrack};
pub use synth::{select_rule, ButtonState, Frame, FrameRule, FrameSynthesizer, RuleMatch};
pub use timeline::{ButtonAction, Hitpoint, HitpointKind, HitpointTimeline, TimeKey};

/// Runs the whole pipeline and returns the frame stream.
pub fn generate(chart: &Chart, config: &AutoplayConfig) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    AutoplayGenerator::new(config.clone()).run(chart, &mut frames)?;
    Ok(frames)
}

/// Pipeline runner that keeps the intermediate results of its last run.
#[derive(Debug, Clone, Default)]
pub struct AutoplayGenerator {
    config: AutoplayConfig,
    timeline: HitpointTimeline,
    summary: AssignmentSummary,
}

impl AutoplayGenerator {
    pub fn new(config: AutoplayConfig) -> Self {
        Self {
            config,
            timeline: HitpointTimeline::new(),
            summary: AssignmentSummary::default(),
        }
    }

    pub fn config(&self) -> &AutoplayConfig {
        &self.config
    }

    /// Annotated timeline from the last [`prepare`](Self::prepare).
    pub fn timeline(&self) -> &HitpointTimeline {
        &self.timeline
    }

    pub fn summary(&self) -> &AssignmentSummary {
        &self.summary
    }

    /// Validates the inputs, extracts hitpoints and assigns buttons.
    pub fn prepare(&mut self, chart: &Chart) -> Result<&AssignmentSummary> {
        self.config.validate()?;
        chart.validate()?;

        let mut timeline = HitpointTimeline::extract(&chart.targets);
        let summary = ButtonAssigner::new(&self.config).assign(&mut timeline)?;
        self.timeline = timeline;
        self.summary = summary;
        Ok(&self.summary)
    }

    /// Prepares `chart` and synthesizes its frames into `sink`.
    pub fn run<S: FrameSink + ?Sized>(&mut self, chart: &Chart, sink: &mut S) -> Result<()> {
        self.prepare(chart)?;
        FrameSynthesizer::new(&self.config).synthesize(&self.timeline, sink)
    }
}
