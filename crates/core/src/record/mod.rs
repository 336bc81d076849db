use std::{fs::File, io::BufWriter, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{AutoplayError, Frame, Result};

/// Destination for synthesized frames. Frames arrive in emission order and
/// are never taken back.
pub trait FrameSink {
    fn push(&mut self, frame: Frame);
}

impl FrameSink for Vec<Frame> {
    fn push(&mut self, frame: Frame) {
        Vec::push(self, frame);
    }
}

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    pub output_path: String,
    pub pretty: bool,
}

/// Serialized form of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayDocument {
    pub delayed_movements: bool,
    pub frames: Vec<Frame>,
}

/// Buffers frames and writes them out as a JSON replay document.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    settings: RecordingSettings,
    delayed_movements: bool,
    frames: Vec<Frame>,
}

impl FrameRecorder {
    pub fn new(settings: RecordingSettings, delayed_movements: bool) -> Self {
        Self {
            settings,
            delayed_movements,
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let document = ReplayDocument {
            delayed_movements: self.delayed_movements,
            frames: self.frames.clone(),
        };

        if self.settings.pretty {
            serde_json::to_writer_pretty(writer, &document)?;
        } else {
            serde_json::to_writer(writer, &document)?;
        }
        Ok(())
    }

    /// Writes the document to `output_path` from the settings.
    pub fn save(&self) -> Result<()> {
        if self.settings.output_path.is_empty() {
            return Err(AutoplayError::msg("recording has no output path"));
        }
        self.save_to(&self.settings.output_path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::info!(?path, frames = self.frames.len(), "wrote replay");
        Ok(())
    }
}

impl FrameSink for FrameRecorder {
    fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }
}
