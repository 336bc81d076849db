use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AutoplayError, Result};

/// Point on the playfield, in osu!pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedKind {
    Tick,
    Repeat,
}

/// Tick or repeat point owned by a slider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedEvent {
    pub kind: NestedKind,
    pub time: f64,
    pub position: Position,
}

/// A scored chart element. Positions are expected to be stack-resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    Circle {
        time: f64,
        position: Position,
    },
    Slider {
        time: f64,
        position: Position,
        end_time: f64,
        end_position: Position,
        #[serde(default)]
        nested: Vec<NestedEvent>,
    },
    Spinner {
        time: f64,
        position: Position,
        end_time: f64,
        end_position: Position,
    },
}

impl Target {
    pub fn start_time(&self) -> f64 {
        match *self {
            Target::Circle { time, .. }
            | Target::Slider { time, .. }
            | Target::Spinner { time, .. } => time,
        }
    }

    pub fn end_time(&self) -> f64 {
        match *self {
            Target::Circle { time, .. } => time,
            Target::Slider { end_time, .. } | Target::Spinner { end_time, .. } => end_time,
        }
    }

    pub fn start_position(&self) -> Position {
        match *self {
            Target::Circle { position, .. }
            | Target::Slider { position, .. }
            | Target::Spinner { position, .. } => position,
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        if !self.start_time().is_finite() || !self.end_time().is_finite() {
            return Err("times must be finite".to_string());
        }
        if self.end_time() < self.start_time() {
            return Err(format!(
                "ends at {} before it starts at {}",
                self.end_time(),
                self.start_time()
            ));
        }
        if let Target::Slider { nested, .. } = self {
            if let Some(event) = nested.iter().find(|event| !event.time.is_finite()) {
                return Err(format!("nested {:?} has a non-finite time", event.kind));
            }
        }
        Ok(())
    }
}

/// Ordered list of targets, as handed over by the beatmap loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub targets: Vec<Target>,
}

impl Chart {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Rejects charts the pipeline cannot start on: empty lists and targets
    /// with broken timing.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(AutoplayError::EmptyChart);
        }

        for (index, target) in self.targets.iter().enumerate() {
            target
                .check()
                .map_err(|reason| AutoplayError::InvalidTarget { index, reason })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_targets() {
        let chart = Chart::from_json(
            r#"{
                "targets": [
                    { "type": "circle", "time": 0, "position": { "x": 10, "y": 20 } },
                    {
                        "type": "slider", "time": 100, "position": { "x": 0, "y": 0 },
                        "end_time": 400, "end_position": { "x": 50, "y": 0 },
                        "nested": [{ "kind": "tick", "time": 250, "position": { "x": 25, "y": 0 } }]
                    },
                    {
                        "type": "spinner", "time": 500, "position": { "x": 256, "y": 192 },
                        "end_time": 900, "end_position": { "x": 256, "y": 192 }
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(chart.targets.len(), 3);
        assert_eq!(chart.targets[1].end_time(), 400.0);
        assert_eq!(chart.targets[0].start_position(), Position::new(10.0, 20.0));
        chart.validate().unwrap();
    }

    #[test]
    fn empty_chart_is_rejected() {
        let err = Chart::default().validate().unwrap_err();
        assert!(matches!(err, AutoplayError::EmptyChart));
    }

    #[test]
    fn reversed_spinner_is_rejected() {
        let chart = Chart::new(vec![
            Target::Circle {
                time: 0.0,
                position: Position::default(),
            },
            Target::Spinner {
                time: 1000.0,
                position: Position::default(),
                end_time: 500.0,
                end_position: Position::default(),
            },
        ]);

        match chart.validate() {
            Err(AutoplayError::InvalidTarget { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("before it starts"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
