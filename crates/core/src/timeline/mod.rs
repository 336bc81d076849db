use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::{Button, Position, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitpointKind {
    Circle,
    SliderHead,
    /// Slider ticks and repeat points both map here.
    SliderTick,
    SliderTail,
    SpinnerStart,
    SpinnerEnd,
}

impl HitpointKind {
    /// Kinds that open a hold zone.
    pub fn opens_hold(self) -> bool {
        matches!(self, HitpointKind::SliderHead | HitpointKind::SpinnerStart)
    }

    /// Kinds that close a hold zone.
    pub fn closes_hold(self) -> bool {
        matches!(self, HitpointKind::SliderTail | HitpointKind::SpinnerEnd)
    }
}

/// What a button does at a hitpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    #[default]
    None,
    Click,
    Hold,
    Release,
}

/// Timed event derived from a target. Only the two actions change after
/// extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hitpoint {
    pub time: f64,
    pub kind: HitpointKind,
    pub position: Position,
    pub left_action: ButtonAction,
    pub right_action: ButtonAction,
}

impl Hitpoint {
    pub fn new(time: f64, kind: HitpointKind, position: Position) -> Self {
        Self {
            time,
            kind,
            position,
            left_action: ButtonAction::None,
            right_action: ButtonAction::None,
        }
    }

    pub fn action(&self, button: Button) -> ButtonAction {
        match button {
            Button::Left => self.left_action,
            Button::Right => self.right_action,
        }
    }

    pub fn set_action(&mut self, button: Button, action: ButtonAction) {
        match button {
            Button::Left => self.left_action = action,
            Button::Right => self.right_action = action,
        }
    }

    /// First button (left before right) carrying `action`, if any.
    pub fn button_with(&self, action: ButtonAction) -> Option<Button> {
        Button::ALL
            .into_iter()
            .find(|button| self.action(*button) == action)
    }
}

/// Totally ordered millisecond timestamp used as a bucket key.
#[derive(Debug, Clone, Copy)]
pub struct TimeKey(f64);

impl TimeKey {
    pub fn new(time: f64) -> Self {
        // Folds -0.0 into 0.0 so both land in the same bucket.
        Self(time + 0.0)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Hitpoints grouped by exact time, iterated in ascending order. Within a
/// bucket hitpoints keep their extraction order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitpointTimeline {
    buckets: BTreeMap<TimeKey, Vec<Hitpoint>>,
}

impl HitpointTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens targets into hitpoints. Coincident hitpoints are neither merged
    /// nor reordered.
    pub fn extract(targets: &[Target]) -> Self {
        let mut timeline = Self::new();

        for target in targets {
            match target {
                Target::Circle { time, position } => {
                    timeline.insert(Hitpoint::new(*time, HitpointKind::Circle, *position));
                }
                Target::Slider {
                    time,
                    position,
                    end_time,
                    end_position,
                    nested,
                } => {
                    timeline.insert(Hitpoint::new(*time, HitpointKind::SliderHead, *position));
                    for event in nested {
                        timeline.insert(Hitpoint::new(
                            event.time,
                            HitpointKind::SliderTick,
                            event.position,
                        ));
                    }
                    timeline.insert(Hitpoint::new(
                        *end_time,
                        HitpointKind::SliderTail,
                        *end_position,
                    ));
                }
                Target::Spinner {
                    time,
                    position,
                    end_time,
                    end_position,
                } => {
                    timeline.insert(Hitpoint::new(*time, HitpointKind::SpinnerStart, *position));
                    timeline.insert(Hitpoint::new(
                        *end_time,
                        HitpointKind::SpinnerEnd,
                        *end_position,
                    ));
                }
            }
        }

        tracing::debug!(
            buckets = timeline.bucket_count(),
            hitpoints = timeline.hitpoint_count(),
            "extracted hitpoints"
        );
        timeline
    }

    pub fn insert(&mut self, hitpoint: Hitpoint) {
        self.buckets
            .entry(TimeKey::new(hitpoint.time))
            .or_default()
            .push(hitpoint);
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn hitpoint_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn first_time(&self) -> Option<f64> {
        self.buckets.keys().next().map(|key| key.get())
    }

    pub fn bucket(&self, time: f64) -> Option<&[Hitpoint]> {
        self.buckets.get(&TimeKey::new(time)).map(Vec::as_slice)
    }

    pub fn buckets(&self) -> impl Iterator<Item = (f64, &[Hitpoint])> + '_ {
        self.buckets
            .iter()
            .map(|(key, bucket)| (key.get(), bucket.as_slice()))
    }

    pub fn buckets_mut(&mut self) -> impl Iterator<Item = (f64, &mut [Hitpoint])> + '_ {
        self.buckets
            .iter_mut()
            .map(|(key, bucket)| (key.get(), bucket.as_mut_slice()))
    }

    pub fn hitpoints(&self) -> impl Iterator<Item = &Hitpoint> + '_ {
        self.buckets.values().flatten()
    }

    pub fn count_kind(&self, kind: HitpointKind) -> usize {
        self.hitpoints().filter(|hitpoint| hitpoint.kind == kind).count()
    }
}
