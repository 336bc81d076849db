use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    AutoplayConfig, AutoplayError, Button, ButtonAction, FrameSink, Hitpoint, HitpointTimeline,
    Position, Result,
};

const FAR_PAST: f64 = -100_000.0;
const APPROACH_LEAD: f64 = 1500.0;
const REST_LEAD: f64 = 1000.0;
const OFFSCREEN_REST: Position = Position::new(256.0, 500.0);
const PLAYFIELD_CENTRE: Position = Position::new(256.0, 192.0);

bitflags! {
    /// Buttons pressed in a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ButtonState: u8 {
        const LEFT = 1;
        const RIGHT = 1 << 1;
    }
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Button> for ButtonState {
    fn from(button: Button) -> Self {
        match button {
            Button::Left => ButtonState::LEFT,
            Button::Right => ButtonState::RIGHT,
        }
    }
}

/// One anchor of the replay: where the cursor is and which buttons are down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    pub position: Position,
    #[serde(with = "button_bits")]
    pub buttons: ButtonState,
}

impl Frame {
    pub fn new(time: f64, position: Position, buttons: ButtonState) -> Self {
        Self {
            time,
            position,
            buttons,
        }
    }
}

mod button_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::ButtonState;

    pub fn serialize<S>(value: &ButtonState, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(value.bits())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ButtonState, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(ButtonState::from_bits_truncate(bits))
    }
}

/// Frame emission rules, one of which fires per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRule {
    Release,
    Click,
    Hold,
    Move,
}

impl FrameRule {
    /// Action-driven rules, highest priority first. [`FrameRule::Move`] is the
    /// fallback when none of them match.
    pub const PRIORITY: [FrameRule; 3] = [FrameRule::Release, FrameRule::Click, FrameRule::Hold];

    fn action(self) -> Option<ButtonAction> {
        match self {
            FrameRule::Release => Some(ButtonAction::Release),
            FrameRule::Click => Some(ButtonAction::Click),
            FrameRule::Hold => Some(ButtonAction::Hold),
            FrameRule::Move => None,
        }
    }
}

/// The rule chosen for a bucket and the hitpoint it fires on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch<'a> {
    pub rule: FrameRule,
    pub hitpoint: &'a Hitpoint,
    /// `None` only for [`FrameRule::Move`].
    pub button: Option<Button>,
}

/// Picks the rule for a bucket. Ties inside a rule go to the earliest
/// hitpoint in extraction order, and to left before right on one hitpoint.
pub fn select_rule(bucket: &[Hitpoint]) -> Option<RuleMatch<'_>> {
    for rule in FrameRule::PRIORITY {
        let Some(action) = rule.action() else {
            continue;
        };
        let found = bucket
            .iter()
            .find_map(|hitpoint| hitpoint.button_with(action).map(|button| (hitpoint, button)));
        if let Some((hitpoint, button)) = found {
            return Some(RuleMatch {
                rule,
                hitpoint,
                button: Some(button),
            });
        }
    }

    bucket.first().map(|hitpoint| RuleMatch {
        rule: FrameRule::Move,
        hitpoint,
        button: None,
    })
}

/// Turns an annotated timeline into timed frames.
///
/// The run opens with three idle frames: one far in the past, one 1500ms
/// before the first hitpoint and one 1000ms before it at the playfield
/// centre. A reaction time above 1000ms pushes the last two earlier, to
/// `reaction_time + 500` and `reaction_time` before the first hitpoint, so
/// slow mods still get a full approach before the first action.
#[derive(Debug, Clone)]
pub struct FrameSynthesizer {
    anchor_lead: f64,
    key_up_delay: f64,
    reaction_time: f64,
}

impl FrameSynthesizer {
    pub fn new(config: &AutoplayConfig) -> Self {
        Self {
            anchor_lead: config.anchor_lead,
            key_up_delay: config.key_up_delay,
            reaction_time: config.reaction_time,
        }
    }

    /// Emits the warm-up frames and then exactly one rule per bucket.
    pub fn synthesize<S: FrameSink + ?Sized>(
        &self,
        timeline: &HitpointTimeline,
        sink: &mut S,
    ) -> Result<()> {
        let first = timeline.first_time().ok_or(AutoplayError::EmptyChart)?;
        let mut out = Emitter {
            sink,
            buttons: ButtonState::empty(),
            emitted: 0,
        };

        out.emit(FAR_PAST, OFFSCREEN_REST, ButtonState::empty());
        out.emit(
            first - APPROACH_LEAD.max(self.reaction_time + 500.0),
            OFFSCREEN_REST,
            ButtonState::empty(),
        );
        out.emit(
            first - REST_LEAD.max(self.reaction_time),
            PLAYFIELD_CENTRE,
            ButtonState::empty(),
        );

        for (_, bucket) in timeline.buckets() {
            if let Some(matched) = select_rule(bucket) {
                self.apply(&mut out, matched);
            }
        }

        tracing::info!(frames = out.emitted, "synthesized frames");
        Ok(())
    }

    fn apply<S: FrameSink + ?Sized>(&self, out: &mut Emitter<'_, S>, matched: RuleMatch<'_>) {
        let RuleMatch {
            rule,
            hitpoint,
            button,
        } = matched;
        let bit = button.map(ButtonState::from).unwrap_or_default();
        let previous = out.buttons;
        let (time, position) = (hitpoint.time, hitpoint.position);

        match rule {
            FrameRule::Release => out.emit(time, position, previous.difference(bit)),
            FrameRule::Click => {
                out.emit(time - self.anchor_lead, position, previous);
                out.emit(time, position, previous | bit);
                out.emit(time + self.key_up_delay, position, previous);
            }
            FrameRule::Hold => {
                out.emit(time - self.anchor_lead, position, previous);
                out.emit(time, position, previous | bit);
            }
            FrameRule::Move => out.emit(time, position, previous),
        }
    }
}

/// Sink wrapper that remembers the buttons of the last frame it pushed.
struct Emitter<'s, S: FrameSink + ?Sized> {
    sink: &'s mut S,
    buttons: ButtonState,
    emitted: usize,
}

impl<S: FrameSink + ?Sized> Emitter<'_, S> {
    fn emit(&mut self, time: f64, position: Position, buttons: ButtonState) {
        self.sink.push(Frame::new(time, position, buttons));
        self.buttons = buttons;
        self.emitted += 1;
    }
}
