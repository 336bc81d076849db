use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 2] = [Button::Left, Button::Right];

    pub fn other(self) -> Self {
        match self {
            Button::Left => Button::Right,
            Button::Right => Button::Left,
        }
    }
}

/// Held flag and recency of one virtual button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonTrack {
    pub held: bool,
    /// `None` while the button is mid-hold. A button that was never pressed
    /// counts as lifted infinitely long ago.
    pub last_click: Option<f64>,
}

impl Default for ButtonTrack {
    fn default() -> Self {
        Self {
            held: false,
            last_click: Some(f64::NEG_INFINITY),
        }
    }
}

/// Mutable button bookkeeping for a single generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonSession {
    active_holds: usize,
    left: ButtonTrack,
    right: ButtonTrack,
}

impl ButtonSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_holds(&self) -> usize {
        self.active_holds
    }

    pub fn in_hold_zone(&self) -> bool {
        self.active_holds > 0
    }

    pub fn open_hold_zone(&mut self) {
        self.active_holds += 1;
    }

    /// Closes one hold zone and reports whether none remain open.
    pub fn close_hold_zone(&mut self) -> bool {
        self.active_holds = self.active_holds.saturating_sub(1);
        self.active_holds == 0
    }

    pub fn track(&self, button: Button) -> &ButtonTrack {
        match button {
            Button::Left => &self.left,
            Button::Right => &self.right,
        }
    }

    fn track_mut(&mut self, button: Button) -> &mut ButtonTrack {
        match button {
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
        }
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.track(button).held
    }

    pub fn last_click(&self, button: Button) -> Option<f64> {
        self.track(button).last_click
    }

    /// Button currently held, left first.
    pub fn held_button(&self) -> Option<Button> {
        Button::ALL.into_iter().find(|button| self.is_held(*button))
    }

    /// Presses and keeps holding `button`.
    pub fn hold(&mut self, button: Button) {
        let track = self.track_mut(button);
        track.held = true;
        track.last_click = None;
    }

    /// Lifts `button` at `time`; also used for plain clicks, which never
    /// leave the button down.
    pub fn lift(&mut self, button: Button, time: f64) {
        let track = self.track_mut(button);
        track.held = false;
        track.last_click = Some(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_zone_counter_reports_when_empty() {
        let mut session = ButtonSession::new();
        session.open_hold_zone();
        session.open_hold_zone();

        assert!(session.in_hold_zone());
        assert!(!session.close_hold_zone());
        assert!(session.close_hold_zone());
        assert_eq!(session.active_holds(), 0);
    }

    #[test]
    fn fresh_buttons_are_idle() {
        let session = ButtonSession::new();
        assert_eq!(session.held_button(), None);
        assert_eq!(session.last_click(Button::Left), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn holding_clears_recency_until_lifted() {
        let mut session = ButtonSession::new();
        session.lift(Button::Right, 120.0);
        assert_eq!(session.last_click(Button::Right), Some(120.0));

        session.hold(Button::Right);
        assert_eq!(session.held_button(), Some(Button::Right));
        assert_eq!(session.last_click(Button::Right), None);

        session.lift(Button::Right, 400.0);
        assert_eq!(session.held_button(), None);
        assert_eq!(session.last_click(Button::Right), Some(400.0));
    }
}
