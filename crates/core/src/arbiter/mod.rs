//! Picks which virtual button performs the next click or hold.

use crate::{Button, ButtonSession};

/// Chooses a button for an action at `time`.
///
/// A held left button forces the right one. Otherwise left is taken once it
/// has idled past `threshold_ms` or while right is busy holding, and between
/// those the button that was lifted earlier wins. Comparisons against a
/// missing (mid-hold) last-click time are false and fall through to left.
pub fn choose_button(session: &ButtonSession, time: f64, threshold_ms: f64) -> Button {
    let left_last = session.last_click(Button::Left);
    let right_last = session.last_click(Button::Right);

    if session.is_held(Button::Left) {
        return Button::Right;
    }

    let left_idle = left_last.is_some_and(|last| time - last > threshold_ms);
    if left_idle || session.is_held(Button::Right) {
        return Button::Left;
    }

    match (left_last, right_last) {
        (Some(left), Some(right)) if left > right => Button::Right,
        _ => Button::Left,
    }
}
