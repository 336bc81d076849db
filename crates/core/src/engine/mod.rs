use serde::{Deserialize, Serialize};

use crate::{
    arbiter::choose_button, AutoplayConfig, AutoplayError, Button, ButtonAction, ButtonSession,
    Hitpoint, HitpointKind, HitpointTimeline, Result,
};

/// Per-button action counts written by one assignment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonTally {
    pub clicks: usize,
    pub holds: usize,
    pub releases: usize,
}

/// Outcome of [`ButtonAssigner::assign`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub buckets: usize,
    pub left: ButtonTally,
    pub right: ButtonTally,
    pub zones_opened: usize,
    pub zones_closed: usize,
    /// Hold zones still open after the last bucket. Zero for any well-formed
    /// chart.
    pub zones_open: usize,
}

impl AssignmentSummary {
    pub fn tally(&self, button: Button) -> &ButtonTally {
        match button {
            Button::Left => &self.left,
            Button::Right => &self.right,
        }
    }

    fn tally_mut(&mut self, button: Button) -> &mut ButtonTally {
        match button {
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
        }
    }

    fn record(&mut self, hitpoint: &Hitpoint) {
        for button in Button::ALL {
            let tally = self.tally_mut(button);
            match hitpoint.action(button) {
                ButtonAction::None => {}
                ButtonAction::Click => tally.clicks += 1,
                ButtonAction::Hold => tally.holds += 1,
                ButtonAction::Release => tally.releases += 1,
            }
        }
    }
}

/// Walks the timeline bucket by bucket and writes a button action onto every
/// hitpoint that needs one.
#[derive(Debug, Clone)]
pub struct ButtonAssigner {
    session: ButtonSession,
    threshold_ms: f64,
    release_delay: f64,
}

impl ButtonAssigner {
    pub fn new(config: &AutoplayConfig) -> Self {
        Self {
            session: ButtonSession::new(),
            threshold_ms: config.alternating_threshold_ms(),
            release_delay: config.release_delay,
        }
    }

    pub fn session(&self) -> &ButtonSession {
        &self.session
    }

    /// Assigns actions to the whole timeline. Each bucket is resolved
    /// completely before the next one is looked at.
    pub fn assign(&mut self, timeline: &mut HitpointTimeline) -> Result<AssignmentSummary> {
        let mut summary = AssignmentSummary::default();

        for (time, bucket) in timeline.buckets_mut() {
            self.process_bucket(time, bucket)?;

            summary.buckets += 1;
            for hitpoint in bucket.iter() {
                if hitpoint.kind.opens_hold() {
                    summary.zones_opened += 1;
                }
                if hitpoint.kind.closes_hold() {
                    summary.zones_closed += 1;
                }
                summary.record(hitpoint);
            }
        }

        summary.zones_open = self.session.active_holds();
        tracing::info!(
            buckets = summary.buckets,
            left_clicks = summary.left.clicks,
            right_clicks = summary.right.clicks,
            holds = summary.left.holds + summary.right.holds,
            "assigned buttons"
        );
        Ok(summary)
    }

    /// Resolves one bucket: open zones, close zones, primary click, then
    /// spinner engagement.
    pub fn process_bucket(&mut self, time: f64, bucket: &mut [Hitpoint]) -> Result<()> {
        for hitpoint in bucket.iter() {
            if hitpoint.kind.opens_hold() {
                self.session.open_hold_zone();
            }
        }

        for hitpoint in bucket.iter_mut() {
            if hitpoint.kind.closes_hold() && self.session.close_hold_zone() {
                self.release(hitpoint)?;
            }
        }

        let primary = find_kind(bucket, HitpointKind::SliderHead)
            .map(|index| (index, true))
            .or_else(|| find_kind(bucket, HitpointKind::Circle).map(|index| (index, false)));
        if let Some((index, reengage)) = primary {
            self.click(&mut bucket[index], reengage);
        }

        let engage_spinner = primary.is_none()
            && self.session.held_button().is_none()
            && self.session.in_hold_zone();
        if engage_spinner {
            if let Some(index) = find_kind(bucket, HitpointKind::SpinnerStart) {
                self.click(&mut bucket[index], false);
            }
        }

        tracing::debug!(time, active_holds = self.session.active_holds(), "resolved bucket");
        Ok(())
    }

    fn release(&mut self, hitpoint: &mut Hitpoint) -> Result<()> {
        let Some(button) = self.session.held_button() else {
            tracing::error!(
                time = hitpoint.time,
                kind = ?hitpoint.kind,
                "hold zone closed with no button held"
            );
            return Err(AutoplayError::ReleaseWithoutHold {
                time: hitpoint.time,
            });
        };

        self.session.lift(button, hitpoint.time + self.release_delay);
        hitpoint.set_action(button, ButtonAction::Release);
        Ok(())
    }

    /// Clicks `hitpoint`. With `reengage` the press becomes a sustained hold
    /// and a hold on the other button is released first.
    fn click(&mut self, hitpoint: &mut Hitpoint, reengage: bool) {
        let button = choose_button(&self.session, hitpoint.time, self.threshold_ms);
        let other = button.other();

        if reengage {
            if self.session.is_held(other) {
                self.session.lift(other, hitpoint.time + self.release_delay);
                hitpoint.set_action(other, ButtonAction::Release);
            }
            self.hold(hitpoint, button);
        } else if self.session.in_hold_zone() && !self.session.is_held(other) {
            self.hold(hitpoint, button);
        } else {
            self.session.lift(button, hitpoint.time + self.release_delay);
            hitpoint.set_action(button, ButtonAction::Click);
        }

        tracing::debug!(
            time = hitpoint.time,
            kind = ?hitpoint.kind,
            ?button,
            action = ?hitpoint.action(button),
            "assigned action"
        );
    }

    fn hold(&mut self, hitpoint: &mut Hitpoint, button: Button) {
        self.session.hold(button);
        hitpoint.set_action(button, ButtonAction::Hold);
    }
}

fn find_kind(bucket: &[Hitpoint], kind: HitpointKind) -> Option<usize> {
    bucket.iter().position(|hitpoint| hitpoint.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, Target};

    fn circle(time: f64) -> Target {
        Target::Circle {
            time,
            position: Position::new(time as f32, 0.0),
        }
    }

    fn slider(time: f64, end_time: f64) -> Target {
        Target::Slider {
            time,
            position: Position::default(),
            end_time,
            end_position: Position::new(100.0, 0.0),
            nested: Vec::new(),
        }
    }

    fn spinner(time: f64, end_time: f64) -> Target {
        Target::Spinner {
            time,
            position: Position::new(256.0, 192.0),
            end_time,
            end_position: Position::new(256.0, 192.0),
        }
    }

    fn assign(targets: &[Target]) -> (HitpointTimeline, AssignmentSummary) {
        let mut timeline = HitpointTimeline::extract(targets);
        let mut assigner = ButtonAssigner::new(&AutoplayConfig::default());
        let summary = assigner.assign(&mut timeline).unwrap();
        assert_eq!(assigner.session().active_holds(), summary.zones_open);
        (timeline, summary)
    }

    fn actions(timeline: &HitpointTimeline, time: f64) -> Vec<(ButtonAction, ButtonAction)> {
        timeline
            .bucket(time)
            .unwrap()
            .iter()
            .map(|h| (h.left_action, h.right_action))
            .collect()
    }

    #[test]
    fn close_circles_alternate_then_reset_to_left() {
        let (timeline, summary) = assign(&[circle(0.0), circle(100.0), circle(1000.0)]);

        assert_eq!(actions(&timeline, 0.0), vec![(ButtonAction::Click, ButtonAction::None)]);
        assert_eq!(actions(&timeline, 100.0), vec![(ButtonAction::None, ButtonAction::Click)]);
        assert_eq!(actions(&timeline, 1000.0), vec![(ButtonAction::Click, ButtonAction::None)]);
        assert_eq!(summary.left.clicks, 2);
        assert_eq!(summary.right.clicks, 1);
    }

    #[test]
    fn stream_keeps_alternating() {
        let times = [0.0, 100.0, 200.0, 300.0];
        let targets: Vec<Target> = times.iter().map(|t| circle(*t)).collect();
        let (timeline, _) = assign(&targets);

        let buttons: Vec<Button> = times
            .iter()
            .map(|t| timeline.bucket(*t).unwrap()[0].button_with(ButtonAction::Click).unwrap())
            .collect();
        assert_eq!(
            buttons,
            vec![Button::Left, Button::Right, Button::Left, Button::Right]
        );
    }

    #[test]
    fn slider_holds_then_releases() {
        let targets = [slider(0.0, 500.0)];
        let mut timeline = HitpointTimeline::extract(&targets);
        let mut assigner = ButtonAssigner::new(&AutoplayConfig::default());

        let mut buckets = timeline.buckets_mut();
        let (time, head) = buckets.next().unwrap();
        assigner.process_bucket(time, head).unwrap();
        assert_eq!(head[0].left_action, ButtonAction::Hold);
        assert_eq!(assigner.session().active_holds(), 1);
        assert!(assigner.session().is_held(Button::Left));

        let (time, tail) = buckets.next().unwrap();
        assigner.process_bucket(time, tail).unwrap();
        assert_eq!(tail[0].left_action, ButtonAction::Release);
        assert_eq!(assigner.session().active_holds(), 0);
        assert_eq!(assigner.session().last_click(Button::Left), Some(550.0));
    }

    #[test]
    fn circle_during_spinner_uses_free_button() {
        let (timeline, summary) = assign(&[spinner(0.0, 2000.0), circle(1000.0)]);

        assert_eq!(actions(&timeline, 0.0), vec![(ButtonAction::Hold, ButtonAction::None)]);
        assert_eq!(actions(&timeline, 1000.0), vec![(ButtonAction::None, ButtonAction::Click)]);
        assert_eq!(actions(&timeline, 2000.0), vec![(ButtonAction::Release, ButtonAction::None)]);
        assert_eq!(summary.zones_open, 0);
    }

    #[test]
    fn overlapping_slider_forces_release_on_new_head() {
        let (timeline, summary) = assign(&[slider(0.0, 1000.0), slider(500.0, 1500.0)]);

        assert_eq!(actions(&timeline, 0.0), vec![(ButtonAction::Hold, ButtonAction::None)]);
        assert_eq!(
            actions(&timeline, 500.0),
            vec![(ButtonAction::Release, ButtonAction::Hold)]
        );
        assert_eq!(actions(&timeline, 1000.0), vec![(ButtonAction::None, ButtonAction::None)]);
        assert_eq!(actions(&timeline, 1500.0), vec![(ButtonAction::None, ButtonAction::Release)]);
        assert_eq!(summary.zones_opened, summary.zones_closed);
    }

    #[test]
    fn circle_under_spinner_start_becomes_the_hold() {
        let (timeline, _) = assign(&[spinner(0.0, 1000.0), circle(0.0)]);

        let bucket = timeline.bucket(0.0).unwrap();
        assert_eq!(bucket[0].kind, HitpointKind::SpinnerStart);
        assert_eq!(bucket[0].left_action, ButtonAction::None);
        assert_eq!(bucket[1].left_action, ButtonAction::Hold);
        assert_eq!(actions(&timeline, 1000.0), vec![(ButtonAction::Release, ButtonAction::None)]);
    }

    #[test]
    fn only_one_click_per_bucket() {
        let (timeline, summary) = assign(&[circle(0.0), circle(0.0)]);

        assert_eq!(
            actions(&timeline, 0.0),
            vec![
                (ButtonAction::Click, ButtonAction::None),
                (ButtonAction::None, ButtonAction::None)
            ]
        );
        assert_eq!(summary.left.clicks + summary.right.clicks, 1);
    }

    #[test]
    fn hold_zones_are_conserved() {
        let (_, summary) = assign(&[
            slider(0.0, 400.0),
            circle(200.0),
            spinner(600.0, 1600.0),
            slider(800.0, 1200.0),
            circle(2000.0),
        ]);

        assert_eq!(summary.zones_opened, 3);
        assert_eq!(summary.zones_closed, 3);
        assert_eq!(summary.zones_open, 0);
    }

    #[test]
    fn spinner_inside_slider_keeps_the_slider_hold() {
        let (timeline, summary) = assign(&[slider(0.0, 1000.0), spinner(200.0, 2000.0)]);

        assert_eq!(actions(&timeline, 0.0), vec![(ButtonAction::Hold, ButtonAction::None)]);
        assert_eq!(actions(&timeline, 200.0), vec![(ButtonAction::None, ButtonAction::None)]);
        assert_eq!(actions(&timeline, 1000.0), vec![(ButtonAction::None, ButtonAction::None)]);
        assert_eq!(actions(&timeline, 2000.0), vec![(ButtonAction::Release, ButtonAction::None)]);
        assert_eq!(summary.left.holds + summary.right.holds, 1);
        assert_eq!(summary.zones_open, 0);
    }

    #[test]
    fn spinner_start_is_skipped_while_a_button_is_held() {
        let targets = [slider(0.0, 1000.0), spinner(200.0, 2000.0)];
        let mut timeline = HitpointTimeline::extract(&targets);
        let mut assigner = ButtonAssigner::new(&AutoplayConfig::default());

        for (time, bucket) in timeline.buckets_mut() {
            assigner.process_bucket(time, bucket).unwrap();
            if time == 200.0 || time == 1000.0 {
                assert_eq!(assigner.session().held_button(), Some(Button::Left));
                assert!(assigner.session().in_hold_zone());
            }
        }
        assert_eq!(assigner.session().held_button(), None);
    }

    #[test]
    fn zero_length_spinner_is_an_invariant_violation() {
        let mut timeline = HitpointTimeline::extract(&[spinner(100.0, 100.0)]);
        let mut assigner = ButtonAssigner::new(&AutoplayConfig::default());

        let err = assigner.assign(&mut timeline).unwrap_err();
        assert!(matches!(err, AutoplayError::ReleaseWithoutHold { time } if time == 100.0));
    }
}
