use std::time::Duration;

use serde::Deserialize;

use crate::models::Timestamp;

/// Press duration that distinguishes a long-press from a tap. Long enough to
/// not fire during ordinary scrolling or tapping, short enough to feel
/// responsive.
pub const LONG_PRESS_MS: i64 = 750;

/// Where a press-start event originated. The completion checkbox opts out of
/// gesture tracking entirely; it has its own direct action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressOrigin {
    Item,
    Checkbox,
}

/// Handed to the timer driver when a press is armed. The generation ties the
/// eventual callback to this particular press; anything that cancels the
/// press strands the generation and the callback fires into nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedPress {
    pub task_id: String,
    pub generation: u64,
    pub deadline: Timestamp,
}

#[derive(Debug, Default)]
enum PressState {
    #[default]
    Idle,
    Pressing {
        task_id: String,
        generation: u64,
    },
}

/// Classifies one item's pointer interaction as a long-press or a tap.
///
/// Single-pointer model: at most one press is tracked at a time, and a new
/// press-start supersedes any press still pending.
#[derive(Debug, Default)]
pub struct PressGesture {
    state: PressState,
    generation: u64,
}

impl PressGesture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters Pressing and arms the long-press deadline. Starts on the
    /// checkbox are ignored and the state stays Idle.
    pub fn press_start(
        &mut self,
        task_id: &str,
        origin: PressOrigin,
        now: Timestamp,
    ) -> Option<ArmedPress> {
        if origin == PressOrigin::Checkbox {
            return None;
        }
        self.generation += 1;
        self.state = PressState::Pressing {
            task_id: task_id.to_string(),
            generation: self.generation,
        };
        Some(ArmedPress {
            task_id: task_id.to_string(),
            generation: self.generation,
            deadline: now + LONG_PRESS_MS,
        })
    }

    /// Movement disqualifies a press; this is what keeps a long-press from
    /// firing mid-scroll.
    pub fn press_move(&mut self) {
        self.state = PressState::Idle;
    }

    /// Release before the deadline is an ordinary tap; nothing fires.
    pub fn press_end(&mut self) {
        self.state = PressState::Idle;
    }

    /// Leaving the item without a release is handled like a release.
    pub fn pointer_leave(&mut self) {
        self.state = PressState::Idle;
    }

    /// Called by the timer driver when the armed delay elapses. Returns the
    /// pressed item's id iff the press with this generation is still active;
    /// a stale generation (cancelled or superseded press) returns `None`.
    pub fn timer_elapsed(&mut self, generation: u64) -> Option<String> {
        match &self.state {
            PressState::Pressing {
                task_id,
                generation: active,
            } if *active == generation => {
                let task_id = task_id.clone();
                self.state = PressState::Idle;
                Some(task_id)
            }
            _ => None,
        }
    }

    pub fn is_pressing(&self) -> bool {
        matches!(self.state, PressState::Pressing { .. })
    }
}

/// Single-shot delay for a live press; resolves to the generation that the
/// caller feeds back into [`PressGesture::timer_elapsed`].
pub async fn press_delay(armed: &ArmedPress) -> u64 {
    tokio::time::sleep(Duration::from_millis(LONG_PRESS_MS as u64)).await;
    armed.generation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_before_deadline_is_a_tap() {
        let mut gesture = PressGesture::new();
        let armed = gesture
            .press_start("x", PressOrigin::Item, 0)
            .expect("press armed");
        assert_eq!(armed.deadline, LONG_PRESS_MS);

        // Released at t=500, before the deadline.
        gesture.press_end();
        assert!(!gesture.is_pressing());
        assert_eq!(gesture.timer_elapsed(armed.generation), None);
    }

    #[test]
    fn undisturbed_press_fires_exactly_once() {
        let mut gesture = PressGesture::new();
        let armed = gesture
            .press_start("x", PressOrigin::Item, 0)
            .expect("press armed");

        assert_eq!(gesture.timer_elapsed(armed.generation).as_deref(), Some("x"));
        // The signal is edge-triggered; a duplicate callback finds Idle.
        assert_eq!(gesture.timer_elapsed(armed.generation), None);
    }

    #[test]
    fn movement_cancels_the_pending_press() {
        let mut gesture = PressGesture::new();
        let armed = gesture
            .press_start("x", PressOrigin::Item, 0)
            .expect("press armed");

        // Finger moved at t=200; no signal no matter how late the timer fires.
        gesture.press_move();
        assert_eq!(gesture.timer_elapsed(armed.generation), None);
    }

    #[test]
    fn pointer_leave_is_handled_like_a_release() {
        let mut gesture = PressGesture::new();
        let armed = gesture
            .press_start("x", PressOrigin::Item, 0)
            .expect("press armed");
        gesture.pointer_leave();
        assert_eq!(gesture.timer_elapsed(armed.generation), None);
    }

    #[test]
    fn checkbox_presses_are_ignored_entirely() {
        let mut gesture = PressGesture::new();
        assert_eq!(gesture.press_start("x", PressOrigin::Checkbox, 0), None);
        assert!(!gesture.is_pressing());
    }

    #[test]
    fn a_new_press_supersedes_the_previous_one() {
        let mut gesture = PressGesture::new();
        let first = gesture
            .press_start("x", PressOrigin::Item, 0)
            .expect("press armed");
        let second = gesture
            .press_start("y", PressOrigin::Item, 100)
            .expect("press armed");
        assert_ne!(first.generation, second.generation);

        // The superseded generation can no longer fire.
        assert_eq!(gesture.timer_elapsed(first.generation), None);
        assert_eq!(
            gesture.timer_elapsed(second.generation).as_deref(),
            Some("y")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn press_delay_waits_the_full_threshold() {
        let armed = ArmedPress {
            task_id: "x".to_string(),
            generation: 7,
            deadline: LONG_PRESS_MS,
        };

        let early = tokio::time::timeout(
            Duration::from_millis(LONG_PRESS_MS as u64 - 1),
            press_delay(&armed),
        )
        .await;
        assert!(early.is_err(), "delay must not resolve before the threshold");

        assert_eq!(press_delay(&armed).await, armed.generation);
    }
}
