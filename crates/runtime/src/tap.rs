use foundation::time::Time;
use tracing::trace;

/// Longest press, in seconds, still treated as a click rather than a drag.
pub const DEFAULT_TAP_THRESHOLD_S: f64 = 0.2;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TapOutcome {
    /// Released within the threshold.
    Tap { held_s: f64 },
    /// Held at least the threshold; the pointer was probably orbiting the camera.
    Drag { held_s: f64 },
    /// Release without a matching press.
    Unpaired,
}

impl TapOutcome {
    pub fn is_tap(self) -> bool {
        matches!(self, TapOutcome::Tap { .. })
    }
}

/// Distinguishes clicks from drags by press duration.
///
/// Holds at most one pending press; every press pairs with exactly one release.
#[derive(Debug, Clone, PartialEq)]
pub struct TapDetector {
    threshold_s: f64,
    pressed_at: Option<Time>,
}

impl Default for TapDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TAP_THRESHOLD_S)
    }
}

impl TapDetector {
    pub fn new(threshold_s: f64) -> Self {
        Self {
            threshold_s,
            pressed_at: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Records a press. A second press before release restarts the timer.
    pub fn press(&mut self, at: Time) {
        self.pressed_at = Some(at);
    }

    pub fn release(&mut self, at: Time) -> TapOutcome {
        let Some(down) = self.pressed_at.take() else {
            return TapOutcome::Unpaired;
        };
        let held_s = at.since(down).max(0.0);
        let outcome = if held_s < self.threshold_s {
            TapOutcome::Tap { held_s }
        } else {
            TapOutcome::Drag { held_s }
        };
        trace!(held_s, threshold_s = self.threshold_s, ?outcome, "pointer released");
        outcome
    }

    /// Drops any pending press (pointer left the canvas, gesture cancelled).
    pub fn cancel(&mut self) {
        self.pressed_at = None;
    }
}
