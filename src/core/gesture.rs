use crate::config::GestureSettings;
use crate::models::SwipeDecision;

/// In-progress classification of a dragged card, for rendering affordances
/// (the "VIBE"/"PASS" stamps fade in before the commit point).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lean {
    Toward(SwipeDecision),
    Neutral,
}

/// Converts a continuous horizontal drag plus release velocity into a
/// discrete swipe decision
///
/// Pure classification, decoupled from animation callbacks: `lean` is
/// called continuously while the drag is live, `resolve` exactly once at
/// release. A release that resolves to `None` must leave queue and match
/// state untouched; the card returns to rest.
#[derive(Debug, Clone, Copy)]
pub struct GestureResolver {
    distance_threshold: f64,
    velocity_threshold: f64,
}

impl GestureResolver {
    pub fn new(distance_threshold: f64, velocity_threshold: f64) -> Self {
        Self {
            distance_threshold,
            velocity_threshold,
        }
    }

    pub fn from_settings(settings: &GestureSettings) -> Self {
        Self::new(settings.distance_threshold, settings.velocity_threshold)
    }

    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    /// Classify the in-progress state of a live drag
    ///
    /// The affordance lights up at half the commit threshold so the user
    /// sees where the card is heading before the decision locks in.
    pub fn lean(&self, dx: f64) -> Lean {
        let onset = self.distance_threshold * 0.5;
        if dx > onset {
            Lean::Toward(SwipeDecision::Accept)
        } else if dx < -onset {
            Lean::Toward(SwipeDecision::Reject)
        } else {
            Lean::Neutral
        }
    }

    /// Classify the terminal state of a released gesture
    ///
    /// Displacement past the threshold commits in that direction; failing
    /// that, a fast enough fling commits by velocity sign. Anything else
    /// is undecided.
    pub fn resolve(&self, dx: f64, vx: f64) -> Option<SwipeDecision> {
        if dx > self.distance_threshold {
            return Some(SwipeDecision::Accept);
        }
        if dx < -self.distance_threshold {
            return Some(SwipeDecision::Reject);
        }
        if vx.abs() > self.velocity_threshold {
            return Some(if vx > 0.0 {
                SwipeDecision::Accept
            } else {
                SwipeDecision::Reject
            });
        }
        None
    }
}

impl Default for GestureResolver {
    fn default() -> Self {
        Self::from_settings(&GestureSettings::default())
    }
}
