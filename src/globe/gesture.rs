//! Tells clicks from drags.
//!
//! ```text
//!   Idle --down--> Armed --move > 2px--> Dragging
//!    ^               |                     |
//!    +------up-------+---------up----------+  (clicks suppressed for 50ms)
//! ```

use std::time::{Duration, Instant};

use egui::Pos2;

use super::projection::Rotation;

/// Movement in pixels along either axis after which a press becomes a drag.
pub const DRAG_THRESHOLD: f32 = 2.;
/// Clicks arriving this soon after a drag ended are ignored.
pub const CLICK_COOLDOWN: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
  #[default]
  Idle,
  Armed {
    start: Pos2,
    start_rotation: Rotation,
  },
  Dragging {
    start: Pos2,
    start_rotation: Rotation,
  },
}

/// What the globe has to do after a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
  None,
  /// A new gesture takes over the rotation from a running animation.
  CancelAnimation,
  Rotate(Rotation),
}

#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
  state: GestureState,
  suppress_clicks_until: Option<Instant>,
}

impl GestureTracker {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn state(&self) -> GestureState {
    self.state
  }

  #[must_use]
  pub fn is_dragging(&self) -> bool {
    matches!(self.state, GestureState::Dragging { .. })
  }

  #[must_use]
  pub fn is_active(&self) -> bool {
    self.state != GestureState::Idle
  }

  pub fn pointer_down(&mut self, pos: Pos2, rotation: Rotation) -> GestureEffect {
    self.state = GestureState::Armed {
      start: pos,
      start_rotation: rotation,
    };
    self.suppress_clicks_until = None;
    GestureEffect::CancelAnimation
  }

  /// The rotation is always derived from the press position and the rotation at that time.
  pub fn pointer_move(&mut self, pos: Pos2) -> GestureEffect {
    match self.state {
      GestureState::Idle => GestureEffect::None,
      GestureState::Armed {
        start,
        start_rotation,
      } => {
        let delta = pos - start;
        if delta.x.abs() > DRAG_THRESHOLD || delta.y.abs() > DRAG_THRESHOLD {
          log::trace!("Drag started at {start:?}");
          self.state = GestureState::Dragging {
            start,
            start_rotation,
          };
          GestureEffect::Rotate(start_rotation.dragged(delta.x, delta.y))
        } else {
          GestureEffect::None
        }
      }
      GestureState::Dragging {
        start,
        start_rotation,
      } => {
        let delta = pos - start;
        GestureEffect::Rotate(start_rotation.dragged(delta.x, delta.y))
      }
    }
  }

  pub fn pointer_up(&mut self, now: Instant) {
    if self.is_dragging() {
      self.suppress_clicks_until = Some(now + CLICK_COOLDOWN);
    }
    self.state = GestureState::Idle;
  }

  /// Whether a click at `now` selects something.
  #[must_use]
  pub fn click_allowed(&self, now: Instant) -> bool {
    !self.is_dragging() && self.suppress_clicks_until.is_none_or(|until| now >= until)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;
  use egui::pos2;

  #[test]
  fn press_and_release_in_place_is_a_click() {
    let now = Instant::now();
    let mut tracker = GestureTracker::new();

    assert_eq!(
      tracker.pointer_down(pos2(100., 100.), Rotation::default()),
      GestureEffect::CancelAnimation
    );
    assert!(matches!(tracker.state(), GestureState::Armed { .. }));
    assert_eq!(tracker.pointer_move(pos2(100., 100.)), GestureEffect::None);
    tracker.pointer_up(now);

    assert_eq!(tracker.state(), GestureState::Idle);
    assert!(tracker.click_allowed(now));
  }

  #[test]
  fn small_jitter_is_still_a_click() {
    let now = Instant::now();
    let mut tracker = GestureTracker::new();
    tracker.pointer_down(pos2(100., 100.), Rotation::default());
    assert_eq!(tracker.pointer_move(pos2(102., 98.)), GestureEffect::None);
    tracker.pointer_up(now);
    assert!(tracker.click_allowed(now));
  }

  #[test]
  fn drag_suppresses_the_click_of_its_release() {
    let now = Instant::now();
    let mut tracker = GestureTracker::new();
    tracker.pointer_down(pos2(100., 100.), Rotation::default());
    let effect = tracker.pointer_move(pos2(105., 105.));
    assert!(matches!(effect, GestureEffect::Rotate(_)));
    assert!(tracker.is_dragging());
    assert!(!tracker.click_allowed(now));

    tracker.pointer_up(now);
    assert!(!tracker.is_dragging());
    assert!(!tracker.click_allowed(now));
    assert!(!tracker.click_allowed(now + Duration::from_millis(20)));
    assert!(tracker.click_allowed(now + CLICK_COOLDOWN));
  }

  #[test]
  fn rotation_is_computed_from_the_anchor() {
    let mut tracker = GestureTracker::new();
    tracker.pointer_down(pos2(0., 0.), Rotation::new(10., 0.));
    let _ = tracker.pointer_move(pos2(10., 0.));
    let GestureEffect::Rotate(rotation) = tracker.pointer_move(pos2(20., -10.)) else {
      panic!("expected rotation");
    };
    assert_approx_eq!(rotation.lon, 16.);
    assert_approx_eq!(rotation.lat, 3.);
  }

  #[test]
  fn new_press_clears_the_cooldown() {
    let now = Instant::now();
    let mut tracker = GestureTracker::new();
    tracker.pointer_down(pos2(0., 0.), Rotation::default());
    let _ = tracker.pointer_move(pos2(50., 0.));
    tracker.pointer_up(now);

    tracker.pointer_down(pos2(0., 0.), Rotation::default());
    tracker.pointer_up(now);
    assert!(tracker.click_allowed(now));
  }

  #[test]
  fn moves_without_press_do_nothing() {
    let mut tracker = GestureTracker::new();
    assert_eq!(tracker.pointer_move(pos2(50., 50.)), GestureEffect::None);
    assert!(!tracker.is_active());
  }
}
