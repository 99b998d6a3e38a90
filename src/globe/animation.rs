use std::time::{Duration, Instant};

use super::projection::Rotation;

/// Duration of a fly-to animation.
pub const FLY_TO_DURATION: Duration = Duration::from_millis(800);

/// Cubic ease-in-out on `t` in `[0, 1]`.
#[must_use]
pub fn ease_cubic_in_out(t: f64) -> f64 {
  let t = t.clamp(0., 1.) * 2.;
  if t <= 1. {
    t * t * t / 2.
  } else {
    let t = t - 2.;
    (t * t * t + 2.) / 2.
  }
}

/// Interpolation of the rotation from `from` to `to`. Both components are interpolated
/// independently, so a fly-to may take the long way round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyTo {
  from: Rotation,
  to: Rotation,
  duration: Duration,
}

impl FlyTo {
  #[must_use]
  pub fn new(from: Rotation, to: Rotation) -> Self {
    Self {
      from,
      to,
      duration: FLY_TO_DURATION,
    }
  }

  #[must_use]
  pub fn with_duration(mut self, duration: Duration) -> Self {
    self.duration = duration;
    self
  }

  #[must_use]
  pub fn target(&self) -> Rotation {
    self.to
  }

  /// The rotation `elapsed` after the start.
  #[must_use]
  pub fn rotation_at(&self, elapsed: Duration) -> Rotation {
    if self.is_finished(elapsed) {
      return self.to;
    }
    let t = ease_cubic_in_out(elapsed.as_secs_f64() / self.duration.as_secs_f64());
    Rotation {
      lon: self.from.lon + (self.to.lon - self.from.lon) * t,
      lat: self.from.lat + (self.to.lat - self.from.lat) * t,
    }
  }

  #[must_use]
  pub fn is_finished(&self, elapsed: Duration) -> bool {
    elapsed >= self.duration
  }
}

/// A [`FlyTo`] started at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningFlyTo {
  fly_to: FlyTo,
  started_at: Instant,
}

impl RunningFlyTo {
  #[must_use]
  pub fn start(fly_to: FlyTo, now: Instant) -> Self {
    Self {
      fly_to,
      started_at: now,
    }
  }

  /// The rotation at `now` and whether the animation is over.
  #[must_use]
  pub fn sample(&self, now: Instant) -> (Rotation, bool) {
    let elapsed = now.saturating_duration_since(self.started_at);
    (
      self.fly_to.rotation_at(elapsed),
      self.fly_to.is_finished(elapsed),
    )
  }
}
