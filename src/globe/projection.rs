use egui::{Pos2, Rect, pos2};
use geo_types::{Coord, LineString};

/// Degrees of rotation per dragged pixel.
pub const DRAG_SENSITIVITY: f64 = 0.3;
/// Points further than this from the view center are on the hidden hemisphere.
pub const CLIP_ANGLE: f64 = 90.;
/// The globe radius is the smaller side of the view divided by this.
const SCALE_DIVISOR: f32 = 2.2;

/// Rotation of the globe as (lon, lat) in degrees. The point at `(-lon, -lat)` is shown in the
/// center of the view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
  pub lon: f64,
  pub lat: f64,
}

impl Rotation {
  #[must_use]
  pub fn new(lon: f64, lat: f64) -> Self {
    Self { lon, lat }
  }

  /// The rotation that brings `coord` into the center of the view.
  #[must_use]
  pub fn facing(coord: Coord<f64>) -> Self {
    Self {
      lon: -coord.x,
      lat: -coord.y,
    }
  }

  /// Rotation after dragging by `(dx, dy)` pixels from `self`. Dragging down tilts the view up.
  /// Latitude is not clamped.
  #[must_use]
  pub fn dragged(self, dx: f32, dy: f32) -> Self {
    Self {
      lon: self.lon + f64::from(dx) * DRAG_SENSITIVITY,
      lat: self.lat - f64::from(dy) * DRAG_SENSITIVITY,
    }
  }
}

/// An orthographic projection of the rotated globe into a screen rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthographic {
  pub rotation: Rotation,
  scale: f32,
  center: Pos2,
}

impl Orthographic {
  /// Fits the globe into `rect`.
  #[must_use]
  pub fn fit(rect: Rect, rotation: Rotation) -> Self {
    Self {
      rotation,
      scale: rect.width().min(rect.height()) / SCALE_DIVISOR,
      center: rect.center(),
    }
  }

  /// Radius of the globe disc in pixels.
  #[must_use]
  pub fn scale(&self) -> f32 {
    self.scale
  }

  #[must_use]
  pub fn center(&self) -> Pos2 {
    self.center
  }

  /// Rotates `coord` into view space, returns (lambda, phi) in radians.
  fn rotate(&self, coord: Coord<f64>) -> (f64, f64) {
    let lambda = (coord.x + self.rotation.lon).to_radians();
    let phi = coord.y.to_radians();
    let (sin_dphi, cos_dphi) = self.rotation.lat.to_radians().sin_cos();

    let cos_phi = phi.cos();
    let x = lambda.cos() * cos_phi;
    let y = lambda.sin() * cos_phi;
    let z = phi.sin();
    let k = z * cos_dphi + x * sin_dphi;
    (y.atan2(x * cos_dphi - z * sin_dphi), k.clamp(-1., 1.).asin())
  }

  /// Projects without clipping. Returns the unit disc position and whether it is visible.
  fn project_unit(&self, coord: Coord<f64>) -> (f64, f64, bool) {
    let (lambda, phi) = self.rotate(coord);
    let cos_phi = phi.cos();
    let visible = cos_phi * lambda.cos() > CLIP_ANGLE.to_radians().cos();
    (cos_phi * lambda.sin(), phi.sin(), visible)
  }

  #[allow(clippy::cast_possible_truncation)]
  fn to_screen(&self, x: f64, y: f64) -> Pos2 {
    pos2(
      self.center.x + x as f32 * self.scale,
      self.center.y - y as f32 * self.scale,
    )
  }

  /// Screen position of `coord`, `None` if it is on the hidden hemisphere.
  #[must_use]
  pub fn project(&self, coord: Coord<f64>) -> Option<Pos2> {
    let (x, y, visible) = self.project_unit(coord);
    visible.then(|| self.to_screen(x, y))
  }

  /// Projects a ring. Hidden vertices are pushed out to the horizon so filled shapes stay within
  /// the globe disc. `None` if no vertex is visible.
  #[must_use]
  pub fn project_ring(&self, ring: &LineString<f64>) -> Option<Vec<Pos2>> {
    let mut any_visible = false;
    let points = ring
      .0
      .iter()
      .map(|c| {
        let (x, y, visible) = self.project_unit(*c);
        any_visible |= visible;
        if visible {
          self.to_screen(x, y)
        } else {
          let len = x.hypot(y);
          if len > f64::EPSILON {
            self.to_screen(x / len, y / len)
          } else {
            self.to_screen(0., 1.)
          }
        }
      })
      .collect();
    any_visible.then_some(points)
  }
}

/// Even-odd test whether `point` lies inside the closed polygon `ring`.
#[must_use]
pub fn contains(ring: &[Pos2], point: Pos2) -> bool {
  if ring.len() < 3 {
    return false;
  }
  let mut inside = false;
  let mut j = ring.len() - 1;
  for i in 0..ring.len() {
    let (a, b) = (ring[i], ring[j]);
    if (a.y > point.y) != (b.y > point.y)
      && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
    {
      inside = !inside;
    }
    j = i;
  }
  inside
}
