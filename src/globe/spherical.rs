use geo_types::{Coord, LineString, Polygon};

/// A point on the unit sphere.
type Vec3 = [f64; 3];

const EPSILON: f64 = 1e-12;

/// Converts a (lon, lat) coordinate in degrees to a unit vector.
#[must_use]
pub fn to_cartesian(coord: Coord<f64>) -> Vec3 {
  let (lon, lat) = (coord.x.to_radians(), coord.y.to_radians());
  let cos_lat = lat.cos();
  [cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin()]
}

/// Converts a direction back to (lon, lat) in degrees. `None` for the null vector.
#[must_use]
pub fn to_lon_lat(v: Vec3) -> Option<Coord<f64>> {
  let norm = length(v);
  if norm < EPSILON {
    return None;
  }
  Some(Coord {
    x: v[1].atan2(v[0]).to_degrees(),
    y: (v[2] / norm).clamp(-1., 1.).asin().to_degrees(),
  })
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
  [
    a[1] * b[2] - a[2] * b[1],
    a[2] * b[0] - a[0] * b[2],
    a[0] * b[1] - a[1] * b[0],
  ]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
  a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn length(v: Vec3) -> f64 {
  dot(v, v).sqrt()
}

fn add(a: Vec3, b: Vec3) -> Vec3 {
  [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scaled(v: Vec3, f: f64) -> Vec3 {
  [v[0] * f, v[1] * f, v[2] * f]
}

/// Twice the vector area of a ring made of great-circle arcs. Its direction is the area weighted
/// centroid of the enclosed cap, its sign depends on the winding.
fn ring_vector_area(ring: &LineString<f64>) -> Vec3 {
  ring
    .0
    .windows(2)
    .map(|w| (to_cartesian(w[0]), to_cartesian(w[1])))
    .fold([0.; 3], |acc, (a, b)| {
      let normal = cross(a, b);
      let sin = length(normal);
      if sin < EPSILON {
        return acc;
      }
      let angle = sin.atan2(dot(a, b));
      add(acc, scaled(normal, angle / sin))
    })
}

fn vertex_sum(polygon: &Polygon<f64>) -> Vec3 {
  polygon
    .exterior()
    .0
    .iter()
    .map(|c| to_cartesian(*c))
    .fold([0.; 3], add)
}

/// Area weighted direction of a polygon, oriented towards its vertices. Holes are wound the
/// other way round and therefore subtract.
fn polygon_direction(polygon: &Polygon<f64>) -> Vec3 {
  let area = polygon
    .interiors()
    .iter()
    .map(ring_vector_area)
    .fold(ring_vector_area(polygon.exterior()), add);

  let vertices = vertex_sum(polygon);
  if length(area) < EPSILON {
    // Degenerate (e.g. a sliver), use the mean of the vertices.
    return vertices;
  }
  if dot(area, vertices) < 0. {
    scaled(area, -1.)
  } else {
    area
  }
}

/// The spherical centroid of a polygon in (lon, lat) degrees.
#[must_use]
pub fn polygon_centroid(polygon: &Polygon<f64>) -> Option<Coord<f64>> {
  to_lon_lat(polygon_direction(polygon))
}

/// The spherical centroid of several polygons taken together.
pub fn polygons_centroid<'a>(polygons: impl IntoIterator<Item = &'a Polygon<f64>>) -> Option<Coord<f64>> {
  to_lon_lat(polygons.into_iter().map(polygon_direction).fold([0.; 3], add))
}
