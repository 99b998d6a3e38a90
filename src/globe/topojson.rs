//! Decoding of the world boundary dataset, a `TopoJSON` topology whose `countries` object is a
//! collection of (multi) polygons referencing shared, optionally quantized arcs.

use std::collections::HashMap;

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::features::{CountryFeature, CountryGeometry, FeatureId};

/// Name of the object holding the countries in the world-atlas dataset.
pub const COUNTRIES_OBJECT: &str = "countries";

#[derive(Error, Debug)]
pub enum TopoJsonError {
  #[error("Invalid topology: {0}")]
  Invalid(#[from] serde_json::Error),
  #[error("Topology has no object named '{0}'")]
  MissingObject(String),
  #[error("Object '{0}' is not a geometry collection")]
  NotACollection(String),
  #[error("Arc index {0} out of range")]
  ArcOutOfRange(i64),
}

#[derive(Deserialize)]
struct Topology {
  #[serde(default)]
  transform: Option<Transform>,
  objects: HashMap<String, Value>,
  arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Deserialize, Clone, Copy)]
struct Transform {
  scale: [f64; 2],
  translate: [f64; 2],
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
  Polygon {
    arcs: Vec<Vec<i64>>,
    #[serde(default)]
    id: Option<Value>,
  },
  MultiPolygon {
    arcs: Vec<Vec<Vec<i64>>>,
    #[serde(default)]
    id: Option<Value>,
  },
  #[serde(other)]
  Other,
}

/// Arcs in absolute (lon, lat) coordinates.
struct Arcs(Vec<Vec<Coord<f64>>>);

impl Arcs {
  fn decode(raw: Vec<Vec<Vec<f64>>>, transform: Option<Transform>) -> Self {
    let arcs = raw
      .into_iter()
      .map(|arc| {
        let (mut x, mut y) = (0., 0.);
        arc
          .into_iter()
          .filter(|p| p.len() >= 2)
          .map(|p| match transform {
            // Quantized arcs are delta encoded.
            Some(t) => {
              x += p[0];
              y += p[1];
              Coord {
                x: x * t.scale[0] + t.translate[0],
                y: y * t.scale[1] + t.translate[1],
              }
            }
            None => Coord { x: p[0], y: p[1] },
          })
          .collect()
      })
      .collect();
    Self(arcs)
  }

  /// Points of an arc reference. Negative references (`!i`) walk arc `i` backwards.
  fn points(&self, index: i64) -> Result<Vec<Coord<f64>>, TopoJsonError> {
    let (i, reversed) = if index < 0 { (!index, true) } else { (index, false) };
    let arc = usize::try_from(i)
      .ok()
      .and_then(|i| self.0.get(i))
      .ok_or(TopoJsonError::ArcOutOfRange(index))?;
    let mut points = arc.clone();
    if reversed {
      points.reverse();
    }
    Ok(points)
  }

  fn ring(&self, refs: &[i64]) -> Result<LineString<f64>, TopoJsonError> {
    let mut ring: Vec<Coord<f64>> = Vec::new();
    for &r in refs {
      let points = self.points(r)?;
      // Consecutive arcs share their end and start point.
      if !ring.is_empty() {
        ring.pop();
      }
      ring.extend(points);
    }
    Ok(LineString(ring))
  }

  fn polygon(&self, rings: &[Vec<i64>]) -> Result<Option<Polygon<f64>>, TopoJsonError> {
    let mut rings = rings.iter().map(|r| self.ring(r));
    let Some(exterior) = rings.next().transpose()? else {
      return Ok(None);
    };
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Polygon::new(exterior, interiors)))
  }
}

fn feature_id(id: Option<&Value>) -> Option<FeatureId> {
  match id? {
    Value::String(s) => Some(FeatureId::parse(s)),
    Value::Number(n) => n
      .as_u64()
      .and_then(|n| u32::try_from(n).ok())
      .map(FeatureId::Numeric),
    _ => None,
  }
}

fn decode_geometry(arcs: &Arcs, geometry: Value) -> Result<Option<CountryFeature>, TopoJsonError> {
  let feature = match serde_json::from_value(geometry)? {
    TopoGeometry::Polygon { arcs: rings, id } => {
      let id = feature_id(id.as_ref());
      arcs
        .polygon(&rings)?
        .zip(id)
        .map(|(p, id)| CountryFeature::new(id, CountryGeometry::Polygon(p)))
    }
    TopoGeometry::MultiPolygon { arcs: polygons, id } => {
      let polygons = polygons
        .iter()
        .filter_map(|rings| arcs.polygon(rings).transpose())
        .collect::<Result<Vec<_>, _>>()?;
      feature_id(id.as_ref())
        .map(|id| CountryFeature::new(id, CountryGeometry::MultiPolygon(MultiPolygon(polygons))))
    }
    TopoGeometry::Other => None,
  };
  Ok(feature)
}

/// Decodes all polygonal geometries of `object` into country features, in dataset order.
/// Geometries that cannot be decoded or have no id are skipped with a warning.
pub fn decode_features(json: &str, object: &str) -> Result<Vec<CountryFeature>, TopoJsonError> {
  let mut topology: Topology = serde_json::from_str(json)?;
  let collection = topology
    .objects
    .remove(object)
    .ok_or_else(|| TopoJsonError::MissingObject(object.to_string()))?;
  let Some(Value::Array(geometries)) = collection.get("geometries").cloned() else {
    return Err(TopoJsonError::NotACollection(object.to_string()));
  };

  let arcs = Arcs::decode(topology.arcs, topology.transform);
  let mut features = Vec::with_capacity(geometries.len());
  for geometry in geometries {
    match decode_geometry(&arcs, geometry) {
      Ok(Some(feature)) => features.push(feature),
      Ok(None) => {}
      Err(e) => log::warn!("Error decoding country geometry: {e}"),
    }
  }
  log::info!("Decoded {} country features", features.len());
  Ok(features)
}
