use std::{collections::HashMap, fmt::Display};

use geo_types::{Coord, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use super::spherical::{polygon_centroid, polygons_centroid};

/// Numeric country code of the country whose overseas territory is split off.
pub const OVERSEAS_SOURCE_ID: u32 = 250;
/// Polygons whose centroid lies west of this longitude belong to the overseas territory.
pub const OVERSEAS_SPLIT_LONGITUDE: f64 = -30.;
/// Synthetic id of the split off overseas territory.
pub const OVERSEAS_CODE: &str = "FGU";
/// Display name of the split off overseas territory.
pub const OVERSEAS_NAME: &str = "French Guiana";

/// Shown wherever a feature id cannot be resolved to a name.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Identifies a country feature. World boundary datasets use numeric ISO 3166 codes, often as
/// zero padded strings ("004"), which are normalized to their numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureId {
  Numeric(u32),
  Code(String),
}

impl FeatureId {
  #[must_use]
  pub fn parse(raw: &str) -> Self {
    let raw = raw.trim();
    raw
      .parse::<u32>()
      .map_or_else(|_| Self::Code(raw.to_string()), Self::Numeric)
  }

  #[must_use]
  pub fn overseas() -> Self {
    Self::Code(OVERSEAS_CODE.to_string())
  }
}

impl Display for FeatureId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FeatureId::Numeric(n) => write!(f, "{n:03}"),
      FeatureId::Code(c) => write!(f, "{c}"),
    }
  }
}

/// Country outlines in (lon, lat) degrees.
#[derive(Debug, Clone, PartialEq)]
pub enum CountryGeometry {
  Polygon(Polygon<f64>),
  MultiPolygon(MultiPolygon<f64>),
}

impl CountryGeometry {
  pub fn polygons(&self) -> Box<dyn Iterator<Item = &Polygon<f64>> + '_> {
    match self {
      CountryGeometry::Polygon(p) => Box::new(std::iter::once(p)),
      CountryGeometry::MultiPolygon(m) => Box::new(m.0.iter()),
    }
  }

  /// Spherical centroid of the whole geometry.
  #[must_use]
  pub fn centroid(&self) -> Option<Coord<f64>> {
    polygons_centroid(self.polygons())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
  pub id: FeatureId,
  pub geometry: CountryGeometry,
}

impl CountryFeature {
  #[must_use]
  pub fn new(id: FeatureId, geometry: CountryGeometry) -> Self {
    Self { id, geometry }
  }
}

fn is_overseas(polygon: &Polygon<f64>) -> bool {
  polygon_centroid(polygon).is_some_and(|c| c.x < OVERSEAS_SPLIT_LONGITUDE)
}

/// Splits the overseas territory off its mainland so both can be colored and selected on their
/// own. The mainland keeps the original id, the territory gets [`OVERSEAS_CODE`]. Sides without
/// polygons are dropped, every other feature passes through unchanged and in order.
#[must_use]
pub fn split_overseas_territories(features: Vec<CountryFeature>) -> Vec<CountryFeature> {
  let mut result = Vec::with_capacity(features.len() + 1);
  for feature in features {
    match feature {
      CountryFeature {
        id: id @ FeatureId::Numeric(OVERSEAS_SOURCE_ID),
        geometry: CountryGeometry::MultiPolygon(multi),
      } => {
        let (overseas, mainland): (Vec<_>, Vec<_>) = multi.0.into_iter().partition(is_overseas);
        log::debug!(
          "Split feature {id}: {} mainland and {} overseas polygons",
          mainland.len(),
          overseas.len()
        );
        if !mainland.is_empty() {
          result.push(CountryFeature::new(
            id,
            CountryGeometry::MultiPolygon(MultiPolygon(mainland)),
          ));
        }
        if !overseas.is_empty() {
          result.push(CountryFeature::new(
            FeatureId::overseas(),
            CountryGeometry::MultiPolygon(MultiPolygon(overseas)),
          ));
        }
      }
      other => result.push(other),
    }
  }
  result
}

/// An entry of the country name lookup dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nation {
  #[serde(default)]
  pub ccn3: Option<String>,
  pub name: NationName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationName {
  pub common: String,
}

/// Maps feature ids to display names.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryNames {
  names: HashMap<FeatureId, String>,
}

impl Default for CountryNames {
  fn default() -> Self {
    let mut names = HashMap::new();
    names.insert(FeatureId::overseas(), OVERSEAS_NAME.to_string());
    Self { names }
  }
}

impl CountryNames {
  /// Builds the lookup. Entries without a numeric code are skipped.
  #[must_use]
  pub fn from_nations(nations: Vec<Nation>) -> Self {
    let mut lookup = Self::default();
    for nation in nations {
      match nation.ccn3.as_deref().map(FeatureId::parse) {
        Some(id @ FeatureId::Numeric(_)) => {
          lookup.names.insert(id, nation.name.common);
        }
        _ => log::trace!("Skipping {} without numeric code", nation.name.common),
      }
    }
    lookup
  }

  #[must_use]
  pub fn resolve(&self, id: &FeatureId) -> Option<&str> {
    self.names.get(id).map(String::as_str)
  }

  #[must_use]
  pub fn display_name(&self, id: &FeatureId) -> &str {
    self.resolve(id).unwrap_or(UNKNOWN_COUNTRY)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.names.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}
