use std::collections::HashMap;

use egui::Color32;
use log::{error, info};

use crate::api::{CountryCount, TravelApi};

/// Traveler counts of a single country.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountryMetric {
  /// Travelers in the country today.
  pub current: u32,
  /// Travelers with approved trips that have not started yet.
  pub planned: u32,
}

/// Traveler counts keyed by country display name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryMetricStore {
  metrics: HashMap<String, CountryMetric>,
}

impl CountryMetricStore {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn from_counts(counts: impl IntoIterator<Item = CountryCount>) -> Self {
    Self {
      metrics: counts
        .into_iter()
        .map(|c| {
          (
            c.country,
            CountryMetric {
              current: c.current,
              planned: c.planned,
            },
          )
        })
        .collect(),
    }
  }

  /// Fetches the counts once. A failed fetch leaves the store empty and is not retried.
  pub async fn load(&mut self, api: &dyn TravelApi) {
    match api.countries().await {
      Ok(counts) => {
        *self = Self::from_counts(counts);
        info!("Loaded traveler counts for {} countries", self.len());
      }
      Err(e) => {
        error!("Failed to load traveler counts: {e}");
        self.metrics.clear();
      }
    }
  }

  /// Counts of `country`, zero for countries without travelers.
  #[must_use]
  pub fn lookup(&self, country: &str) -> CountryMetric {
    self.metrics.get(country).copied().unwrap_or_default()
  }

  #[must_use]
  pub fn bucket(&self, country: &str) -> ColorBucket {
    ColorBucket::from_current(self.lookup(country).current)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.metrics.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.metrics.is_empty()
  }
}

/// Fill category of a country, only depends on the current traveler count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorBucket {
  Zero,
  One,
  Two,
  Three,
  Four,
  FivePlus,
}

impl ColorBucket {
  #[must_use]
  pub fn from_current(current: u32) -> Self {
    match current {
      0 => Self::Zero,
      1 => Self::One,
      2 => Self::Two,
      3 => Self::Three,
      4 => Self::Four,
      _ => Self::FivePlus,
    }
  }

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      Self::Zero => "0",
      Self::One => "1",
      Self::Two => "2",
      Self::Three => "3",
      Self::Four => "4",
      Self::FivePlus => "5plus",
    }
  }

  #[must_use]
  pub fn class_name(self) -> String {
    format!("country-{}", self.label())
  }

  #[must_use]
  pub fn fill_color(self) -> Color32 {
    match self {
      Self::Zero => Color32::from_rgb(0x1e, 0x3a, 0x5f),
      Self::One => Color32::from_rgb(0x2e, 0x7d, 0x6b),
      Self::Two => Color32::from_rgb(0x5a, 0xa3, 0x4a),
      Self::Three => Color32::from_rgb(0xc9, 0xb0, 0x37),
      Self::Four => Color32::from_rgb(0xe0, 0x7b, 0x39),
      Self::FivePlus => Color32::from_rgb(0xd6, 0x45, 0x45),
    }
  }
}

#[cfg(test)]
pub(crate) mod test_utils {
  use std::sync::Mutex;

  use crate::{
    api::{ApiError, CountryCount, TravelApi},
    traveler::TravelerRecord,
  };

  /// In-memory backend. Counts the requests it served.
  #[derive(Default)]
  pub struct FakeApi {
    pub counts: Option<Vec<CountryCount>>,
    pub travelers: Option<Vec<TravelerRecord>>,
    pub requests: Mutex<Vec<String>>,
  }

  impl FakeApi {
    pub fn with_counts(counts: &[(&str, u32, u32)]) -> Self {
      Self {
        counts: Some(
          counts
            .iter()
            .map(|(country, current, planned)| CountryCount {
              country: (*country).to_string(),
              current: *current,
              planned: *planned,
            })
            .collect(),
        ),
        travelers: Some(Vec::new()),
        ..Self::default()
      }
    }

    pub fn with_travelers(mut self, travelers: Vec<TravelerRecord>) -> Self {
      self.travelers = Some(travelers);
      self
    }

    pub fn failing() -> Self {
      Self::default()
    }

    pub fn request_count(&self) -> usize {
      self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
  }

  fn unavailable(url: &str) -> ApiError {
    ApiError::Status {
      url: url.to_string(),
      status: 503,
    }
  }

  #[async_trait::async_trait]
  impl TravelApi for FakeApi {
    async fn countries(&self) -> Result<Vec<CountryCount>, ApiError> {
      self.requests.lock().unwrap().push("/api/countries".to_string());
      self.counts.clone().ok_or_else(|| unavailable("/api/countries"))
    }

    async fn travelers(&self, country: &str) -> Result<Vec<TravelerRecord>, ApiError> {
      let url = format!("/api/travelers/{country}");
      self.requests.lock().unwrap().push(url.clone());
      let travelers = self.travelers.as_ref().ok_or_else(|| unavailable(&url))?;
      Ok(
        travelers
          .iter()
          .filter(|t| t.country == country)
          .cloned()
          .collect(),
      )
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{test_utils::FakeApi, *};
  use futures::executor::block_on;
  use rstest::rstest;

  #[rstest]
  #[case(0, "0")]
  #[case(1, "1")]
  #[case(2, "2")]
  #[case(3, "3")]
  #[case(4, "4")]
  #[case(5, "5plus")]
  #[case(100, "5plus")]
  fn buckets(#[case] current: u32, #[case] expected: &str) {
    assert_eq!(ColorBucket::from_current(current).label(), expected);
  }

  #[test]
  fn bucket_ignores_planned() {
    let store = CountryMetricStore::from_counts([CountryCount {
      country: "Kenya".to_string(),
      current: 0,
      planned: 42,
    }]);
    assert_eq!(store.bucket("Kenya"), ColorBucket::Zero);
    assert_eq!(store.bucket("Kenya").class_name(), "country-0");
  }

  #[test]
  fn unknown_country_is_zero() {
    let store = CountryMetricStore::new();
    assert_eq!(store.lookup("Atlantis"), CountryMetric::default());
    assert_eq!(store.bucket("Atlantis"), ColorBucket::Zero);
  }

  #[test]
  fn load_replaces_the_whole_map() {
    let mut store = CountryMetricStore::from_counts([CountryCount {
      country: "Chile".to_string(),
      current: 1,
      planned: 1,
    }]);
    let api = FakeApi::with_counts(&[("Kenya", 3, 1), ("Peru", 7, 0)]);
    block_on(store.load(&api));

    assert_eq!(api.request_count(), 1);
    assert_eq!(store.len(), 2);
    assert_eq!(store.lookup("Chile"), CountryMetric::default());
    assert_eq!(
      store.lookup("Kenya"),
      CountryMetric {
        current: 3,
        planned: 1
      }
    );
    assert_eq!(store.bucket("Peru"), ColorBucket::FivePlus);
  }

  #[test]
  fn failed_load_leaves_an_empty_store() {
    let mut store = CountryMetricStore::new();
    let api = FakeApi::failing();
    block_on(store.load(&api));

    assert_eq!(api.request_count(), 1);
    assert!(store.is_empty());
    assert_eq!(store.bucket("Kenya"), ColorBucket::Zero);
  }

  #[test]
  fn bucket_colors_differ() {
    let colors = [0, 1, 2, 3, 4, 5].map(|c| ColorBucket::from_current(c).fill_color());
    for (i, a) in colors.iter().enumerate() {
      for b in &colors[i + 1..] {
        assert_ne!(a, b);
      }
    }
  }
}
