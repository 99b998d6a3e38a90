use std::collections::HashSet;

use chrono::NaiveDate;
use log::{debug, error};

use crate::{
  api::ApiError,
  metrics::{CountryMetric, CountryMetricStore},
  travel_status::TravelStatus,
  traveler::TravelerRecord,
};

pub mod ui;

/// Identifies a traveler request. Only the response to the latest one is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
  #[must_use]
  pub fn next(self) -> Self {
    Self(self.0 + 1)
  }
}

/// Whether travelers whose trip is over are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnedPolicy {
  #[default]
  Hide,
  Show,
}

/// Travelers of a country grouped by their status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelerGroups {
  pub current: Vec<TravelerRecord>,
  pub upcoming: Vec<TravelerRecord>,
  pub denied: Vec<TravelerRecord>,
  /// Always empty with [`ReturnedPolicy::Hide`].
  pub returned: Vec<TravelerRecord>,
}

impl TravelerGroups {
  /// Groups `records` by their status on `today`, keeping the order within each group.
  #[must_use]
  pub fn partition(records: Vec<TravelerRecord>, today: NaiveDate, policy: ReturnedPolicy) -> Self {
    let mut groups = Self::default();
    for record in records {
      match record.status(today) {
        TravelStatus::InCountry => groups.current.push(record),
        TravelStatus::Upcoming => groups.upcoming.push(record),
        TravelStatus::Denied => groups.denied.push(record),
        TravelStatus::Returned => {
          if policy == ReturnedPolicy::Show {
            groups.returned.push(record);
          }
        }
      }
    }
    groups
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.current.is_empty()
      && self.upcoming.is_empty()
      && self.denied.is_empty()
      && self.returned.is_empty()
  }

  #[must_use]
  pub fn section(&self, kind: SectionKind) -> &[TravelerRecord] {
    match kind {
      SectionKind::Upcoming => &self.upcoming,
      SectionKind::Denied => &self.denied,
      SectionKind::Returned => &self.returned,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelBody {
  #[default]
  Loading,
  NoRecords,
  Travelers(TravelerGroups),
}

/// The collapsible sections below the current travelers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
  Upcoming,
  Denied,
  Returned,
}

impl SectionKind {
  pub const ALL: [SectionKind; 3] = [Self::Upcoming, Self::Denied, Self::Returned];

  #[must_use]
  pub fn title(self) -> &'static str {
    match self {
      Self::Upcoming => "Upcoming Travel",
      Self::Denied => "Travel Denied",
      Self::Returned => "Returned",
    }
  }
}

/// State of the side panel showing the travelers of the selected country.
#[derive(Debug, Clone)]
pub struct DetailPanel {
  visible: bool,
  country: String,
  metric: CountryMetric,
  body: PanelBody,
  expanded: HashSet<SectionKind>,
  latest: RequestToken,
  today: NaiveDate,
  policy: ReturnedPolicy,
}

impl DetailPanel {
  #[must_use]
  pub fn new(today: NaiveDate, policy: ReturnedPolicy) -> Self {
    Self {
      visible: false,
      country: String::new(),
      metric: CountryMetric::default(),
      body: PanelBody::Loading,
      expanded: HashSet::new(),
      latest: RequestToken::default(),
      today,
      policy,
    }
  }

  /// Shows `country` with its counts and starts waiting for its travelers. The caller fetches
  /// the travelers and hands them to [`Self::apply`] together with the returned token.
  pub fn open(&mut self, country: &str, metrics: &CountryMetricStore) -> RequestToken {
    self.latest = self.latest.next();
    self.visible = true;
    self.country = country.to_string();
    self.metric = metrics.lookup(country);
    self.body = PanelBody::Loading;
    self.expanded.clear();
    debug!("Opened panel for {country} ({:?})", self.latest);
    self.latest
  }

  /// Applies a traveler response. Returns `false` if it was dropped because a newer request was
  /// issued in the meantime. A failed request leaves the panel loading.
  pub fn apply(
    &mut self,
    token: RequestToken,
    result: Result<Vec<TravelerRecord>, ApiError>,
  ) -> bool {
    if token != self.latest {
      debug!("Dropping stale traveler response {token:?}, latest is {:?}", self.latest);
      return false;
    }
    match result {
      Ok(records) => {
        let groups = TravelerGroups::partition(records, self.today, self.policy);
        self.body = if groups.is_empty() {
          PanelBody::NoRecords
        } else {
          PanelBody::Travelers(groups)
        };
      }
      Err(e) => error!("Failed to load travelers of {}: {e}", self.country),
    }
    true
  }

  pub fn close(&mut self) {
    self.visible = false;
  }

  pub fn toggle(&mut self, section: SectionKind) {
    if !self.expanded.remove(&section) {
      self.expanded.insert(section);
    }
  }

  #[must_use]
  pub fn is_expanded(&self, section: SectionKind) -> bool {
    self.expanded.contains(&section)
  }

  #[must_use]
  pub fn is_visible(&self) -> bool {
    self.visible
  }

  #[must_use]
  pub fn country(&self) -> &str {
    &self.country
  }

  #[must_use]
  pub fn metric(&self) -> CountryMetric {
    self.metric
  }

  #[must_use]
  pub fn body(&self) -> &PanelBody {
    &self.body
  }

  #[must_use]
  pub fn today(&self) -> NaiveDate {
    self.today
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{api::CountryCount, traveler::test_utils::traveler};

  fn today() -> NaiveDate {
    "2024-06-15".parse().unwrap()
  }

  fn records() -> Vec<TravelerRecord> {
    vec![
      traveler("Ana", "2024-06-01", "2024-06-30", true),
      traveler("Ben", "2024-07-01", "2024-07-10", true),
      traveler("Cai", "2024-06-01", "2024-06-30", false),
      traveler("Dee", "2024-05-01", "2024-05-10", true),
      traveler("Eli", "2024-08-01", "2024-08-03", true),
    ]
  }

  fn names(records: &[TravelerRecord]) -> Vec<&str> {
    records.iter().map(|r| r.first_name.as_str()).collect()
  }

  fn metrics() -> CountryMetricStore {
    CountryMetricStore::from_counts([CountryCount {
      country: "Kenya".to_string(),
      current: 1,
      planned: 2,
    }])
  }

  #[test]
  fn partition_hides_returned_by_default() {
    let groups = TravelerGroups::partition(records(), today(), ReturnedPolicy::Hide);
    assert_eq!(names(&groups.current), ["Ana"]);
    assert_eq!(names(&groups.upcoming), ["Ben", "Eli"]);
    assert_eq!(names(&groups.denied), ["Cai"]);
    assert!(groups.returned.is_empty());
  }

  #[test]
  fn partition_can_show_returned() {
    let groups = TravelerGroups::partition(records(), today(), ReturnedPolicy::Show);
    assert_eq!(names(groups.section(SectionKind::Returned)), ["Dee"]);
  }

  #[test]
  fn open_shows_counts_and_loads() {
    let mut panel = DetailPanel::new(today(), ReturnedPolicy::Hide);
    assert!(!panel.is_visible());

    panel.open("Kenya", &metrics());
    assert!(panel.is_visible());
    assert_eq!(panel.country(), "Kenya");
    assert_eq!(
      panel.metric(),
      CountryMetric {
        current: 1,
        planned: 2
      }
    );
    assert_eq!(panel.body(), &PanelBody::Loading);
  }

  #[test]
  fn only_returned_travelers_means_no_records() {
    let mut panel = DetailPanel::new(today(), ReturnedPolicy::Hide);
    let token = panel.open("Kenya", &metrics());
    let returned = vec![traveler("Dee", "2024-05-01", "2024-05-10", true)];
    assert!(panel.apply(token, Ok(returned)));
    assert_eq!(panel.body(), &PanelBody::NoRecords);

    let token = panel.open("Kenya", &metrics());
    assert!(panel.apply(token, Ok(Vec::new())));
    assert_eq!(panel.body(), &PanelBody::NoRecords);
  }

  #[test]
  fn stale_responses_are_dropped() {
    let mut panel = DetailPanel::new(today(), ReturnedPolicy::Hide);
    let first = panel.open("Kenya", &metrics());
    let second = panel.open("Peru", &metrics());
    assert!(second > first);

    assert!(!panel.apply(first, Ok(records())));
    assert_eq!(panel.body(), &PanelBody::Loading);

    assert!(panel.apply(second, Ok(Vec::new())));
    assert_eq!(panel.country(), "Peru");
    assert_eq!(panel.body(), &PanelBody::NoRecords);
  }

  #[test]
  fn failed_request_keeps_loading() {
    let mut panel = DetailPanel::new(today(), ReturnedPolicy::Hide);
    let token = panel.open("Kenya", &metrics());
    let error = ApiError::Status {
      url: "/api/travelers/Kenya".to_string(),
      status: 500,
    };
    assert!(panel.apply(token, Err(error)));
    assert_eq!(panel.body(), &PanelBody::Loading);
  }

  #[test]
  fn sections_toggle_independently_and_reset_on_open() {
    let mut panel = DetailPanel::new(today(), ReturnedPolicy::Hide);
    panel.open("Kenya", &metrics());
    assert!(!panel.is_expanded(SectionKind::Upcoming));

    panel.toggle(SectionKind::Upcoming);
    assert!(panel.is_expanded(SectionKind::Upcoming));
    assert!(!panel.is_expanded(SectionKind::Denied));

    panel.toggle(SectionKind::Denied);
    panel.toggle(SectionKind::Upcoming);
    assert!(!panel.is_expanded(SectionKind::Upcoming));
    assert!(panel.is_expanded(SectionKind::Denied));

    panel.open("Peru", &metrics());
    assert!(!panel.is_expanded(SectionKind::Denied));
  }

  #[test]
  fn response_after_close_still_lands() {
    let mut panel = DetailPanel::new(today(), ReturnedPolicy::Hide);
    let token = panel.open("Kenya", &metrics());
    panel.close();
    assert!(!panel.is_visible());
    assert!(panel.apply(token, Ok(records())));
    assert!(matches!(panel.body(), PanelBody::Travelers(_)));
  }
}
