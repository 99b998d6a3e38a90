use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::travel_status::{TravelStatus, classify};

/// Treats `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryContact {
  #[serde(deserialize_with = "nullable")]
  pub label: String,
  #[serde(deserialize_with = "nullable")]
  pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonContact {
  #[serde(deserialize_with = "nullable")]
  pub name: String,
  #[serde(deserialize_with = "nullable")]
  pub phone: String,
  #[serde(deserialize_with = "nullable")]
  pub relationship: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contacts {
  #[serde(deserialize_with = "nullable")]
  pub primary: PrimaryContact,
  #[serde(deserialize_with = "nullable")]
  pub secondary: PersonContact,
  #[serde(deserialize_with = "nullable")]
  pub emergency: PersonContact,
}

/// A traveler as delivered by `/api/travelers/{country}`. Only the travel dates are required,
/// everything else falls back to empty values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerRecord {
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(default, deserialize_with = "nullable")]
  pub first_name: String,
  #[serde(default, deserialize_with = "nullable")]
  pub last_name: String,
  #[serde(default, deserialize_with = "nullable")]
  pub country: String,
  pub travel_start: NaiveDate,
  pub travel_end: NaiveDate,
  #[serde(default, deserialize_with = "nullable")]
  pub passport_number: String,
  #[serde(default, deserialize_with = "nullable")]
  pub travel_approved: bool,
  #[serde(default, deserialize_with = "nullable")]
  pub itinerary_link: String,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub contacts: Contacts,
}

impl TravelerRecord {
  #[must_use]
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
      .trim()
      .to_string()
  }

  #[must_use]
  pub fn status(&self, today: NaiveDate) -> TravelStatus {
    classify(
      self.travel_start,
      self.travel_end,
      self.travel_approved,
      today,
    )
  }

  #[must_use]
  pub fn itinerary(&self) -> Option<&str> {
    let link = self.itinerary_link.trim();
    (!link.is_empty()).then_some(link)
  }
}
