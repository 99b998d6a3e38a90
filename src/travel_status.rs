use chrono::NaiveDate;
use egui::Color32;

/// Display status of a traveler, derived from the travel dates and the approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelStatus {
  Denied,
  InCountry,
  Upcoming,
  Returned,
}

/// Classifies a trip. The first matching rule wins: unapproved trips are denied regardless of
/// their dates, otherwise `today` is compared against the inclusive `[start, end]` range.
#[must_use]
pub fn classify(start: NaiveDate, end: NaiveDate, approved: bool, today: NaiveDate) -> TravelStatus {
  if !approved {
    TravelStatus::Denied
  } else if start <= today && today <= end {
    TravelStatus::InCountry
  } else if start > today {
    TravelStatus::Upcoming
  } else {
    TravelStatus::Returned
  }
}

/// The local calendar date. Captured once per session and handed around, so that everything
/// shown in one session agrees on what today is.
#[must_use]
pub fn local_today() -> NaiveDate {
  chrono::Local::now().date_naive()
}

impl TravelStatus {
  #[must_use]
  pub fn label(&self) -> &'static str {
    match self {
      TravelStatus::Denied => "● Travel Denied",
      TravelStatus::InCountry => "● In Country",
      TravelStatus::Upcoming => "● Upcoming",
      TravelStatus::Returned => "● Returned",
    }
  }

  #[must_use]
  pub fn color(&self) -> Color32 {
    match self {
      TravelStatus::Denied => Color32::from_rgb(0xe0, 0x4f, 0x4f),
      TravelStatus::InCountry => Color32::from_rgb(0x4c, 0xd1, 0x7a),
      TravelStatus::Upcoming => Color32::from_rgb(0x7e, 0xb8, 0xf7),
      TravelStatus::Returned => Color32::from_rgb(0xa0, 0xb0, 0xc8),
    }
  }
}
