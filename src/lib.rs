/// Clients of the traveler backend and the geo datasets.
pub mod api;
pub mod config;
/// The globe and everything drawn on it.
pub mod globe;
/// The app window.
pub mod globe_ui;
pub mod loader;
/// Traveler counts per country.
pub mod metrics;
/// The side panel listing the travelers of a country.
pub mod panel;
pub mod travel_status;
pub mod traveler;
