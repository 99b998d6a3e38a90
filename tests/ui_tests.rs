use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use eframe::App;
use egui::{Event, Modifiers, PointerButton, Pos2, pos2, vec2};
use egui_kittest::Harness;
use egui_kittest::kittest::Queryable;
use geo_types::polygon;
use travelglobe::{
  api::{ApiError, CountryCount, GeoSource, TravelApi},
  globe::features::{CountryFeature, CountryGeometry, FeatureId, Nation, NationName},
  globe_ui::GlobeApp,
  loader::Loader,
  panel::{PanelBody, ReturnedPolicy},
  traveler::TravelerRecord,
};

struct FakeBackend {
  pending: bool,
}

fn record(first_name: &str, start: &str, end: &str, approved: bool) -> TravelerRecord {
  serde_json::from_value(serde_json::json!({
    "first_name": first_name,
    "last_name": "Doe",
    "country": "Kenya",
    "travel_start": start,
    "travel_end": end,
    "travel_approved": approved,
    "passport_number": "P123",
  }))
  .unwrap()
}

#[async_trait::async_trait]
impl TravelApi for FakeBackend {
  async fn countries(&self) -> Result<Vec<CountryCount>, ApiError> {
    if self.pending {
      std::future::pending::<()>().await;
    }
    Ok(vec![CountryCount {
      country: "Kenya".to_string(),
      current: 1,
      planned: 1,
    }])
  }

  async fn travelers(&self, country: &str) -> Result<Vec<TravelerRecord>, ApiError> {
    assert_eq!(country, "Kenya");
    Ok(vec![
      record("Ana", "2024-06-01", "2024-06-30", true),
      record("Ben", "2024-07-01", "2024-07-10", true),
    ])
  }
}

struct FakeGeo {
  world_available: bool,
}

#[async_trait::async_trait]
impl GeoSource for FakeGeo {
  async fn world(&self) -> Result<Vec<CountryFeature>, ApiError> {
    if !self.world_available {
      return Err(ApiError::Status {
        url: "world".to_string(),
        status: 404,
      });
    }
    Ok(vec![CountryFeature::new(
      FeatureId::Numeric(404),
      CountryGeometry::Polygon(polygon![
        (x: -20., y: -20.),
        (x: 20., y: -20.),
        (x: 20., y: 20.),
        (x: -20., y: 20.),
        (x: -20., y: -20.),
      ]),
    )])
  }

  async fn country_names(&self) -> Result<Vec<Nation>, ApiError> {
    Ok(vec![Nation {
      ccn3: Some("404".to_string()),
      name: NationName {
        common: "Kenya".to_string(),
      },
    }])
  }
}

fn today() -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn create_test_app(api: FakeBackend, geo: FakeGeo) -> Harness<'static, GlobeApp> {
  let ctx = egui::Context::default();
  let (loader, events) = Loader::new(Arc::new(api), Arc::new(geo), ctx);
  let app = GlobeApp::new(loader, events, today(), ReturnedPolicy::Hide);

  Harness::builder().with_size(vec2(800., 600.)).build_state(
    |ctx, app: &mut GlobeApp| {
      let mut frame = eframe::Frame::_new_kittest();
      app.update(ctx, &mut frame);
    },
    app,
  )
}

/// Steps the harness until `done` holds, giving the background tasks time to finish.
fn step_until(harness: &mut Harness<'_, GlobeApp>, done: impl Fn(&GlobeApp) -> bool) {
  for _ in 0..200 {
    harness.step();
    if done(harness.state()) {
      return;
    }
    std::thread::sleep(Duration::from_millis(10));
  }
  panic!("condition not reached");
}

fn click(harness: &mut Harness<'_, GlobeApp>, pos: Pos2) {
  harness.input_mut().events.push(Event::PointerMoved(pos));
  harness.step();
  for pressed in [true, false] {
    harness.input_mut().events.push(Event::PointerButton {
      pos,
      button: PointerButton::Primary,
      pressed,
      modifiers: Modifiers::default(),
    });
    harness.step();
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn shows_placeholder_while_loading() {
  let mut harness = create_test_app(
    FakeBackend { pending: true },
    FakeGeo {
      world_available: true,
    },
  );
  harness.step();

  harness.get_by_label("Loading globe…");
  assert!(!harness.state().is_ready());
  assert!(!harness.state().panel().is_visible());
}

#[tokio::test(flavor = "multi_thread")]
async fn clicking_a_country_opens_its_travelers() {
  let mut harness = create_test_app(
    FakeBackend { pending: false },
    FakeGeo {
      world_available: true,
    },
  );
  step_until(&mut harness, GlobeApp::is_ready);
  assert!(harness.query_by_label("Loading globe…").is_none());

  click(&mut harness, pos2(400., 300.));
  step_until(&mut harness, |app| {
    matches!(app.panel().body(), PanelBody::Travelers(_))
  });

  assert!(harness.state().panel().is_visible());
  assert_eq!(harness.state().panel().country(), "Kenya");
  harness.get_by_label("Ana Doe");
  harness.get_by_label("Upcoming Travel (1) ▼");
  assert!(harness.query_by_label("Ben Doe").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_world_shows_an_error() {
  let mut harness = create_test_app(
    FakeBackend { pending: false },
    FakeGeo {
      world_available: false,
    },
  );
  step_until(&mut harness, |app| app.load_error().is_some());

  let error = harness.state().load_error().unwrap().to_string();
  assert!(error.contains("world answered with status 404"));
  harness.get_by_label(&format!("Failed to load the globe: {error}"));
}
