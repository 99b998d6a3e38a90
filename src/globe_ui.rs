use std::sync::mpsc::Receiver;

use chrono::NaiveDate;
use egui::{Color32, RichText};
use log::{debug, info};

use crate::{
  globe::globe_egui::{Globe, GlobeView},
  loader::{LoadEvent, Loader},
  metrics::CountryMetricStore,
  panel::{DetailPanel, ReturnedPolicy},
};

const BACKGROUND: Color32 = Color32::from_rgb(0x05, 0x0d, 0x1f);
const DETAIL_PANEL_WIDTH: f32 = 320.0;

enum GlobeState {
  Loading,
  Ready {
    globe: Box<Globe>,
    metrics: CountryMetricStore,
  },
  Failed(String),
}

/// Holds the UI data of the travel globe.
pub struct GlobeApp {
  state: GlobeState,
  panel: DetailPanel,
  loader: Loader,
  events: Receiver<LoadEvent>,
}

impl GlobeApp {
  /// Starts loading the globe right away. Needs a running tokio runtime.
  #[must_use]
  pub fn new(
    loader: Loader,
    events: Receiver<LoadEvent>,
    today: NaiveDate,
    policy: ReturnedPolicy,
  ) -> Self {
    loader.spawn_initial_load();
    Self {
      state: GlobeState::Loading,
      panel: DetailPanel::new(today, policy),
      loader,
      events,
    }
  }

  #[must_use]
  pub fn panel(&self) -> &DetailPanel {
    &self.panel
  }

  #[must_use]
  pub fn is_ready(&self) -> bool {
    matches!(self.state, GlobeState::Ready { .. })
  }

  #[must_use]
  pub fn load_error(&self) -> Option<&str> {
    match &self.state {
      GlobeState::Failed(e) => Some(e),
      _ => None,
    }
  }

  pub fn handle_event(&mut self, event: LoadEvent) {
    match event {
      LoadEvent::Globe(data) => {
        info!("Globe ready");
        let globe = Globe::new(data.features, &data.names);
        self.state = GlobeState::Ready {
          globe: Box::new(globe),
          metrics: data.metrics,
        };
      }
      LoadEvent::GlobeFailed(e) => self.state = GlobeState::Failed(e),
      LoadEvent::Travelers { token, result } => {
        self.panel.apply(token, result);
      }
    }
  }

  fn open_panel(&mut self, country: String) {
    let GlobeState::Ready { metrics, .. } = &self.state else {
      return;
    };
    let token = self.panel.open(&country, metrics);
    debug!("Fetching travelers of {country}");
    self.loader.spawn_traveler_fetch(token, country);
  }
}

impl eframe::App for GlobeApp {
  // Required by eframe 0.34; all drawing happens in `update`, which eframe still calls first.
  fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

  fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
    while let Ok(event) = self.events.try_recv() {
      self.handle_event(event);
    }

    if self.panel.is_visible() {
      egui::SidePanel::right("detail_panel")
        .default_width(DETAIL_PANEL_WIDTH)
        .width_range(240.0..=520.0)
        .resizable(true)
        .show(ctx, |ui| self.panel.ui(ui));
    }

    let mut selected = None;
    egui::CentralPanel::default()
      .frame(egui::Frame::NONE.fill(BACKGROUND))
      .show(ctx, |ui| match &mut self.state {
        GlobeState::Loading => {
          ui.centered_and_justified(|ui| {
            ui.label(RichText::new("Loading globe…").color(Color32::LIGHT_GRAY));
          });
        }
        GlobeState::Failed(e) => {
          ui.centered_and_justified(|ui| {
            ui.label(
              RichText::new(format!("Failed to load the globe: {e}")).color(Color32::LIGHT_RED),
            );
          });
        }
        GlobeState::Ready { globe, metrics } => {
          ui.add(GlobeView::new(globe, metrics));
          selected = globe.take_selection();
        }
      });

    if let Some(country) = selected {
      self.open_panel(country);
      ctx.request_repaint();
    }
  }
}
