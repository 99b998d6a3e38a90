use std::time::Instant;

use egui::{
  Color32, CursorIcon, Mesh, Painter, Pos2, Response, RichText, Sense, Shape, Stroke, Ui, Widget,
  vec2,
};
use geo_types::{Coord, Polygon};
use log::{debug, trace};

use super::{
  animation::{FlyTo, RunningFlyTo},
  features::{CountryFeature, CountryGeometry, CountryNames, FeatureId},
  gesture::{GestureEffect, GestureTracker},
  projection::{Orthographic, Rotation, contains},
};
use crate::metrics::CountryMetricStore;

pub const OCEAN_COLOR: Color32 = Color32::from_rgb(0x0a, 0x1a, 0x3a);
const OUTLINE_COLOR: Color32 = Color32::from_rgb(0x4a, 0x6a, 0x9a);
const HOVER_OUTLINE_COLOR: Color32 = Color32::from_rgb(0xe8, 0xf0, 0xff);

/// A country feature with its resolved name.
#[derive(Debug, Clone)]
pub struct Country {
  pub id: FeatureId,
  pub name: String,
  pub geometry: CountryGeometry,
  centroid: Option<Coord<f64>>,
}

impl Country {
  #[must_use]
  pub fn centroid(&self) -> Option<Coord<f64>> {
    self.centroid
  }
}

/// State of the globe: the countries, the rotation and what the pointer is doing.
#[derive(Debug, Clone)]
pub struct Globe {
  countries: Vec<Country>,
  rotation: Rotation,
  fly_to: Option<RunningFlyTo>,
  gesture: GestureTracker,
  hovered: Option<usize>,
  selection: Option<String>,
}

impl Globe {
  #[must_use]
  pub fn new(features: Vec<CountryFeature>, names: &CountryNames) -> Self {
    let countries = features
      .into_iter()
      .map(|f| Country {
        name: names.display_name(&f.id).to_string(),
        centroid: f.geometry.centroid(),
        id: f.id,
        geometry: f.geometry,
      })
      .collect::<Vec<_>>();
    debug!("Globe with {} countries", countries.len());
    Self {
      countries,
      rotation: Rotation::default(),
      fly_to: None,
      gesture: GestureTracker::new(),
      hovered: None,
      selection: None,
    }
  }

  #[must_use]
  pub fn countries(&self) -> &[Country] {
    &self.countries
  }

  #[must_use]
  pub fn rotation(&self) -> Rotation {
    self.rotation
  }

  #[must_use]
  pub fn is_animating(&self) -> bool {
    self.fly_to.is_some()
  }

  #[must_use]
  pub fn hovered(&self) -> Option<&Country> {
    self.hovered.and_then(|i| self.countries.get(i))
  }

  /// The name of the country clicked since the last call.
  pub fn take_selection(&mut self) -> Option<String> {
    self.selection.take()
  }

  /// Index of the topmost visible country under `pos`.
  #[must_use]
  pub fn country_at(&self, projection: &Orthographic, pos: Pos2) -> Option<usize> {
    if (pos - projection.center()).length() > projection.scale() {
      return None;
    }
    self
      .countries
      .iter()
      .rposition(|c| c.geometry.polygons().any(|p| hit(projection, p, pos)))
  }

  /// Starts flying to the country at `index` and marks it as selected. Replaces a running
  /// fly-to.
  pub fn select(&mut self, index: usize, now: Instant) {
    let Some(country) = self.countries.get(index) else {
      return;
    };
    if let Some(centroid) = country.centroid {
      let fly_to = FlyTo::new(self.rotation, Rotation::facing(centroid));
      self.fly_to = Some(RunningFlyTo::start(fly_to, now));
    }
    debug!("Selected {} ({})", country.name, country.id);
    self.selection = Some(country.name.clone());
  }

  /// Moves a running fly-to forward to `now`. Returns whether it is still running.
  pub fn animate(&mut self, now: Instant) -> bool {
    let Some(running) = self.fly_to else {
      return false;
    };
    let (rotation, finished) = running.sample(now);
    self.rotation = rotation;
    if finished {
      self.fly_to = None;
    }
    !finished
  }

  fn apply(&mut self, effect: GestureEffect) {
    match effect {
      GestureEffect::None => {}
      GestureEffect::CancelAnimation => {
        if self.fly_to.take().is_some() {
          trace!("Fly-to cancelled by pointer");
        }
      }
      GestureEffect::Rotate(rotation) => self.rotation = rotation,
    }
  }

  /// Feeds the primary pointer button into the gesture tracker, a click selects the country
  /// under the pointer.
  fn handle_pointer(&mut self, ui: &Ui, response: &Response, now: Instant) {
    let (pressed, released, pos) = ui.input(|i| {
      (
        i.pointer.primary_pressed(),
        i.pointer.primary_released(),
        i.pointer.interact_pos(),
      )
    });
    let Some(pos) = pos else {
      return;
    };

    if pressed && response.contains_pointer() {
      let effect = self.gesture.pointer_down(pos, self.rotation);
      self.apply(effect);
    }
    if self.gesture.is_active() {
      let effect = self.gesture.pointer_move(pos);
      self.apply(effect);
    }
    if released && self.gesture.is_active() {
      self.gesture.pointer_up(now);
      if self.gesture.click_allowed(now) {
        let projection = Orthographic::fit(response.rect, self.rotation);
        if let Some(index) = self.country_at(&projection, pos) {
          self.select(index, now);
        }
      }
    }
  }

  fn draw(&self, painter: &Painter, projection: &Orthographic, metrics: &CountryMetricStore) {
    painter.circle_filled(projection.center(), projection.scale(), OCEAN_COLOR);

    for (i, country) in self.countries.iter().enumerate() {
      let fill = metrics.bucket(&country.name).fill_color();
      let stroke = if self.hovered == Some(i) {
        Stroke::new(1.5, HOVER_OUTLINE_COLOR)
      } else {
        Stroke::new(0.5, OUTLINE_COLOR)
      };

      for polygon in country.geometry.polygons() {
        let Some(exterior) = projection.project_ring(polygon.exterior()) else {
          continue;
        };
        let holes = polygon
          .interiors()
          .iter()
          .filter_map(|ring| projection.project_ring(ring))
          .collect::<Vec<_>>();
        if let Some(mesh) = fill_mesh(&exterior, &holes, fill) {
          painter.add(Shape::mesh(mesh));
        }
        painter.add(Shape::closed_line(exterior, stroke));
      }
    }
  }
}

fn hit(projection: &Orthographic, polygon: &Polygon<f64>, pos: Pos2) -> bool {
  projection
    .project_ring(polygon.exterior())
    .is_some_and(|ring| contains(&ring, pos))
    && !polygon
      .interiors()
      .iter()
      .filter_map(|ring| projection.project_ring(ring))
      .any(|ring| contains(&ring, pos))
}

fn without_closing_point(ring: &[Pos2]) -> &[Pos2] {
  match ring {
    [first, .., last] if first == last => &ring[..ring.len() - 1],
    _ => ring,
  }
}

/// Triangulates a projected polygon. `None` if it has no area to fill.
fn fill_mesh(exterior: &[Pos2], holes: &[Vec<Pos2>], color: Color32) -> Option<Mesh> {
  let exterior = without_closing_point(exterior);
  if exterior.len() < 3 {
    return None;
  }
  let mut points = exterior.to_vec();
  let mut hole_indices = Vec::with_capacity(holes.len());
  for hole in holes {
    let hole = without_closing_point(hole);
    if hole.len() >= 3 {
      hole_indices.push(points.len());
      points.extend_from_slice(hole);
    }
  }

  let coords = points
    .iter()
    .flat_map(|p| [f64::from(p.x), f64::from(p.y)])
    .collect::<Vec<_>>();
  let indices = earcutr::earcut(&coords, &hole_indices, 2)
    .inspect_err(|e| trace!("Failed to triangulate polygon: {e:?}"))
    .ok()?;
  if indices.is_empty() {
    return None;
  }

  let mut mesh = Mesh::default();
  for p in points {
    mesh.colored_vertex(p, color);
  }
  for triangle in indices.chunks_exact(3) {
    let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(u32::try_from);
    if let (Ok(a), Ok(b), Ok(c)) = (a, b, c) {
      mesh.add_triangle(a, b, c);
    }
  }
  Some(mesh)
}

fn show_tooltip(ui: &Ui, country: &Country, metrics: &CountryMetricStore, pointer: Pos2) {
  let metric = metrics.lookup(&country.name);
  egui::Area::new(egui::Id::new("globe_tooltip"))
    .order(egui::Order::Tooltip)
    .fixed_pos(pointer + vec2(14., -10.))
    .interactable(false)
    .show(ui.ctx(), |ui| {
      egui::Frame::popup(ui.style()).show(ui, |ui| {
        ui.label(RichText::new(&country.name).strong());
        ui.label(format!("Current: {}", metric.current));
        ui.label(format!("Planned: {}", metric.planned));
      });
    });
}

/// Draws a [`Globe`] colored by the traveler counts and handles its input.
pub struct GlobeView<'a> {
  globe: &'a mut Globe,
  metrics: &'a CountryMetricStore,
}

impl<'a> GlobeView<'a> {
  #[must_use]
  pub fn new(globe: &'a mut Globe, metrics: &'a CountryMetricStore) -> Self {
    Self { globe, metrics }
  }
}

impl Widget for GlobeView<'_> {
  fn ui(self, ui: &mut Ui) -> Response {
    let size = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
    let globe = self.globe;
    let now = Instant::now();

    globe.handle_pointer(ui, &response, now);
    if globe.animate(now) {
      ui.ctx().request_repaint();
    }

    let projection = Orthographic::fit(rect, globe.rotation);
    globe.hovered = if globe.gesture.is_dragging() {
      ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
      None
    } else {
      response
        .hover_pos()
        .and_then(|pos| globe.country_at(&projection, pos))
    };

    if ui.is_rect_visible(rect) {
      globe.draw(&ui.painter_at(rect), &projection, self.metrics);
    }

    if let (Some(country), Some(pos)) = (globe.hovered(), response.hover_pos()) {
      ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
      show_tooltip(ui, country, self.metrics, pos);
    }

    response
  }
}
