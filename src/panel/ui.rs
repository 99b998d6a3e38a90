use chrono::NaiveDate;
use egui::{Align, Color32, CornerRadius, Layout, Margin, RichText};

use super::{DetailPanel, PanelBody, SectionKind, TravelerGroups};
use crate::traveler::{PersonContact, TravelerRecord};

const LOADING_COLOR: Color32 = Color32::from_rgb(0x7e, 0xb8, 0xf7);
const MUTED_COLOR: Color32 = Color32::from_rgb(0xa0, 0xb0, 0xc8);
const CARD_FILL: Color32 = Color32::from_rgb(0x12, 0x24, 0x48);

impl DetailPanel {
  pub fn ui(&mut self, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
      ui.heading(self.country());
      ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
        if ui.button("✕").on_hover_text("Close").clicked() {
          self.close();
        }
      });
    });

    let metric = self.metric();
    ui.horizontal(|ui| {
      ui.label(RichText::new(format!("Current: {}", metric.current)).strong());
      ui.add_space(12.0);
      ui.label(RichText::new(format!("Planned: {}", metric.planned)).strong());
    });
    ui.separator();

    let mut toggled = None;
    egui::ScrollArea::vertical()
      .auto_shrink([false, false])
      .show(ui, |ui| match self.body() {
        PanelBody::Loading => {
          ui.label(RichText::new("Loading...").color(LOADING_COLOR).size(13.0));
        }
        PanelBody::NoRecords => {
          ui.label(
            RichText::new("No traveler records.")
              .color(MUTED_COLOR)
              .size(13.0),
          );
        }
        PanelBody::Travelers(groups) => {
          toggled = self.travelers_ui(ui, groups);
        }
      });

    if let Some(section) = toggled {
      self.toggle(section);
    }
  }

  /// Current travelers first, then the collapsible sections. Returns the section whose header was
  /// clicked.
  fn travelers_ui(&self, ui: &mut egui::Ui, groups: &TravelerGroups) -> Option<SectionKind> {
    for record in &groups.current {
      traveler_card(ui, record, self.today());
    }

    let mut toggled = None;
    for kind in SectionKind::ALL {
      let records = groups.section(kind);
      if records.is_empty() {
        continue;
      }
      let expanded = self.is_expanded(kind);
      let arrow = if expanded { "▲" } else { "▼" };
      ui.add_space(6.0);
      let header = egui::Button::new(
        RichText::new(format!("{} ({}) {arrow}", kind.title(), records.len())).strong(),
      )
      .frame(false);
      if ui.add(header).clicked() {
        toggled = Some(kind);
      }
      if expanded {
        for record in records {
          traveler_card(ui, record, self.today());
        }
      }
    }
    toggled
  }
}

fn traveler_card(ui: &mut egui::Ui, record: &TravelerRecord, today: NaiveDate) {
  egui::Frame::default()
    .fill(CARD_FILL)
    .corner_radius(CornerRadius::same(6))
    .inner_margin(Margin::same(8))
    .show(ui, |ui| {
      ui.set_width(ui.available_width());
      ui.horizontal(|ui| {
        ui.label(RichText::new(record.full_name()).strong());
        let status = record.status(today);
        ui.label(RichText::new(status.label()).color(status.color()).size(11.0));
      });
      ui.label(
        RichText::new(format!("{} → {}", record.travel_start, record.travel_end))
          .color(MUTED_COLOR)
          .size(12.0),
      );

      let primary = &record.contacts.primary;
      contact_line(ui, "Passport:", &record.passport_number);
      contact_line(
        ui,
        &format!("Primary Contact ({}):", primary.label),
        &primary.value,
      );
      contact_line(
        ui,
        "In-Country Contact:",
        &person(&record.contacts.secondary),
      );
      contact_line(
        ui,
        "Emergency Contact:",
        &person(&record.contacts.emergency),
      );

      if let Some(link) = record.itinerary() {
        ui.hyperlink_to("View Itinerary →", link);
      }
    });
  ui.add_space(4.0);
}

fn contact_line(ui: &mut egui::Ui, title: &str, value: &str) {
  ui.horizontal_wrapped(|ui| {
    ui.label(RichText::new(title).strong().size(12.0));
    ui.label(RichText::new(value).size(12.0));
  });
}

fn person(contact: &PersonContact) -> String {
  format!(
    "{} ({}) - {}",
    contact.name, contact.relationship, contact.phone
  )
}
