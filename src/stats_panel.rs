use crate::data_source::CountSource;
use crate::notice::Notices;
use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Table of (vehicle type, count) rows that can be shown or hidden.
pub struct StatsPanel {
    visibility: Visibility,
    rows: Vec<(String, u64)>,
}

impl Default for StatsPanel {
    fn default() -> Self {
        Self {
            visibility: Visibility::Hidden,
            rows: Vec::new(),
        }
    }
}

impl StatsPanel {
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility() == Visibility::Visible
    }

    pub fn rows(&self) -> &[(String, u64)] {
        &self.rows
    }

    /// Replaces every displayed row with a fresh read of `source`.
    pub fn refresh(&mut self, source: &dyn CountSource, notices: &mut Notices) {
        let counts = source.read(notices);
        self.rows.clear();
        self.rows
            .extend(counts.iter().map(|(label, count)| (label.to_owned(), count)));
    }

    /// Hides a visible panel, keeping its rows. Showing a hidden panel refreshes it.
    pub fn toggle(&mut self, source: &dyn CountSource, notices: &mut Notices) {
        match self.visibility {
            Visibility::Visible => {
                self.visibility = Visibility::Hidden;
            }
            Visibility::Hidden => {
                self.visibility = Visibility::Visible;
                self.refresh(source, notices);
            }
        }
        tracing::debug!(visibility = ?self.visibility, rows = self.rows().len(), "statistics panel toggled");
    }

    pub fn ui(&self, ui: &mut egui::Ui) {
        if !self.is_visible() {
            return;
        }
        egui::Frame::new()
            .fill(egui::Color32::from_rgb(0x1e, 0x1e, 0x1e))
            .inner_margin(10.0)
            .show(ui, |ui| {
                egui::Grid::new("vehicle_stats")
                    .num_columns(2)
                    .striped(true)
                    .min_col_width(120.0)
                    .show(ui, |ui| {
                        ui.strong("Vehicle Type");
                        ui.strong("Count");
                        ui.end_row();
                        for (label, count) in &self.rows {
                            ui.label(label);
                            ui.label(count.to_string());
                            ui.end_row();
                        }
                    });
            });
    }
}
