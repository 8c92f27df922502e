use crate::data_source::{CountSource, VehicleCounts};
use crate::notice::Notices;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2, epaint::TextShape};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

const CHART_TITLE: &str = "Vehicle Count by Type";
const BAR_COLOR: Color32 = Color32::from_rgb(135, 206, 235);
// Fraction of each slot covered by its bar.
const BAR_FILL: f32 = 0.8;

/// A bar positioned inside the plot area.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub rect: Rect,
}

/// Lays out one equally spaced bar per label, scaled so the largest count fills `plot`.
pub fn bar_layout(counts: &VehicleCounts, plot: Rect) -> Vec<Bar> {
    if counts.is_empty() {
        return Vec::new();
    }
    let max = counts.max_count();
    let slot = plot.width() / counts.len() as f32;
    let width = slot * BAR_FILL;

    counts
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            let height = if max == 0 {
                0.0
            } else {
                plot.height() * count as f32 / max as f32
            };
            let left = plot.left() + slot * i as f32 + (slot - width) / 2.0;
            Bar {
                label: label.to_owned(),
                rect: Rect::from_min_max(
                    Pos2::new(left, plot.bottom() - height),
                    Pos2::new(left + width, plot.bottom()),
                ),
            }
        })
        .collect()
}

/// Spacing between y-axis ticks: 1, 2 or 5 times a power of ten, aiming for about five ticks.
pub fn tick_step(max: u64) -> u64 {
    let raw = (max / 5).max(1);
    let mut magnitude = 1;
    while magnitude * 10 <= raw {
        magnitude *= 10;
    }
    [1, 2, 5, 10]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10 * magnitude)
}

/// Tick positions from zero up to and including `max`.
pub fn tick_values(max: u64) -> impl Iterator<Item = u64> {
    let step = tick_step(max);
    (0..=max / step).map(move |i| i * step)
}

/// Bar chart of the vehicle counts, shown in its own window.
#[derive(Default)]
pub struct ChartView {
    open: Option<VehicleCounts>,
}

impl ChartView {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Reads fresh counts and opens the chart window, unless there is nothing to plot.
    pub fn show(&mut self, source: &dyn CountSource, notices: &mut Notices) {
        let counts = source.read(notices);
        if counts.is_empty() {
            notices.info("No Data", "No data available for plotting.");
            return;
        }
        tracing::info!(bars = counts.len(), "opening vehicle count chart");
        self.open = Some(counts);
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        let Some(counts) = &self.open else {
            return;
        };

        let mut close = false;
        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("vehicle_count_chart"),
            egui::ViewportBuilder::default()
                .with_title(CHART_TITLE)
                .with_inner_size([1000.0, 500.0]),
            |ctx, class| {
                if matches!(class, egui::ViewportClass::Embedded) {
                    // The backend cannot open another native window.
                    let mut open = true;
                    egui::Window::new(CHART_TITLE)
                        .open(&mut open)
                        .default_size([1000.0, 500.0])
                        .show(ctx, |ui| draw_chart(ui, counts));
                    close = !open;
                } else {
                    egui::CentralPanel::default().show(ctx, |ui| draw_chart(ui, counts));
                    if ctx.input(|i| i.viewport().close_requested()) {
                        close = true;
                    }
                }
            },
        );

        if close {
            tracing::debug!("vehicle count chart closed");
            self.close();
        }
    }
}

fn draw_chart(ui: &mut egui::Ui, counts: &VehicleCounts) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let outer = response.rect;
    let plot = Rect::from_min_max(
        outer.min + Vec2::new(80.0, 40.0),
        outer.max - Vec2::new(20.0, 100.0),
    );
    let text_color = ui.visuals().text_color();
    let axis = Stroke::new(1.0, text_color);
    let grid = Stroke::new(0.5, ui.visuals().weak_text_color());

    painter.text(
        Pos2::new(outer.center().x, outer.top() + 8.0),
        Align2::CENTER_TOP,
        CHART_TITLE,
        FontId::proportional(18.0),
        text_color,
    );

    let max = counts.max_count();
    if max > 0 {
        for value in tick_values(max) {
            let y = plot.bottom() - plot.height() * value as f32 / max as f32;
            painter.line_segment([Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)], grid);
            painter.text(
                Pos2::new(plot.left() - 6.0, y),
                Align2::RIGHT_CENTER,
                value.to_string(),
                FontId::proportional(12.0),
                text_color,
            );
        }
    }

    for bar in bar_layout(counts, plot) {
        painter.rect_filled(bar.rect, 0.0, BAR_COLOR);

        // Rotated so the label ends at its tick.
        let galley = painter.layout_no_wrap(bar.label, FontId::proportional(13.0), text_color);
        let dir = Vec2::angled(-FRAC_PI_4);
        let anchor = Pos2::new(bar.rect.center().x, plot.bottom() + 6.0);
        let pos = anchor - dir * galley.size().x;
        painter.add(TextShape::new(pos, galley, text_color).with_angle(-FRAC_PI_4));
    }

    painter.line_segment([plot.left_top(), plot.left_bottom()], axis);
    painter.line_segment([plot.left_bottom(), plot.right_bottom()], axis);

    painter.text(
        Pos2::new(plot.center().x, outer.bottom() - 4.0),
        Align2::CENTER_BOTTOM,
        "Vehicle Type",
        FontId::proportional(14.0),
        text_color,
    );
    let galley = painter.layout_no_wrap("Count".to_owned(), FontId::proportional(14.0), text_color);
    let pos = Pos2::new(outer.left() + 8.0, plot.center().y + galley.size().x / 2.0);
    painter.add(TextShape::new(pos, galley, text_color).with_angle(-FRAC_PI_2));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedSource {
        counts: VehicleCounts,
        reads: Cell<usize>,
    }

    impl CountSource for FixedSource {
        fn read(&self, _notices: &mut Notices) -> VehicleCounts {
            self.reads.set(self.reads.get() + 1);
            self.counts.clone()
        }
    }

    fn plot() -> Rect {
        Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(400.0, 200.0))
    }

    #[test]
    fn test_show_with_empty_data_reports_and_stays_closed() {
        let source = FixedSource {
            counts: VehicleCounts::default(),
            reads: Cell::new(0),
        };
        let mut notices = Notices::default();
        let mut chart = ChartView::default();

        chart.show(&source, &mut notices);

        assert!(!chart.is_open());
        assert_eq!(source.reads.get(), 1);
        assert_eq!(notices.len(), 1);
        let notice = notices.current().unwrap();
        assert_eq!(notice.title, "No Data");
        assert_eq!(notice.message, "No data available for plotting.");
    }

    #[test]
    fn test_show_with_data_opens_chart() {
        let source = FixedSource {
            counts: [("Car", 4), ("Bus", 2)].into_iter().collect(),
            reads: Cell::new(0),
        };
        let mut notices = Notices::default();
        let mut chart = ChartView::default();

        chart.show(&source, &mut notices);

        assert!(chart.is_open());
        assert!(notices.is_empty());
        chart.close();
        assert!(!chart.is_open());
    }

    #[test]
    fn test_bar_layout_scales_to_largest_count() {
        let counts: VehicleCounts = [("Car", 10), ("Bike", 5), ("Bus", 0), ("Truck", 10)]
            .into_iter()
            .collect();
        let bars = bar_layout(&counts, plot());

        assert_eq!(bars.len(), 4);
        let labels: Vec<_> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Car", "Bike", "Bus", "Truck"]);
        assert_eq!(bars[0].rect.height(), 200.0);
        assert_eq!(bars[1].rect.height(), 100.0);
        assert_eq!(bars[2].rect.height(), 0.0);
        // Equal slots of 100px, bars 80px wide and centered.
        assert_eq!(bars[1].rect.left(), 110.0);
        assert_eq!(bars[1].rect.width(), 80.0);
        assert!(bars.iter().all(|b| b.rect.bottom() == 200.0));
    }

    #[test]
    fn test_bar_layout_all_zero_counts() {
        let counts: VehicleCounts = [("Car", 0), ("Bus", 0)].into_iter().collect();
        let bars = bar_layout(&counts, plot());
        assert!(bars.iter().all(|b| b.rect.height() == 0.0));
        assert!(bar_layout(&VehicleCounts::default(), plot()).is_empty());
    }

    #[test]
    fn test_tick_step() {
        assert_eq!(tick_step(0), 1);
        assert_eq!(tick_step(4), 1);
        assert_eq!(tick_step(12), 2);
        assert_eq!(tick_step(23), 5);
        assert_eq!(tick_step(50), 10);
        assert_eq!(tick_step(730), 200);
        assert_eq!(tick_step(u64::MAX), 5_000_000_000_000_000_000);
    }

    #[test]
    fn test_tick_values_stop_at_max() {
        assert_eq!(tick_values(12).collect::<Vec<_>>(), [0, 2, 4, 6, 8, 10, 12]);
        assert_eq!(tick_values(23).collect::<Vec<_>>(), [0, 5, 10, 15, 20]);

        let ticks: Vec<_> = tick_values(u64::MAX).collect();
        assert_eq!(ticks.len(), 4);
        assert_eq!(*ticks.last().unwrap(), 15_000_000_000_000_000_000);
    }

    #[test]
    fn test_chart_renders_largest_possible_count() {
        let source = FixedSource {
            counts: [("Car", u64::MAX), ("Bus", 1)].into_iter().collect(),
            reads: Cell::new(0),
        };
        let mut notices = Notices::default();
        let mut chart = ChartView::default();
        chart.show(&source, &mut notices);
        assert!(chart.is_open());

        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| chart.ui(ctx));
        }

        assert!(chart.is_open());
    }
}
