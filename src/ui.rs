use crate::chart_view::ChartView;
use crate::config::AppConfig;
use crate::data_source::DataSource;
use crate::notice::{NoticeKind, Notices};
use crate::stats_panel::StatsPanel;
use crate::video_player::{PlaybackState, VideoPlayer};
use eframe::egui::{self, Color32, RichText};
use std::time::Instant;

const SIDEBAR_BG: Color32 = Color32::from_rgb(0x1b, 0x1b, 0x1b);
const HEADER_BG: Color32 = Color32::from_rgb(0x1a, 0xbc, 0x9c);
const SELECT_VIDEO_BG: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);
const PLOT_BG: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
const STATS_BG: Color32 = Color32::from_rgb(0x2e, 0xcc, 0x71);

/// State chosen by the user that outlives a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    // Last vehicle type picked in the filter. Not applied to the data yet.
    pub selected_vehicle_type: String,
}

pub struct VehicleCountApp {
    config: AppConfig,
    state: AppState,
    data_source: DataSource,
    notices: Notices,
    stats_panel: StatsPanel,
    chart_view: ChartView,
    video_player: VideoPlayer,
    // Texture holding the most recent video frame.
    texture: Option<egui::TextureHandle>,
}

impl VehicleCountApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState {
                selected_vehicle_type: config.vehicle_type_placeholder.to_string(),
            },
            data_source: DataSource::from_config(&config),
            notices: Notices::default(),
            stats_panel: StatsPanel::default(),
            chart_view: ChartView::default(),
            video_player: VideoPlayer::new(config.frame_size, config.refresh_interval),
            texture: None,
            config,
        }
    }

    fn select_vehicle_type(&mut self, vehicle_type: String) {
        tracing::info!(%vehicle_type, "vehicle type selected");
        self.state.selected_vehicle_type = vehicle_type;
    }

    fn sidebar(&self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .frame(egui::Frame::new().fill(SIDEBAR_BG).inner_margin(10.0))
            .show(ctx, |ui| {
                for item in self.config.sidebar_items {
                    ui.label(RichText::new(*item).color(Color32::WHITE).size(14.0));
                }
            });
    }

    fn header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(HEADER_BG).inner_margin(10.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new(self.config.header)
                            .color(Color32::WHITE)
                            .size(24.0),
                    );
                });
            });
    }

    fn video_panel(&self, ui: &mut egui::Ui) {
        // Update the UI based on the current playback state.
        match self.video_player.state() {
            PlaybackState::Error(msg) => {
                ui.colored_label(Color32::RED, msg);
            }
            PlaybackState::NotLoaded => {
                ui.label("Please select a video file.");
            }
            PlaybackState::Playing | PlaybackState::Finished => {
                if let Some(texture) = &self.texture {
                    ui.image((texture.id(), texture.size_vec2()));
                }
                if matches!(self.video_player.state(), PlaybackState::Finished) {
                    ui.label("Playback finished.");
                }
            }
        }
    }

    fn notice_window(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.current() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(notice.title.as_str())
            .id(egui::Id::new("notice"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                match notice.kind {
                    NoticeKind::Error => ui.colored_label(Color32::RED, &notice.message),
                    NoticeKind::Info => ui.label(&notice.message),
                };
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.notices.dismiss();
        }
    }
}

fn action_button(text: &str, fill: Color32) -> egui::Button<'_> {
    egui::Button::new(RichText::new(text).color(Color32::WHITE).size(14.0)).fill(fill)
}

impl eframe::App for VehicleCountApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(image) = self.video_player.refresh(Instant::now()) {
            match &mut self.texture {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.texture =
                        Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
                }
            }
        }

        // Open dialogs and the chart block the main window.
        let blocked = !self.notices.is_empty() || self.chart_view.is_open();

        self.sidebar(ctx);
        self.header(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.vertical_centered(|ui| {
                    self.video_panel(ui);
                    ui.add_space(10.0);
                    if ui.add(action_button("Select Video", SELECT_VIDEO_BG)).clicked()
                        && self.video_player.select_and_open(self.config.video_extensions)
                    {
                        self.texture = None;
                    }
                });

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    let mut selected = self.state.selected_vehicle_type.clone();
                    egui::ComboBox::from_id_salt("vehicle_type")
                        .selected_text(selected.as_str())
                        .width(140.0)
                        .show_ui(ui, |ui| {
                            for vehicle_type in self.config.vehicle_types {
                                ui.selectable_value(
                                    &mut selected,
                                    vehicle_type.to_string(),
                                    *vehicle_type,
                                );
                            }
                        });
                    if selected != self.state.selected_vehicle_type {
                        self.select_vehicle_type(selected);
                    }

                    if ui
                        .add(action_button("Plot Vehicle Count Graph", PLOT_BG))
                        .clicked()
                    {
                        self.chart_view.show(&self.data_source, &mut self.notices);
                    }

                    if ui.add(action_button("Show Statistics", STATS_BG)).clicked() {
                        self.stats_panel.toggle(&self.data_source, &mut self.notices);
                    }
                });

                ui.add_space(10.0);
                self.stats_panel.ui(ui);
            });
        });

        self.notice_window(ctx);
        self.chart_view.ui(ctx);

        // Wake up again when the next video frame is due.
        if let Some(wait) = self.video_player.time_until_refresh(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
