use std::path::PathBuf;
use std::time::Duration;

/// Fixed application settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_title: &'static str,
    pub window_size: [f32; 2],
    pub header: &'static str,
    pub sidebar_items: &'static [&'static str],
    // Spreadsheet holding the vehicle counts.
    pub data_file: PathBuf,
    pub label_column: &'static str,
    pub count_column: &'static str,
    // Every displayed frame is resized to this (width, height).
    pub frame_size: [u32; 2],
    pub refresh_interval: Duration,
    pub video_extensions: &'static [&'static str],
    pub vehicle_types: &'static [&'static str],
    pub vehicle_type_placeholder: &'static str,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "Vehicle Count and Classification",
            window_size: [800.0, 600.0],
            header: "KELTRON: VEHICLE COUNT AND CLASSIFICATION",
            sidebar_items: &["Dashboard", "Traffic", "Report"],
            data_file: PathBuf::from("vehicledata.xlsx"),
            label_column: "VehicleType",
            count_column: "Count",
            frame_size: [640, 480],
            refresh_interval: Duration::from_millis(10),
            video_extensions: &["mp4", "avi", "mkv"],
            vehicle_types: &["Car", "Bike", "Bus", "Truck", "3 Wheeler"],
            vehicle_type_placeholder: "All vehicle",
        }
    }
}
