use crate::video_reader::{CaptureSession, FrameSource, VideoError};
use eframe::egui;
use image::{RgbImage, imageops::FilterType};
use std::path::Path;
use std::time::{Duration, Instant};

// Enum to manage the playback state.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    // No video has been opened yet.
    NotLoaded,
    // Frames are being decoded on every refresh.
    Playing,
    // The stream ran out of frames.
    Finished,
    // Opening or decoding failed.
    Error(String),
}

/// Plays a single video session by decoding one frame per refresh step.
///
/// The step is driven by the host event loop: after each displayed frame the
/// next step becomes due `interval` later, measured from the end of the
/// current step. Once the stream is exhausted nothing is scheduled again.
pub struct VideoPlayer {
    session: Option<Box<dyn FrameSource>>,
    state: PlaybackState,
    next_due: Option<Instant>,
    frame_size: [u32; 2],
    interval: Duration,
}

impl VideoPlayer {
    pub fn new(frame_size: [u32; 2], interval: Duration) -> Self {
        Self {
            session: None,
            state: PlaybackState::NotLoaded,
            next_due: None,
            frame_size,
            interval,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Asks the user for a video file and starts playing it.
    ///
    /// Returns `false` when the dialog was cancelled.
    pub fn select_and_open(&mut self, extensions: &[&str]) -> bool {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select Video File")
            .add_filter("Video files", extensions)
            .pick_file()
        else {
            return false;
        };
        self.open_path(&path);
        true
    }

    pub fn open_path(&mut self, path: &Path) {
        match CaptureSession::open(path) {
            Ok(session) => self.start(Box::new(session)),
            Err(err) => {
                tracing::error!(%err, "could not open video");
                self.release_session();
                self.state = PlaybackState::Error(err.to_string());
            }
        }
    }

    /// Replaces the current session, releasing the old one, and schedules
    /// the first refresh immediately.
    pub fn start(&mut self, session: Box<dyn FrameSource>) {
        self.release_session();
        self.session = Some(session);
        self.state = PlaybackState::Playing;
        self.next_due = Some(Instant::now());
    }

    fn release_session(&mut self) {
        if let Some(mut old) = self.session.take() {
            old.release();
            tracing::debug!("released video session");
        }
        self.next_due = None;
    }

    /// Runs one refresh step if it is due.
    ///
    /// Returns the frame to display, already resized to the display size.
    pub fn refresh(&mut self, now: Instant) -> Option<egui::ColorImage> {
        if !matches!(self.next_due, Some(due) if now >= due) {
            return None;
        }
        let Some(session) = self.session.as_mut() else {
            self.next_due = None;
            return None;
        };

        match session.next_frame() {
            Ok(Some(frame)) => {
                let image = to_color_image(&self.resize(&frame));
                self.next_due = Some(Instant::now() + self.interval);
                Some(image)
            }
            Ok(None) => {
                tracing::info!("video finished");
                self.release_session();
                self.state = PlaybackState::Finished;
                None
            }
            Err(err) => {
                tracing::error!(%err, "video decode failed");
                self.release_session();
                self.state = PlaybackState::Error(err.to_string());
                None
            }
        }
    }

    /// Time left until the next refresh step, or `None` if nothing is scheduled.
    pub fn time_until_refresh(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    fn resize(&self, frame: &RgbImage) -> RgbImage {
        let [width, height] = self.frame_size;
        if frame.dimensions() == (width, height) {
            return frame.clone();
        }
        image::imageops::resize(frame, width, height, FilterType::Triangle)
    }
}

fn to_color_image(frame: &RgbImage) -> egui::ColorImage {
    let (width, height) = frame.dimensions();
    egui::ColorImage::from_rgb([width as usize, height as usize], frame.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Yields `remaining` solid frames, then reports end of stream.
    struct FakeSession {
        remaining: usize,
        size: (u32, u32),
        released: Rc<Cell<bool>>,
    }

    impl FakeSession {
        fn new(remaining: usize, size: (u32, u32)) -> (Self, Rc<Cell<bool>>) {
            let released = Rc::new(Cell::new(false));
            let session = Self {
                remaining,
                size,
                released: released.clone(),
            };
            (session, released)
        }
    }

    impl FrameSource for FakeSession {
        fn next_frame(&mut self) -> Result<Option<RgbImage>, VideoError> {
            if self.released.get() || self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            let (w, h) = self.size;
            Ok(Some(RgbImage::from_pixel(w, h, image::Rgb([200, 10, 30]))))
        }

        fn release(&mut self) {
            self.released.set(true);
        }
    }

    struct BrokenSession;

    impl FrameSource for BrokenSession {
        fn next_frame(&mut self) -> Result<Option<RgbImage>, VideoError> {
            Err(VideoError::Decode("corrupt packet".to_string()))
        }
    }

    fn player() -> VideoPlayer {
        VideoPlayer::new([640, 480], Duration::from_millis(10))
    }

    /// Drives the player like the event loop would, returning every displayed frame.
    fn run_to_end(player: &mut VideoPlayer) -> Vec<egui::ColorImage> {
        let mut shown = Vec::new();
        let mut now = Instant::now();
        for _ in 0..1000 {
            let Some(wait) = player.time_until_refresh(now) else {
                break;
            };
            now += wait;
            if let Some(frame) = player.refresh(now) {
                shown.push(frame);
            }
            now = Instant::now().max(now);
        }
        shown
    }

    #[test]
    fn test_new_player_is_idle() {
        let mut player = player();
        assert_eq!(player.state(), &PlaybackState::NotLoaded);
        assert_eq!(player.time_until_refresh(Instant::now()), None);
        assert!(player.refresh(Instant::now()).is_none());
    }

    #[test]
    fn test_plays_every_frame_resized_then_stops() {
        let (session, released) = FakeSession::new(5, (1920, 1080));
        let mut player = player();
        player.start(Box::new(session));

        let shown = run_to_end(&mut player);

        assert_eq!(shown.len(), 5);
        assert!(shown.iter().all(|f| f.size == [640, 480]));
        assert_eq!(shown[0].pixels[0], egui::Color32::from_rgb(200, 10, 30));
        assert_eq!(player.state(), &PlaybackState::Finished);
        assert_eq!(player.time_until_refresh(Instant::now()), None);
        assert!(released.get());
    }

    #[test]
    fn test_refresh_waits_for_interval() {
        let (session, _) = FakeSession::new(3, (640, 480));
        let mut player = player();
        player.start(Box::new(session));

        let now = Instant::now();
        assert!(player.refresh(now).is_some());
        // The next step is not due until the interval has passed.
        assert!(player.refresh(now).is_none());
        let wait = player.time_until_refresh(now).unwrap();
        assert!(wait >= Duration::from_millis(10));
        assert!(player.refresh(now + Duration::from_secs(1)).is_some());
    }

    #[test]
    fn test_empty_stream_finishes_without_frames() {
        let (session, released) = FakeSession::new(0, (320, 240));
        let mut player = player();
        player.start(Box::new(session));

        assert!(run_to_end(&mut player).is_empty());
        assert_eq!(player.state(), &PlaybackState::Finished);
        assert!(released.get());
    }

    #[test]
    fn test_opening_new_session_releases_old_one() {
        let (first, first_released) = FakeSession::new(10, (320, 240));
        let (second, second_released) = FakeSession::new(2, (320, 240));
        let mut player = player();

        player.start(Box::new(first));
        assert!(player.refresh(Instant::now()).is_some());
        player.start(Box::new(second));

        assert!(first_released.get());
        assert!(!second_released.get());
        assert_eq!(run_to_end(&mut player).len(), 2);
    }

    #[test]
    fn test_decode_error_stops_playback() {
        let mut player = player();
        player.start(Box::new(BrokenSession));

        assert!(player.refresh(Instant::now()).is_none());
        assert_eq!(
            player.state(),
            &PlaybackState::Error("Failed to decode frame: corrupt packet".to_string())
        );
        assert_eq!(player.time_until_refresh(Instant::now()), None);
    }

    #[test]
    fn test_open_missing_file_sets_error_state() {
        let (session, released) = FakeSession::new(1, (320, 240));
        let mut player = player();
        player.start(Box::new(session));

        player.open_path(Path::new("non_existent_video_file.mkv"));

        assert!(released.get());
        assert!(matches!(player.state(), PlaybackState::Error(msg) if msg.contains("Failed to open video file")));
    }
}
