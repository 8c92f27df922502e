use image::RgbImage;
use opencv::{
    core, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum VideoError {
    #[error("Failed to open video file: {0}")]
    Open(String),
    #[error("Failed to decode frame: {0}")]
    Decode(String),
}

/// A decodable stream of RGB frames with an internal read cursor.
pub trait FrameSource {
    /// Decodes the next frame. Returns `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, VideoError>;

    /// Frees the underlying decoder. Further reads yield no frames.
    fn release(&mut self) {}
}

/// Decodes a video file frame by frame through OpenCV.
pub struct CaptureSession {
    cap: VideoCapture,
}

impl CaptureSession {
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        let path_str = path.to_string_lossy();
        let cap = VideoCapture::from_file(&path_str, videoio::CAP_ANY)
            .map_err(|e| VideoError::Open(format!("{}: {}", path_str, e)))?;

        if !cap.is_opened().unwrap_or(false) {
            return Err(VideoError::Open(path_str.into_owned()));
        }

        tracing::info!(path = %path_str, "opened video");
        Ok(Self { cap })
    }
}

impl FrameSource for CaptureSession {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, VideoError> {
        let mut frame = core::Mat::default();
        match self.cap.read(&mut frame) {
            Ok(true) if !frame.empty() => {}
            // End of video or read error
            _ => return Ok(None),
        }

        // OpenCV decodes to BGR.
        let mut rgb_frame = core::Mat::default();
        imgproc::cvt_color(
            &frame,
            &mut rgb_frame,
            imgproc::COLOR_BGR2RGB,
            0,
            core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| VideoError::Decode(format!("color conversion failed: {}", e)))?;

        let size = rgb_frame
            .size()
            .map_err(|e| VideoError::Decode(e.to_string()))?;
        let data = rgb_frame
            .data_bytes()
            .map_err(|e| VideoError::Decode(e.to_string()))?;
        RgbImage::from_raw(size.width as u32, size.height as u32, data.to_vec())
            .map(Some)
            .ok_or_else(|| VideoError::Decode("frame buffer has unexpected size".to_string()))
    }

    fn release(&mut self) {
        if let Err(e) = self.cap.release() {
            tracing::warn!(error = %e, "failed to release video capture");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}
