//! Camera frame acquisition.
//!
//! A background thread pulls MJPG frames from the V4L2 device, decodes
//! them and overwrites a single latest-frame cell. Staleness matters
//! more than completeness for live preview, so older frames are simply
//! dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use image::RgbImage;
use rscam::{Camera, Config};

use crate::module::error::CaptureError;
use crate::module::util::conf;

/// One decoded image from the camera at a point in time.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Cut a region of interest out of the frame. Offsets and size are
    /// clamped to the frame bounds, matching the preview overlay.
    pub fn crop(&self, off_x: u32, off_y: u32, width: u32, height: u32) -> Frame {
        let x = off_x.min(self.width().saturating_sub(1));
        let y = off_y.min(self.height().saturating_sub(1));
        let w = width.min(self.width() - x);
        let h = height.min(self.height() - y);
        let view = image::imageops::crop_imm(&self.image, x, y, w, h);
        Frame {
            image: view.to_image(),
        }
    }
}

/// Pull-based source of the most recent camera frame.
pub trait FrameSource {
    /// Returns the most recently decoded frame. Non-blocking when a
    /// frame is cached, otherwise waits up to the source's timeout and
    /// fails with `DeviceUnavailable`.
    fn current_frame(&self) -> Result<Frame, CaptureError>;
}

// Latest-frame cell shared with the acquisition thread.
struct Cell {
    slot: Mutex<Option<Frame>>,
    fresh: Condvar,
}

/// Represents a V4L2 camera with a background acquisition thread.
pub struct V4l2Camera {
    cell: Arc<Cell>,
    running: Arc<AtomicBool>,
    timeout: Duration,
}

impl V4l2Camera {
    /// Opens the configured V4L2 device and starts the acquisition
    /// thread.
    ///
    /// # Arguments
    ///
    /// * `conf` - The camera configuration.
    ///
    pub fn new(conf: &conf::Camera) -> Result<Self, CaptureError> {
        let device = format!("/dev/video{}", conf.video_idx.max(0));
        let mut cap = Camera::new(&device)
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {}", device, e)))?;

        // Configure and start the camera with specified settings.
        cap.start(&Config {
            interval: (1, 30), // 30 fps.
            resolution: (conf.width as u32, conf.height as u32),
            format: b"MJPG",
            nbuffers: 1,
            ..Default::default()
        })
        .map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {:?}", device, e)))?;

        let cell = Arc::new(Cell {
            slot: Mutex::new(None),
            fresh: Condvar::new(),
        });
        let running = Arc::new(AtomicBool::new(true));

        let thread_cell = Arc::clone(&cell);
        let thread_running = Arc::clone(&running);
        thread::spawn(move || acquire_loop(cap, thread_cell, thread_running, device));

        Ok(Self {
            cell,
            running,
            timeout: Duration::from_millis(conf.timeout_ms),
        })
    }
}

/// Acquisition loop: capture, decode, overwrite the latest frame.
fn acquire_loop(cap: Camera, cell: Arc<Cell>, running: Arc<AtomicBool>, device: String) {
    while running.load(Ordering::Relaxed) {
        let raw = match cap.capture() {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Frame read failed on {}: {}", device, e);
                thread::sleep(Duration::from_millis(100));
                continue;
            }
        };
        let decoded = match image::load_from_memory_with_format(&raw[..], image::ImageFormat::Jpeg)
        {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                log::warn!("Frame decode failed: {}", e);
                continue;
            }
        };
        let mut slot = cell.slot.lock().unwrap();
        // The previous frame, delivered or not, is dropped here.
        *slot = Some(Frame { image: decoded });
        cell.fresh.notify_all();
    }
    log::info!("Camera thread for {} stopped.", device);
}

impl FrameSource for V4l2Camera {
    fn current_frame(&self) -> Result<Frame, CaptureError> {
        let slot = self.cell.slot.lock().unwrap();
        if let Some(frame) = slot.as_ref() {
            return Ok(frame.clone());
        }
        // No frame yet. Wait for the acquisition thread, bounded.
        let (slot, _) = self.cell.fresh.wait_timeout(slot, self.timeout).unwrap();
        match slot.as_ref() {
            Some(frame) => Ok(frame.clone()),
            None => Err(CaptureError::DeviceUnavailable(format!(
                "no frame within {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
