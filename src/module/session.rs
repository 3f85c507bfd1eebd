//! Labeled capture session orchestration.
//!
//! Ties operator commands, the frame source and the dataset store
//! together: validates labels, drives single-shot and burst captures,
//! and keeps running counters that always reflect what is actually on
//! disk. Counters are seeded from the directory listing at label
//! selection time, so restarting the app or switching labels back and
//! forth never causes collisions or loses the true count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::module::camera::{Frame, FrameSource};
use crate::module::dataset::{CaptureRecord, DatasetStore, Label};
use crate::module::error::CaptureError;
use crate::module::util::conf::Roi;

/// Session lifecycle as seen by the UI adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No label selected.
    Idle,
    /// Label selected, counter seeded.
    Ready,
    /// Burst capture active.
    Capturing,
}

// Mutable session state, guarded by the session mutex. Never persisted.
#[derive(Debug, Default)]
struct SessionState {
    label: Option<Label>,
    count: u64,
    last_record: Option<CaptureRecord>,
    last_error: Option<String>,
}

/// State snapshot handed to the UI adapter on each refresh tick.
/// Querying it repeatedly has no side effects.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub label: Option<String>,
    pub count: u64,
    pub capturing: bool,
    pub phase: Phase,
    pub last_record: Option<CaptureRecord>,
    pub last_error: Option<String>,
}

/// Drives labeled capture runs against a frame source and the dataset
/// store. Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct CaptureSession {
    source: Arc<dyn FrameSource + Send + Sync>,
    store: Arc<DatasetStore>,
    roi: Option<Roi>,
    state: Arc<Mutex<SessionState>>,
    bursting: Arc<AtomicBool>,
    burst: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CaptureSession {
    /// # Arguments
    ///
    /// * `source` - The live frame source.
    /// * `store` - The dataset store to persist into.
    /// * `roi` - Optional crop region applied to every captured frame.
    ///
    pub fn new(
        source: Arc<dyn FrameSource + Send + Sync>,
        store: Arc<DatasetStore>,
        roi: Option<Roi>,
    ) -> Self {
        Self {
            source,
            store,
            roi,
            state: Arc::new(Mutex::new(SessionState::default())),
            bursting: Arc::new(AtomicBool::new(false)),
            burst: Arc::new(Mutex::new(None)),
        }
    }

    /// Validates and selects a label, seeding the counter from the
    /// on-disk count. Stops any active burst first. Returns the seeded
    /// count.
    pub fn select_label(&self, raw: &str) -> Result<u64, CaptureError> {
        let label = Label::parse(raw)?;
        self.stop_burst();
        let count = self.store.count_for(&label)?;
        let mut state = self.state.lock().unwrap();
        log::info!("Label '{}' selected, {} records on disk.", label, count);
        state.label = Some(label);
        state.count = count;
        state.last_record = None;
        state.last_error = None;
        Ok(count)
    }

    /// Deselects the current label, returning the session to idle.
    pub fn deselect_label(&self) {
        self.stop_burst();
        let mut state = self.state.lock().unwrap();
        state.label = None;
        state.count = 0;
        state.last_record = None;
    }

    /// Captures a single frame under the selected label. Returns the
    /// new record and the updated counter.
    pub fn capture_one(&self) -> Result<(CaptureRecord, u64), CaptureError> {
        let label = self.selected_label()?;
        // A running burst owns the session; single shots wait for it.
        if self.bursting.load(Ordering::SeqCst) {
            return Err(CaptureError::NoLabelSelected);
        }
        self.capture_for(&label)
    }

    /// Starts a burst: repeated captures at the given interval until
    /// `max_count` is reached, a capture fails, or `stop_burst` is
    /// called. Runs on a background thread so the UI stays responsive.
    ///
    /// Returns `false` when a burst is already running; the running
    /// burst keeps its own interval and count.
    pub fn start_burst(&self, interval_ms: u64, max_count: u64) -> Result<bool, CaptureError> {
        let label = self.selected_label()?;
        if self.bursting.swap(true, Ordering::SeqCst) {
            log::warn!("Burst already running, ignoring start.");
            return Ok(false);
        }
        log::info!(
            "Burst started for '{}': up to {} frames every {}ms.",
            label,
            max_count,
            interval_ms
        );

        let session = self.clone();
        let handle = thread::spawn(move || {
            let interval = Duration::from_millis(interval_ms);
            let mut taken: u64 = 0;
            // The stop flag is checked at every interval boundary, so a
            // stop request takes effect before the next capture and an
            // in-flight persist always completes or fails cleanly.
            while taken < max_count && session.bursting.load(Ordering::SeqCst) {
                match session.capture_for(&label) {
                    Ok((record, count)) => {
                        taken += 1;
                        log::debug!("Burst frame {} saved ({} total).", record.seq, count);
                    }
                    Err(e) => {
                        // Frames captured before the failure remain valid.
                        log::warn!("Burst halted after {} frames: {}", taken, e);
                        break;
                    }
                }
                if taken >= max_count {
                    break;
                }
                // Interruptible wait: a stop request must not hang the
                // caller for the remainder of a long interval.
                let started = Instant::now();
                while started.elapsed() < interval && session.bursting.load(Ordering::SeqCst) {
                    let left = interval - started.elapsed().min(interval);
                    thread::sleep(left.min(Duration::from_millis(20)));
                }
            }
            session.bursting.store(false, Ordering::SeqCst);
            log::info!("Burst finished with {} frames.", taken);
        });
        *self.burst.lock().unwrap() = Some(handle);
        Ok(true)
    }

    /// Requests burst stop and waits for the burst thread to settle.
    /// Idempotent: a no-op when no burst is active.
    pub fn stop_burst(&self) {
        self.bursting.store(false, Ordering::SeqCst);
        if let Some(handle) = self.burst.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    /// Latest preview frame, pulled straight from the frame source.
    pub fn preview(&self) -> Result<Frame, CaptureError> {
        self.source.current_frame()
    }

    /// Current session state for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().unwrap();
        let capturing = self.bursting.load(Ordering::SeqCst);
        let phase = match (&state.label, capturing) {
            (None, _) => Phase::Idle,
            (Some(_), false) => Phase::Ready,
            (Some(_), true) => Phase::Capturing,
        };
        SessionSnapshot {
            label: state.label.as_ref().map(|l| l.as_str().to_owned()),
            count: state.count,
            capturing,
            phase,
            last_record: state.last_record.clone(),
            last_error: state.last_error.clone(),
        }
    }

    fn selected_label(&self) -> Result<Label, CaptureError> {
        self.state
            .lock()
            .unwrap()
            .label
            .clone()
            .ok_or(CaptureError::NoLabelSelected)
    }

    // Shared by single-shot and burst capture. The counter only moves
    // on a successful persist; errors are recorded for the snapshot
    // before being handed back.
    fn capture_for(&self, label: &Label) -> Result<(CaptureRecord, u64), CaptureError> {
        match self.try_capture(label) {
            Ok(record) => {
                let mut state = self.state.lock().unwrap();
                state.count += 1;
                state.last_record = Some(record.clone());
                state.last_error = None;
                Ok((record, state.count))
            }
            Err(e) => {
                self.state.lock().unwrap().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn try_capture(&self, label: &Label) -> Result<CaptureRecord, CaptureError> {
        let frame = self.source.current_frame()?;
        let frame = match &self.roi {
            Some(roi) if roi.enabled => frame.crop(roi.off_x, roi.off_y, roi.width, roi.height),
            _ => frame,
        };
        self.store.persist(label, &frame)
    }
}
