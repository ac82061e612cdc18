use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capture::domain::capture_source::{CaptureConstraints, CaptureSource};
use crate::notify::domain::notifier::{Greeting, Notifier};
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::overlay::surface::OverlaySurface;
use crate::pipeline::loop_state::{LoopError, LoopState};
use crate::pipeline::scheduler::{SchedulePolicy, Scheduler};
use crate::session::domain::model_session::{ModelSession, SessionConfig, SessionLoader};
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Per-cycle observer: sees the frame, its detections, and the repainted
/// overlay. Returning `false` cancels the loop.
pub type CycleObserver =
    Box<dyn FnMut(u64, &Frame, &[Detection], &OverlaySurface) -> bool + Send>;

#[derive(Clone, Debug)]
pub struct LoopConfig {
    pub policy: SchedulePolicy,
    pub constraints: CaptureConstraints,
    pub session: SessionConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            policy: SchedulePolicy::FixedInterval(std::time::Duration::from_secs(1)),
            constraints: CaptureConstraints::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Drives the capture -> infer -> render cycle.
///
/// Owns its capture source, model session, and overlay surface exclusively;
/// one loop instance is one camera consumer. The loop is single-threaded
/// and a cycle runs to completion before the next is scheduled, so at most
/// one inference is ever in flight per session.
pub struct DetectionLoop {
    loader: Box<dyn SessionLoader>,
    capture: Box<dyn CaptureSource>,
    renderer: Box<dyn OverlayRenderer>,
    notifier: Option<(Box<dyn Notifier>, Greeting)>,
    config: LoopConfig,
    surface: OverlaySurface,
    session: Option<Box<dyn ModelSession>>,
    state: LoopState,
    last_error: Option<String>,
    greeted: bool,
    cancelled: Arc<AtomicBool>,
    observer: Option<CycleObserver>,
    cycle_index: u64,
}

impl DetectionLoop {
    pub fn new(
        loader: Box<dyn SessionLoader>,
        capture: Box<dyn CaptureSource>,
        renderer: Box<dyn OverlayRenderer>,
        config: LoopConfig,
    ) -> Self {
        Self {
            loader,
            capture,
            renderer,
            notifier: None,
            config,
            surface: OverlaySurface::new(),
            session: None,
            state: LoopState::Idle,
            last_error: None,
            greeted: false,
            cancelled: Arc::new(AtomicBool::new(false)),
            observer: None,
            cycle_index: 0,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>, greeting: Greeting) -> Self {
        self.notifier = Some((notifier, greeting));
        self
    }

    pub fn with_observer(mut self, observer: CycleObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Use an externally owned cancel flag, e.g. one stored by a signal
    /// handler.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Shared flag for requesting teardown from another thread.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn surface(&self) -> &OverlaySurface {
        &self.surface
    }

    pub fn has_greeted(&self) -> bool {
        self.greeted
    }

    /// Human-readable status reflecting the current state and, in Error,
    /// the fatal failure's category.
    pub fn status(&self) -> String {
        match self.state {
            LoopState::Idle => "idle".to_string(),
            LoopState::Initializing => "loading model and starting camera...".to_string(),
            LoopState::Ready => "camera active".to_string(),
            LoopState::Running => "detecting".to_string(),
            LoopState::Error => match &self.last_error {
                Some(e) => format!("error: {e}"),
                None => "error".to_string(),
            },
        }
    }

    /// Acquire the model session, then the camera. The camera is never
    /// touched if the model fails to load.
    ///
    /// Starting begins a new loop lifetime: a previous `stop`'s
    /// cancellation and the one-shot greeting flag are cleared, so a
    /// restarted loop cycles and greets again.
    pub fn start(&mut self) -> Result<(), LoopError> {
        self.cancelled.store(false, Ordering::Relaxed);
        self.greeted = false;
        self.cycle_index = 0;
        self.last_error = None;
        self.state = LoopState::Initializing;
        log::info!("{}", self.status());

        let session = match self.loader.load(&self.config.session) {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.session = Some(session);

        if let Err(e) = self.capture.open(self.config.constraints) {
            // Model memory is not leaked on a camera failure.
            if let Some(mut session) = self.session.take() {
                session.dispose();
            }
            return Err(self.fail(e.into()));
        }

        self.state = LoopState::Ready;
        log::info!("{}", self.status());
        Ok(())
    }

    fn fail(&mut self, e: LoopError) -> LoopError {
        self.state = LoopState::Error;
        log::error!("{e}");
        // Keep the message for status(); the error itself propagates.
        self.last_error = Some(e.to_string());
        e
    }

    /// One capture -> infer -> render cycle. Returns `false` when the loop
    /// should stop (cancelled or the observer declined to continue).
    pub fn run_cycle(&mut self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return false;
        }

        // Both collaborators must be ready; otherwise skip and reschedule.
        if !self.capture.is_ready() {
            log::debug!("cycle skipped: capture not ready");
            return true;
        }

        if let Some((w, h)) = self.capture.dimensions() {
            self.surface.ensure_size(w, h);
        }

        let frame = match self.capture.frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::debug!("cycle skipped: no frame yet");
                return true;
            }
            Err(e) => {
                // Transient: this cycle produces nothing, the loop goes on.
                log::warn!("frame read failed: {e}");
                return true;
            }
        };

        if self.state == LoopState::Ready {
            self.state = LoopState::Running;
        }

        let Some(session) = self.session.as_mut() else {
            log::debug!("cycle skipped: no model session");
            return true;
        };
        let detections = match session.infer(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("inference failed on frame {}: {e}", frame.index());
                Vec::new()
            }
        };

        // Teardown may have been requested while inference was in flight;
        // its result must not touch the surface or the one-shot flag.
        if self.cancelled.load(Ordering::Relaxed) {
            return false;
        }

        self.renderer.render(&mut self.surface, &detections);

        if !self.greeted && !detections.is_empty() {
            self.greeted = true;
            self.send_greeting();
        }

        let index = self.cycle_index;
        self.cycle_index += 1;
        match self.observer.as_mut() {
            Some(observer) => observer(index, &frame, &detections, &self.surface),
            None => true,
        }
    }

    /// Fire-and-forget; a failed POST is logged and never retried.
    fn send_greeting(&mut self) {
        let Some((notifier, greeting)) = self.notifier.as_ref() else {
            return;
        };

        log::info!("first detection: sending greeting");
        match notifier.send_text(&greeting.text) {
            Ok(body) => log::info!("greeting delivered: {body}"),
            Err(e) => log::warn!("greeting failed: {e}"),
        }

        if let Some(clip) = &greeting.audio_clip {
            match notifier.send_audio_clip(clip) {
                Ok(body) => log::info!("audio clip delivered: {body}"),
                Err(e) => log::warn!("audio clip failed: {e}"),
            }
        }
    }

    /// Initialize, then cycle until cancelled or the observer stops the
    /// loop. Teardown always runs on the way out.
    pub fn run(&mut self) -> Result<(), LoopError> {
        self.start()?;

        let scheduler = Scheduler::new(self.config.policy);
        loop {
            scheduler.wait();
            if !self.run_cycle() {
                break;
            }
        }

        self.stop();
        Ok(())
    }

    /// Teardown: cancel the pending cycle, stop the capture device, dispose
    /// the model session — in that order, each step independent of the
    /// others. Idempotent.
    pub fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.capture.stop();
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
        self.state = LoopState::Idle;
        log::info!("loop stopped");
    }
}
