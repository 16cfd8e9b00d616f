//! Browser side of gesture drawing: camera, detection loop and draw tick.
//!
//! The detection loop runs one inference pass per animation frame; the draw
//! tick runs on a fixed interval and traces the smoothed hand position on the
//! undotted surface. The two are not synchronized with each other.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlVideoElement, Window};

use crate::error::{BoardError, js_message};
use crate::handtrack::{HandModel, VideoFeed};
use crate::listeners::IntervalHandle;
use crate::model::{ModelParams, SurfaceRole};
use crate::state::{GesturePhase, GestureTracker};
use crate::surface::SurfaceRegistry;

pub type SharedSurfaces = Rc<RefCell<SurfaceRegistry<CanvasRenderingContext2d>>>;
pub type SharedTracker = Rc<RefCell<GestureTracker>>;

struct LoopInner {
    window: Window,
    model: Rc<HandModel>,
    video: HtmlVideoElement,
    tracker: SharedTracker,
    session: u64,
    frame: RefCell<Option<Closure<dyn FnMut()>>>,
    raf_id: Cell<Option<i32>>,
}

impl LoopInner {
    fn schedule_next(&self) {
        if !self.tracker.borrow().is_live(self.session) {
            return;
        }
        let frame = self.frame.borrow();
        let Some(cb) = frame.as_ref() else {
            return;
        };
        match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(e) => log::warn!("could not schedule detection: {}", js_message(&e)),
        }
    }
}

fn run_pass(inner: Rc<LoopInner>) {
    spawn_local(async move {
        match inner.model.detect(&inner.video).await {
            Ok(candidates) => {
                let pos = inner.tracker.borrow_mut().accept(inner.session, &candidates);
                if let Some(p) = pos {
                    log::trace!("hand at ({:.1}, {:.1}) from {} boxes", p.x, p.y, candidates.len());
                }
            }
            Err(e) => log::warn!("{e}"),
        }
        inner.schedule_next();
    });
}

/// Self-rescheduling detection passes for one session.
struct DetectionLoop {
    inner: Rc<LoopInner>,
}

impl DetectionLoop {
    fn start(
        window: Window,
        model: Rc<HandModel>,
        video: HtmlVideoElement,
        tracker: SharedTracker,
        session: u64,
    ) -> Self {
        let inner = Rc::new(LoopInner {
            window,
            model,
            video,
            tracker,
            session,
            frame: RefCell::new(None),
            raf_id: Cell::new(None),
        });
        let weak: Weak<LoopInner> = Rc::downgrade(&inner);
        *inner.frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.raf_id.set(None);
                run_pass(inner);
            }
        }) as Box<dyn FnMut()>));
        run_pass(inner.clone());
        Self { inner }
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        if let Some(id) = self.inner.raf_id.take() {
            let _ = self.inner.window.cancel_animation_frame(id);
        }
        self.inner.frame.borrow_mut().take();
    }
}

/// Everything a running gesture session holds. Dropping it cancels the draw
/// tick, then the detection loop, then releases the camera.
struct GestureSession {
    _tick: IntervalHandle,
    _detection: DetectionLoop,
    _feed: VideoFeed,
}

impl GestureSession {
    fn launch(
        feed: VideoFeed,
        model: Rc<HandModel>,
        tracker: SharedTracker,
        surfaces: SharedSurfaces,
        session: u64,
        tick_ms: u32,
    ) -> Result<Self, BoardError> {
        let window = web_sys::window()
            .ok_or_else(|| BoardError::Subscription("no global window".into()))?;
        let tick = {
            let tracker = tracker.clone();
            let model = model.clone();
            IntervalHandle::new(&window, tick_ms, move || {
                let Some(p) = tracker.borrow().tick_point(session) else {
                    return;
                };
                if let Some(s) = surfaces.borrow_mut().get_mut(SurfaceRole::Undotted) {
                    s.trace(p);
                }
                log::debug!("detector at {:.1} fps", model.fps());
            })?
        };
        let detection = DetectionLoop::start(window, model, feed.video().clone(), tracker, session);
        Ok(Self {
            _tick: tick,
            _detection: detection,
            _feed: feed,
        })
    }
}

/// Owns the model, the tracker and the current session for one board.
#[derive(Clone)]
pub struct GestureController {
    tracker: SharedTracker,
    surfaces: SharedSurfaces,
    model: Rc<RefCell<Option<Rc<HandModel>>>>,
    active: Rc<RefCell<Option<GestureSession>>>,
    tick_ms: u32,
}

impl GestureController {
    pub fn new(surfaces: SharedSurfaces, tick_ms: u32) -> Self {
        Self {
            tracker: Rc::new(RefCell::new(GestureTracker::default())),
            surfaces,
            model: Rc::new(RefCell::new(None)),
            active: Rc::new(RefCell::new(None)),
            tick_ms,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.tracker.borrow().phase()
    }

    pub fn set_model(&self, model: HandModel) {
        *self.model.borrow_mut() = Some(Rc::new(model));
    }

    pub fn set_params(&self, params: &ModelParams) {
        if let Some(model) = self.model.borrow().as_ref() {
            model.set_params(params);
        }
    }

    /// Acquires the camera and starts drawing from it. Does nothing when a
    /// session is already starting or running.
    pub async fn start(&self, video: HtmlVideoElement) -> Result<(), BoardError> {
        let model = self.model.borrow().clone().ok_or(BoardError::ModelNotLoaded)?;
        let Some(session) = self.tracker.borrow_mut().begin_start() else {
            return Ok(());
        };
        let feed = match VideoFeed::start(video).await {
            Ok(feed) => feed,
            Err(e) => {
                self.tracker.borrow_mut().camera_failed(session);
                return Err(e);
            }
        };
        if !self.tracker.borrow_mut().camera_ready(session) {
            log::info!("gesture session {session} stopped before the camera came up");
            return Ok(());
        }
        match GestureSession::launch(
            feed,
            model,
            self.tracker.clone(),
            self.surfaces.clone(),
            session,
            self.tick_ms,
        ) {
            Ok(s) => {
                *self.active.borrow_mut() = Some(s);
                log::info!("gesture session {session} running");
                Ok(())
            }
            Err(e) => {
                self.tracker.borrow_mut().stop();
                Err(e)
            }
        }
    }

    /// Safe to call in any phase. Returns whether anything was stopped.
    pub fn stop(&self) -> bool {
        let stopped = self.tracker.borrow_mut().stop();
        let session = self.active.borrow_mut().take();
        drop(session);
        stopped
    }

    /// Stops any session and disposes the model.
    pub fn shutdown(&self) {
        self.stop();
        let model = self.model.borrow_mut().take();
        drop(model);
    }
}
