//! Gesture tracking state, independent of the browser.
//!
//! [`GestureTracker`] owns the `Stopped -> Starting -> Running` lifecycle and
//! the smoothed hand position. The browser driver in `crate::gesture` asks it
//! whether to keep scheduling work; every camera start opens a new session
//! number so callbacks left over from an earlier session see themselves as
//! dead even if the tracker is running again.

use std::cmp::Ordering;

use crate::model::{Point, Prediction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Stopped,
    /// Waiting for camera permission.
    Starting,
    Running,
}

/// Two-term running average: `pos = (pos + sample) / 2`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct RunningPosition {
    pos: Point,
}

impl RunningPosition {
    pub fn current(&self) -> Point {
        self.pos
    }

    pub fn update(&mut self, sample: Point) -> Point {
        self.pos = Point::new((self.pos.x + sample.x) / 2.0, (self.pos.y + sample.y) / 2.0);
        self.pos
    }

    pub fn reset(&mut self) {
        self.pos = Point::default();
    }
}

/// `a` ranks first only when it is strictly above and left of `b`; every
/// other pair, including incomparable ones, ranks `b` first.
fn rank(a: &Prediction, b: &Prediction) -> Ordering {
    let (a, b) = (a.top_left(), b.top_left());
    if a.x < b.x && a.y < b.y {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Picks the top-left-most candidate, folding in arrival order. This is not
/// a total order: of two incomparable boxes the later one wins.
pub fn best_prediction(candidates: &[Prediction]) -> Option<&Prediction> {
    candidates.iter().reduce(|best, next| match rank(best, next) {
        Ordering::Less => best,
        _ => next,
    })
}

#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    phase: GesturePhase,
    session: u64,
    position: RunningPosition,
}

impl GestureTracker {
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    #[cfg(test)]
    pub fn session(&self) -> u64 {
        self.session
    }

    #[cfg(test)]
    pub fn position(&self) -> Point {
        self.position.current()
    }

    /// `Stopped -> Starting`. Returns the new session, or `None` when a
    /// session is already starting or running.
    pub fn begin_start(&mut self) -> Option<u64> {
        if self.phase != GesturePhase::Stopped {
            return None;
        }
        self.session += 1;
        self.phase = GesturePhase::Starting;
        self.position.reset();
        Some(self.session)
    }

    /// `Starting -> Running` once the camera is up. Returns `false` when the
    /// session was stopped while waiting; the caller must then release the
    /// camera it just acquired.
    pub fn camera_ready(&mut self, session: u64) -> bool {
        if self.phase != GesturePhase::Starting || self.session != session {
            return false;
        }
        self.phase = GesturePhase::Running;
        true
    }

    pub fn camera_failed(&mut self, session: u64) {
        if self.phase == GesturePhase::Starting && self.session == session {
            self.phase = GesturePhase::Stopped;
        }
    }

    /// Returns whether there was anything to stop.
    pub fn stop(&mut self) -> bool {
        if self.phase == GesturePhase::Stopped {
            return false;
        }
        self.phase = GesturePhase::Stopped;
        true
    }

    pub fn is_live(&self, session: u64) -> bool {
        self.phase == GesturePhase::Running && self.session == session
    }

    /// Folds one inference pass into the running position.
    pub fn accept(&mut self, session: u64, candidates: &[Prediction]) -> Option<Point> {
        if !self.is_live(session) {
            return None;
        }
        let best = best_prediction(candidates)?;
        Some(self.position.update(best.top_left()))
    }

    /// The point the draw tick should trace, if running.
    pub fn tick_point(&self, session: u64) -> Option<Point> {
        self.is_live(session).then(|| self.position.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x: f64, y: f64) -> Prediction {
        Prediction::new(x, y, 40.0, 40.0, 0.9)
    }

    fn running() -> (GestureTracker, u64) {
        let mut t = GestureTracker::default();
        let s = t.begin_start().unwrap();
        assert!(t.camera_ready(s));
        (t, s)
    }

    #[test]
    fn running_average_halves_toward_each_sample() {
        let mut pos = RunningPosition::default();
        assert_eq!(pos.update(Point::new(10.0, 10.0)), Point::new(5.0, 5.0));
        assert_eq!(pos.update(Point::new(20.0, 20.0)), Point::new(12.5, 12.5));
    }

    #[test]
    fn top_left_most_box_wins() {
        let preds = [boxed(5.0, 5.0), boxed(1.0, 1.0)];
        assert_eq!(best_prediction(&preds).unwrap().top_left(), Point::new(1.0, 1.0));
        let preds = [boxed(1.0, 1.0), boxed(5.0, 5.0), boxed(3.0, 3.0)];
        assert_eq!(best_prediction(&preds).unwrap().top_left(), Point::new(1.0, 1.0));
    }

    #[test]
    fn incomparable_boxes_resolve_to_the_later_one() {
        let preds = [boxed(5.0, 1.0), boxed(1.0, 5.0)];
        assert_eq!(best_prediction(&preds).unwrap().top_left(), Point::new(1.0, 5.0));
        let preds = [boxed(1.0, 5.0), boxed(5.0, 1.0)];
        assert_eq!(best_prediction(&preds).unwrap().top_left(), Point::new(5.0, 1.0));
        let preds = [boxed(2.0, 2.0), boxed(2.0, 2.0)];
        assert!(std::ptr::eq(best_prediction(&preds).unwrap(), &preds[1]));
    }

    #[test]
    fn no_candidates_no_winner() {
        assert!(best_prediction(&[]).is_none());
        let (mut t, s) = running();
        assert_eq!(t.accept(s, &[]), None);
        assert_eq!(t.position(), Point::default());
    }

    #[test]
    fn stop_before_start_is_a_no_op() {
        let mut t = GestureTracker::default();
        assert!(!t.stop());
        assert_eq!(t.phase(), GesturePhase::Stopped);
        assert_eq!(t.session(), 0);
        assert_eq!(t.tick_point(0), None);
    }

    #[test]
    fn lifecycle_runs_and_stops() {
        let (mut t, s) = running();
        assert_eq!(t.phase(), GesturePhase::Running);
        assert_eq!(t.accept(s, &[boxed(10.0, 10.0)]), Some(Point::new(5.0, 5.0)));
        assert_eq!(t.tick_point(s), Some(Point::new(5.0, 5.0)));
        assert!(t.stop());
        assert!(!t.is_live(s));
        assert_eq!(t.accept(s, &[boxed(20.0, 20.0)]), None);
        assert!(!t.stop());
    }

    #[test]
    fn camera_failure_returns_to_stopped() {
        let mut t = GestureTracker::default();
        let s = t.begin_start().unwrap();
        assert_eq!(t.begin_start(), None);
        t.camera_failed(s);
        assert_eq!(t.phase(), GesturePhase::Stopped);
        assert!(t.begin_start().is_some());
    }

    #[test]
    fn stop_while_starting_rejects_late_camera() {
        let mut t = GestureTracker::default();
        let s = t.begin_start().unwrap();
        assert!(t.stop());
        assert!(!t.camera_ready(s));
        assert_eq!(t.phase(), GesturePhase::Stopped);
    }

    #[test]
    fn old_session_stays_dead_after_restart() {
        let (mut t, old) = running();
        t.accept(old, &[boxed(8.0, 8.0)]);
        t.stop();
        let new = t.begin_start().unwrap();
        assert!(t.camera_ready(new));
        assert!(!t.is_live(old));
        assert!(t.is_live(new));
        assert_eq!(t.position(), Point::default());
    }
}
