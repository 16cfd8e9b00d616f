//! Raster drawing surfaces and the per-surface path state machine.
//!
//! A [`Surface`] wraps any [`RasterContext`]; the browser implementation is
//! `CanvasRenderingContext2d`. All surfaces live in a [`SurfaceRegistry`]
//! keyed by [`SurfaceRole`], which keeps their size and style in lockstep.

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::BoardError;
use crate::model::{Point, StrokeStyle, SurfaceRole, SurfaceSize};

/// The drawing primitives a surface needs from its backing raster.
pub trait RasterContext {
    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn stroke(&mut self);
    fn fill_circle(&mut self, center: Point, radius: f64);
    /// Sets both stroke and fill color.
    fn set_color(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn clear(&mut self);
    /// Reallocates the backing store. Content and context state are lost.
    fn resize(&mut self, size: SurfaceSize);
}

impl RasterContext for CanvasRenderingContext2d {
    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, p: Point) {
        CanvasRenderingContext2d::move_to(self, p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        CanvasRenderingContext2d::line_to(self, p.x, p.y);
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn fill_circle(&mut self, center: Point, radius: f64) {
        CanvasRenderingContext2d::begin_path(self);
        if self.arc(center.x, center.y, radius, 0.0, 2.0 * PI).is_ok() {
            self.fill();
        }
    }

    fn set_color(&mut self, color: &str) {
        self.set_stroke_style_str(color);
        self.set_fill_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn clear(&mut self) {
        if let Some(canvas) = self.canvas() {
            self.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
        }
    }

    fn resize(&mut self, size: SurfaceSize) {
        if let Some(canvas) = self.canvas() {
            canvas.set_width(size.width);
            canvas.set_height(size.height);
        }
    }
}

/// Acquires the 2D context of a mounted canvas.
pub fn acquire_context(
    canvas: &HtmlCanvasElement,
    role: SurfaceRole,
) -> Result<CanvasRenderingContext2d, BoardError> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or(BoardError::SurfaceContextUnavailable { role })
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum PathState {
    #[default]
    Idle,
    /// An open path. `last` is `None` until the first point arrives.
    Tracing { last: Option<Point> },
}

pub struct Surface<C> {
    role: SurfaceRole,
    ctx: C,
    path: PathState,
    dot_radius: f64,
}

impl<C: RasterContext> Surface<C> {
    pub fn new(role: SurfaceRole, ctx: C) -> Self {
        Self {
            role,
            ctx,
            path: PathState::Idle,
            dot_radius: 1.0,
        }
    }

    pub fn with_dot_radius(mut self, radius: f64) -> Self {
        self.dot_radius = radius;
        self
    }

    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    #[cfg(test)]
    pub fn path(&self) -> PathState {
        self.path
    }

    #[cfg(test)]
    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// Opens a fresh path. An anchor places the pen without drawing.
    pub fn pen_down(&mut self, anchor: Option<Point>) {
        self.ctx.begin_path();
        if let Some(p) = anchor {
            self.ctx.move_to(p);
        }
        self.path = PathState::Tracing { last: anchor };
    }

    /// Feeds one coordinate. Returns whether anything was drawn.
    pub fn feed(&mut self, p: Point) -> bool {
        match (self.role, self.path) {
            (SurfaceRole::Dotted, _) => {
                self.ctx.fill_circle(p, self.dot_radius);
                true
            }
            (SurfaceRole::Undotted, PathState::Idle) => false,
            (SurfaceRole::Undotted, PathState::Tracing { last: None }) => {
                self.ctx.move_to(p);
                self.path = PathState::Tracing { last: Some(p) };
                false
            }
            (SurfaceRole::Undotted, PathState::Tracing { last: Some(_) }) => {
                self.ctx.line_to(p);
                self.ctx.stroke();
                self.path = PathState::Tracing { last: Some(p) };
                true
            }
        }
    }

    /// Feeds a coordinate, opening a path first if none is open.
    pub fn trace(&mut self, p: Point) -> bool {
        if self.path == PathState::Idle {
            self.pen_down(None);
        }
        self.feed(p)
    }

    pub fn pen_up(&mut self) {
        self.ctx.begin_path();
        self.path = PathState::Idle;
    }

    pub fn clear(&mut self) {
        self.ctx.clear();
        self.pen_up();
    }

    fn apply_style(&mut self, style: &StrokeStyle) {
        self.ctx.set_color(style.color());
        self.ctx.set_line_width(f64::from(style.thickness()));
    }

    fn resize(&mut self, size: SurfaceSize, style: &StrokeStyle) {
        self.ctx.resize(size);
        self.path = PathState::Idle;
        self.apply_style(style);
    }
}

/// Surfaces addressed by role, sharing one size and one stroke style.
pub struct SurfaceRegistry<C> {
    surfaces: HashMap<SurfaceRole, Surface<C>>,
    size: SurfaceSize,
    style: StrokeStyle,
}

impl<C: RasterContext> SurfaceRegistry<C> {
    pub fn new(size: SurfaceSize, style: StrokeStyle) -> Self {
        Self {
            surfaces: HashMap::new(),
            size,
            style,
        }
    }

    /// Registers a surface, bringing it to the shared size and style.
    /// Replaces any surface previously registered under the same role.
    pub fn insert(&mut self, mut surface: Surface<C>) {
        surface.resize(self.size, &self.style);
        log::debug!("registered {} surface", surface.role());
        self.surfaces.insert(surface.role(), surface);
    }

    #[cfg(test)]
    pub fn get(&self, role: SurfaceRole) -> Option<&Surface<C>> {
        self.surfaces.get(&role)
    }

    pub fn get_mut(&mut self, role: SurfaceRole) -> Option<&mut Surface<C>> {
        self.surfaces.get_mut(&role)
    }

    #[cfg(test)]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    #[cfg(test)]
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: StrokeStyle) {
        if style == self.style {
            return;
        }
        for s in self.surfaces.values_mut() {
            s.apply_style(&style);
        }
        self.style = style;
    }

    /// Resizes every surface. Existing ink is lost; resizing to the current
    /// size does nothing.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size == self.size {
            return;
        }
        self.size = size;
        for s in self.surfaces.values_mut() {
            s.resize(size, &self.style);
        }
        log::info!("surfaces resized to {}x{}", size.width, size.height);
    }

    pub fn clear_all(&mut self) {
        for s in self.surfaces.values_mut() {
            s.clear();
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        BeginPath,
        MoveTo(Point),
        LineTo(Point),
        Stroke,
        Circle(Point, f64),
        Color(String),
        LineWidth(f64),
        Clear,
        Resize(SurfaceSize),
    }

    /// Test double that records every primitive it receives.
    #[derive(Default, Debug)]
    pub struct RecordingContext {
        pub ops: Vec<Op>,
    }

    impl RecordingContext {
        pub fn segments(&self) -> usize {
            self.ops.iter().filter(|op| matches!(op, Op::LineTo(_))).count()
        }

        pub fn circles(&self) -> usize {
            self.ops.iter().filter(|op| matches!(op, Op::Circle(..))).count()
        }

        /// Ops recorded after the most recent clear or resize.
        pub fn visible_ink(&self) -> &[Op] {
            let start = self
                .ops
                .iter()
                .rposition(|op| matches!(op, Op::Clear | Op::Resize(_)))
                .map_or(0, |i| i + 1);
            &self.ops[start..]
        }
    }

    impl RasterContext for RecordingContext {
        fn begin_path(&mut self) {
            self.ops.push(Op::BeginPath);
        }
        fn move_to(&mut self, p: Point) {
            self.ops.push(Op::MoveTo(p));
        }
        fn line_to(&mut self, p: Point) {
            self.ops.push(Op::LineTo(p));
        }
        fn stroke(&mut self) {
            self.ops.push(Op::Stroke);
        }
        fn fill_circle(&mut self, center: Point, radius: f64) {
            self.ops.push(Op::Circle(center, radius));
        }
        fn set_color(&mut self, color: &str) {
            self.ops.push(Op::Color(color.to_string()));
        }
        fn set_line_width(&mut self, width: f64) {
            self.ops.push(Op::LineWidth(width));
        }
        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }
        fn resize(&mut self, size: SurfaceSize) {
            self.ops.push(Op::Resize(size));
        }
    }

    pub fn registry() -> SurfaceRegistry<RecordingContext> {
        let mut reg = SurfaceRegistry::new(SurfaceSize::square(350), StrokeStyle::default());
        for role in SurfaceRole::ALL {
            reg.insert(Surface::new(role, RecordingContext::default()));
        }
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{registry, Op, RecordingContext};
    use super::*;

    const P1: Point = Point::new(10.0, 10.0);
    const P2: Point = Point::new(20.0, 15.0);
    const P3: Point = Point::new(30.0, 25.0);

    #[test]
    fn undotted_chains_points_into_segments() {
        let mut s = Surface::new(SurfaceRole::Undotted, RecordingContext::default());
        s.pen_down(None);
        assert!(!s.feed(P1));
        assert!(s.feed(P2));
        assert!(s.feed(P3));
        s.pen_up();
        assert_eq!(s.context().segments(), 2);
        assert_eq!(s.path(), PathState::Idle);
        assert_eq!(s.context().ops.last(), Some(&Op::BeginPath));
    }

    #[test]
    fn anchor_moves_pen_without_drawing() {
        let mut s = Surface::new(SurfaceRole::Undotted, RecordingContext::default());
        s.pen_down(Some(P1));
        assert_eq!(s.context().segments(), 0);
        assert_eq!(s.path(), PathState::Tracing { last: Some(P1) });
        assert!(s.feed(P2));
        assert_eq!(s.context().segments(), 1);
    }

    #[test]
    fn undotted_ignores_points_while_idle() {
        let mut s = Surface::new(SurfaceRole::Undotted, RecordingContext::default());
        assert!(!s.feed(P1));
        assert!(!s.feed(P2));
        assert!(s.context().ops.is_empty());
    }

    #[test]
    fn dotted_draws_independent_dots_with_or_without_path() {
        let mut s = Surface::new(SurfaceRole::Dotted, RecordingContext::default());
        s.feed(P1);
        s.pen_down(None);
        s.feed(P2);
        s.feed(P3);
        assert_eq!(s.context().circles(), 3);
        assert_eq!(s.context().segments(), 0);
        assert!(s.context().ops.contains(&Op::Circle(P3, 1.0)));
        assert!(matches!(s.path(), PathState::Tracing { .. }));
    }

    #[test]
    fn trace_opens_a_path_when_idle() {
        let mut s = Surface::new(SurfaceRole::Undotted, RecordingContext::default());
        assert!(!s.trace(P1));
        assert!(s.trace(P2));
        assert_eq!(s.context().segments(), 1);
    }

    #[test]
    fn clear_resets_ink_and_path() {
        let mut reg = registry();
        let s = reg.get_mut(SurfaceRole::Undotted).unwrap();
        s.pen_down(None);
        s.feed(P1);
        s.feed(P2);
        reg.clear_all();
        for role in SurfaceRole::ALL {
            let s = reg.get(role).unwrap();
            assert_eq!(s.path(), PathState::Idle);
            assert_eq!(s.context().visible_ink(), &[Op::BeginPath]);
        }
        let s = reg.get_mut(SurfaceRole::Undotted).unwrap();
        assert!(!s.feed(P3));
    }

    #[test]
    fn style_applies_to_every_surface() {
        let mut reg = registry();
        reg.set_style(StrokeStyle::new("#00ff00", 6).unwrap());
        for role in SurfaceRole::ALL {
            let ops = &reg.get(role).unwrap().context().ops;
            assert!(ops.ends_with(&[Op::Color("#00ff00".into()), Op::LineWidth(6.0)]));
        }
    }

    #[test]
    fn resize_keeps_surfaces_in_registration_and_restores_style() {
        let mut reg = registry();
        reg.set_style(StrokeStyle::new("#123456", 3).unwrap());
        reg.get_mut(SurfaceRole::Undotted).unwrap().pen_down(Some(P1));
        reg.resize(SurfaceSize::square(200));
        assert_eq!(reg.size(), SurfaceSize::square(200));
        for role in SurfaceRole::ALL {
            let s = reg.get(role).unwrap();
            assert_eq!(s.path(), PathState::Idle);
            assert_eq!(
                s.context().visible_ink(),
                &[Op::Color("#123456".into()), Op::LineWidth(3.0)]
            );
        }
    }

    #[test]
    fn resize_to_same_size_keeps_ink() {
        let mut reg = registry();
        reg.get_mut(SurfaceRole::Dotted).unwrap().feed(P1);
        reg.resize(SurfaceSize::square(350));
        let ink = reg.get(SurfaceRole::Dotted).unwrap().context().visible_ink();
        assert!(ink.contains(&Op::Circle(P1, 1.0)));
    }

    #[test]
    fn inserted_surface_adopts_shared_size() {
        let reg = registry();
        let ops = &reg.get(SurfaceRole::Dotted).unwrap().context().ops;
        assert_eq!(ops[0], Op::Resize(SurfaceSize::square(350)));
    }
}
