//! Core data types for the drawing board: surfaces, stroke styling,
//! detection results and the board-level settings reducer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use yew::Reducible;

use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::state::GesturePhase;

pub const MIN_THICKNESS: u8 = 1;
pub const MAX_THICKNESS: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRole {
    /// Every sample becomes an independent dot.
    Dotted,
    /// Samples are chained into a connected stroke.
    Undotted,
}

impl SurfaceRole {
    #[cfg(test)]
    pub const ALL: [SurfaceRole; 2] = [SurfaceRole::Dotted, SurfaceRole::Undotted];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceRole::Dotted => "dotted",
            SurfaceRole::Undotted => "undotted",
        }
    }
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeStyle {
    color: String,
    thickness: u8,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            thickness: MIN_THICKNESS,
        }
    }
}

impl StrokeStyle {
    pub fn new(color: &str, thickness: u8) -> Result<Self, BoardError> {
        Ok(Self::default()
            .with_color(color)?
            .with_thickness(thickness))
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn thickness(&self) -> u8 {
        self.thickness
    }

    /// Thickness outside 1..=10 is clamped.
    pub fn with_thickness(mut self, thickness: u8) -> Self {
        self.thickness = thickness.clamp(MIN_THICKNESS, MAX_THICKNESS);
        self
    }

    pub fn with_color(mut self, color: &str) -> Result<Self, BoardError> {
        if !is_hex_color(color) {
            return Err(BoardError::InvalidColor(color.to_string()));
        }
        self.color = color.to_ascii_lowercase();
        Ok(self)
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Live parameters of the hand detection model, serialized with the
/// field names handtrack.js expects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelParams {
    pub flip_horizontal: bool,
    pub image_scale_factor: f64,
    pub max_num_boxes: u32,
    pub iou_threshold: f64,
    pub score_threshold: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            flip_horizontal: true,
            image_scale_factor: 0.7,
            max_num_boxes: 20,
            iou_threshold: 0.5,
            score_threshold: 0.7,
        }
    }
}

/// Maps the 1..=99 threshold slider onto 0.01..=0.99.
pub fn threshold_from_percent(percent: u8) -> f64 {
    f64::from(percent.clamp(1, 99)) / 100.0
}

pub fn threshold_to_percent(threshold: f64) -> u8 {
    (threshold * 100.0).round().clamp(1.0, 99.0) as u8
}

/// One detected hand: `bbox` is `[x, y, width, height]`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Prediction {
    pub bbox: [f64; 4],
    pub score: f64,
    #[serde(default)]
    pub class: String,
}

impl Prediction {
    #[cfg(test)]
    pub fn new(x: f64, y: f64, width: f64, height: f64, score: f64) -> Self {
        Self {
            bbox: [x, y, width, height],
            score,
            class: "hand".to_string(),
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.bbox[0], self.bbox[1])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModelStatus {
    #[default]
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoardState {
    pub style: StrokeStyle,
    pub size: SurfaceSize,
    pub model_params: ModelParams,
    pub model_status: ModelStatus,
    pub phase: GesturePhase,
    pub notice: Option<String>,
}

impl BoardState {
    pub fn from_config(cfg: &BoardConfig) -> Self {
        Self {
            style: cfg.initial_style(),
            size: SurfaceSize::square(cfg.layout.regular),
            model_params: cfg.model,
            model_status: ModelStatus::Loading,
            phase: GesturePhase::Stopped,
            notice: None,
        }
    }

    /// Parameters the live model should be running with, once there is one.
    /// Changes made while the model was loading are included.
    pub fn params_to_push(&self) -> Option<ModelParams> {
        (self.model_status == ModelStatus::Ready).then_some(self.model_params)
    }
}

pub enum BoardAction {
    SetThickness(u8),
    SetColor(String),
    SetThresholdPercent(u8),
    SetFlip(bool),
    Resize(SurfaceSize),
    ModelLoaded,
    ModelFailed,
    SetPhase(GesturePhase),
    ShowNotice(String),
    DismissNotice,
}

impl Reducible for BoardState {
    type Action = BoardAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use BoardAction::*;
        let mut new = (*self).clone();
        match action {
            SetThickness(t) => new.style = new.style.with_thickness(t),
            SetColor(c) => match new.style.clone().with_color(&c) {
                Ok(style) => new.style = style,
                Err(e) => new.notice = Some(e.to_string()),
            },
            SetThresholdPercent(p) => new.model_params.score_threshold = threshold_from_percent(p),
            SetFlip(f) => new.model_params.flip_horizontal = f,
            Resize(size) => new.size = size,
            ModelLoaded => new.model_status = ModelStatus::Ready,
            ModelFailed => new.model_status = ModelStatus::Failed,
            SetPhase(p) => new.phase = p,
            ShowNotice(msg) => new.notice = Some(msg),
            DismissNotice => new.notice = None,
        }
        if new == *self {
            return self;
        }
        Rc::new(new)
    }
}
