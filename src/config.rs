//! Board configuration.
//!
//! Every field has a default; a host page may override any subset by
//! embedding `<script type="application/json" id="board-config">{..}</script>`.

use serde::Deserialize;

use crate::model::{ModelParams, StrokeStyle, SurfaceSize};

pub const CONFIG_ELEMENT_ID: &str = "board-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub model: ModelParams,
    pub draw_tick_ms: u32,
    pub dot_radius: f64,
    pub stroke_color: String,
    pub line_thickness: u8,
    pub layout: LayoutRule,
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            model: ModelParams::default(),
            draw_tick_ms: 300,
            dot_radius: 1.0,
            stroke_color: "#000000".to_string(),
            line_thickness: 1,
            layout: LayoutRule::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Viewport breakpoint deciding the shared surface size.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutRule {
    /// Viewports strictly narrower than this get `small`.
    pub breakpoint: f64,
    pub small: u32,
    pub regular: u32,
}

impl Default for LayoutRule {
    fn default() -> Self {
        Self {
            breakpoint: 400.0,
            small: 200,
            regular: 350,
        }
    }
}

impl LayoutRule {
    pub fn size_for_viewport(&self, viewport_width: f64) -> SurfaceSize {
        let side = if viewport_width < self.breakpoint {
            self.small
        } else {
            self.regular
        };
        SurfaceSize::square(side)
    }
}

impl BoardConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads overrides from the host page, falling back to defaults.
    pub fn load() -> Self {
        let raw = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());
        match raw {
            Some(raw) if !raw.trim().is_empty() => match Self::from_json(&raw) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("ignoring malformed #{CONFIG_ELEMENT_ID}: {e}");
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    pub fn initial_style(&self) -> StrokeStyle {
        StrokeStyle::new(&self.stroke_color, self.line_thickness).unwrap_or_else(|e| {
            log::warn!("{e}; using default stroke style");
            StrokeStyle::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_board() {
        let cfg = BoardConfig::default();
        assert_eq!(cfg.draw_tick_ms, 300);
        assert_eq!(cfg.model.score_threshold, 0.7);
        assert!(cfg.model.flip_horizontal);
        assert_eq!(cfg.initial_style(), StrokeStyle::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = BoardConfig::from_json(
            r##"{"draw_tick_ms": 120, "model": {"scoreThreshold": 0.5}, "log_level": "debug"}"##,
        )
        .unwrap();
        assert_eq!(cfg.draw_tick_ms, 120);
        assert_eq!(cfg.model.score_threshold, 0.5);
        assert!(cfg.model.flip_horizontal);
        assert_eq!(cfg.layout, LayoutRule::default());
        assert_eq!(cfg.log_level(), log::Level::Debug);
    }

    #[test]
    fn bad_color_falls_back_to_default_style() {
        let cfg = BoardConfig {
            stroke_color: "red".into(),
            ..Default::default()
        };
        assert_eq!(cfg.initial_style(), StrokeStyle::default());
    }

    #[test]
    fn breakpoint_is_exclusive_below() {
        let rule = LayoutRule::default();
        assert_eq!(rule.size_for_viewport(399.0), SurfaceSize::square(200));
        assert_eq!(rule.size_for_viewport(400.0), SurfaceSize::square(350));
        assert_eq!(rule.size_for_viewport(1920.0), SurfaceSize::square(350));
    }
}
