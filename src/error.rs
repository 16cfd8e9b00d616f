use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

use crate::model::SurfaceRole;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    /// The 2D context of a surface's canvas could not be acquired.
    #[error("could not get a 2d drawing context for the {role} surface")]
    SurfaceContextUnavailable { role: SurfaceRole },
    /// Camera permission was denied or no device is present.
    #[error("Camera not available")]
    CameraUnavailable,
    #[error("hand detection model failed to load: {0}")]
    ModelLoad(String),
    #[error("hand detection model is still loading")]
    ModelNotLoaded,
    #[error("hand detection pass failed: {0}")]
    Detection(String),
    #[error("invalid stroke color {0:?}, expected #rrggbb")]
    InvalidColor(String),
    #[error("could not attach event listener: {0}")]
    Subscription(String),
}

impl BoardError {
    /// Errors that leave the board unusable and must replace it with the
    /// fallback notice.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BoardError::SurfaceContextUnavailable { .. })
    }
}

/// Best-effort message extraction from a thrown JS value.
pub fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_surface_failures_are_fatal() {
        assert!(
            BoardError::SurfaceContextUnavailable {
                role: SurfaceRole::Undotted
            }
            .is_fatal()
        );
        assert!(!BoardError::CameraUnavailable.is_fatal());
        assert!(!BoardError::ModelLoad("404".into()).is_fatal());
    }

    #[test]
    fn messages_name_the_failing_surface() {
        let err = BoardError::SurfaceContextUnavailable {
            role: SurfaceRole::Dotted,
        };
        assert_eq!(
            err.to_string(),
            "could not get a 2d drawing context for the dotted surface"
        );
        assert_eq!(BoardError::CameraUnavailable.to_string(), "Camera not available");
    }
}
