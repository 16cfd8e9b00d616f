//! Bindings to the handtrack.js global (`window.handTrack`) loaded by the
//! host page, wrapped into owned Rust handles.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlVideoElement;

use crate::error::{BoardError, js_message};
use crate::model::{ModelParams, Prediction};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = handTrack, js_name = load, catch)]
    fn ht_load(params: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = handTrack, js_name = startVideo, catch)]
    fn ht_start_video(video: &HtmlVideoElement) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = handTrack, js_name = stopVideo)]
    fn ht_stop_video();

    type JsModel;

    #[wasm_bindgen(method, catch)]
    fn detect(this: &JsModel, input: &HtmlVideoElement) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method, js_name = setModelParameters)]
    fn set_model_parameters(this: &JsModel, params: &JsValue);

    #[wasm_bindgen(method, js_name = getFPS)]
    fn get_fps(this: &JsModel) -> f64;

    #[wasm_bindgen(method)]
    fn dispose(this: &JsModel);
}

fn params_to_js(params: &ModelParams) -> Result<JsValue, BoardError> {
    let raw = serde_json::to_string(params).map_err(|e| BoardError::ModelLoad(e.to_string()))?;
    js_sys::JSON::parse(&raw).map_err(|e| BoardError::ModelLoad(js_message(&e)))
}

pub fn parse_predictions(raw: &str) -> Result<Vec<Prediction>, BoardError> {
    serde_json::from_str(raw).map_err(|e| BoardError::Detection(e.to_string()))
}

/// A loaded detection model. Disposed when dropped.
pub struct HandModel {
    inner: JsModel,
}

impl HandModel {
    pub async fn load(params: &ModelParams) -> Result<Self, BoardError> {
        let js_params = params_to_js(params)?;
        let promise = ht_load(&js_params).map_err(|e| BoardError::ModelLoad(js_message(&e)))?;
        let model = JsFuture::from(promise)
            .await
            .map_err(|e| BoardError::ModelLoad(js_message(&e)))?;
        log::info!("detection model loaded");
        Ok(Self {
            inner: model.unchecked_into::<JsModel>(),
        })
    }

    /// Runs one inference pass over the current video frame.
    pub async fn detect(&self, video: &HtmlVideoElement) -> Result<Vec<Prediction>, BoardError> {
        let promise = self
            .inner
            .detect(video)
            .map_err(|e| BoardError::Detection(js_message(&e)))?;
        let result = JsFuture::from(promise)
            .await
            .map_err(|e| BoardError::Detection(js_message(&e)))?;
        let raw = js_sys::JSON::stringify(&result)
            .map_err(|e| BoardError::Detection(js_message(&e)))?;
        parse_predictions(&String::from(raw))
    }

    /// Takes effect from the next `detect` call.
    pub fn set_params(&self, params: &ModelParams) {
        match params_to_js(params) {
            Ok(js) => self.inner.set_model_parameters(&js),
            Err(e) => log::warn!("model parameters not applied: {e}"),
        }
    }

    pub fn fps(&self) -> f64 {
        self.inner.get_fps()
    }
}

impl Drop for HandModel {
    fn drop(&mut self) {
        self.inner.dispose();
        log::debug!("detection model disposed");
    }
}

/// The running camera stream feeding a video element. Stopped when dropped.
pub struct VideoFeed {
    video: HtmlVideoElement,
}

impl VideoFeed {
    pub async fn start(video: HtmlVideoElement) -> Result<Self, BoardError> {
        let promise = ht_start_video(&video).map_err(|e| {
            log::warn!("startVideo threw: {}", js_message(&e));
            BoardError::CameraUnavailable
        })?;
        let status = JsFuture::from(promise).await.map_err(|e| {
            log::warn!("startVideo rejected: {}", js_message(&e));
            BoardError::CameraUnavailable
        })?;
        if !status.as_bool().unwrap_or(false) {
            return Err(BoardError::CameraUnavailable);
        }
        log::info!("camera started");
        Ok(Self { video })
    }

    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }
}

impl Drop for VideoFeed {
    fn drop(&mut self) {
        ht_stop_video();
        log::info!("camera stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detection_frame_parses() {
        assert_eq!(parse_predictions("[]").unwrap(), vec![]);
    }

    #[test]
    fn malformed_detection_frame_is_an_error() {
        assert!(matches!(
            parse_predictions(r#"[{"bbox":[1,2]}]"#),
            Err(BoardError::Detection(_))
        ));
    }
}
