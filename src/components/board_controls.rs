use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::model::{MAX_THICKNESS, MIN_THICKNESS, ModelStatus};
use crate::state::GesturePhase;

#[derive(Properties, PartialEq, Clone)]
pub struct BoardControlsProps {
    pub line_thickness: u8,
    pub threshold_percent: u8,
    pub flip_horizontal: bool,
    pub color: String,
    pub phase: GesturePhase,
    pub model_status: ModelStatus,
    pub on_clear: Callback<()>,
    pub on_toggle_video: Callback<()>,
    pub on_thickness: Callback<u8>,
    pub on_threshold: Callback<u8>,
    pub on_color: Callback<String>,
    pub on_flip: Callback<bool>,
}

fn video_label(phase: GesturePhase, model: ModelStatus) -> &'static str {
    match (phase, model) {
        (GesturePhase::Running, _) => "Stop Video",
        (GesturePhase::Starting, _) => "Starting…",
        (GesturePhase::Stopped, ModelStatus::Loading) => "Loading Model…",
        (GesturePhase::Stopped, ModelStatus::Failed) => "Model Unavailable",
        (GesturePhase::Stopped, ModelStatus::Ready) => "Start Video",
    }
}

fn video_disabled(phase: GesturePhase, model: ModelStatus) -> bool {
    model != ModelStatus::Ready || phase == GesturePhase::Starting
}

#[function_component]
pub fn BoardControls(props: &BoardControlsProps) -> Html {
    let clear_cb = {
        let cb = props.on_clear.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let video_cb = {
        let cb = props.on_toggle_video.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let thickness_cb = {
        let cb = props.on_thickness.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(v) = input.value().parse::<u8>() {
                cb.emit(v);
            }
        })
    };
    let threshold_cb = {
        let cb = props.on_threshold.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(v) = input.value().parse::<u8>() {
                cb.emit(v);
            }
        })
    };
    // `change` fires once the picker closes, not on every hue drag.
    let color_cb = {
        let cb = props.on_color.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(input.value());
        })
    };
    let flip_cb = {
        let cb = props.on_flip.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(input.checked());
        })
    };

    let running = props.phase == GesturePhase::Running;
    let video_style = if running {
        "background:#f85149; border:1px solid #b62324; color:#fff;"
    } else {
        ""
    };
    let video_disabled = video_disabled(props.phase, props.model_status);

    html! {<div style="display:flex; flex-wrap:wrap; gap:12px; align-items:flex-end; padding:8px; border:1px solid #30363d; border-radius:8px;">
        <button onclick={clear_cb}>{"Clear"}</button>
        <button onclick={video_cb} style={video_style} disabled={video_disabled}>{ video_label(props.phase, props.model_status) }</button>
        <label style="display:flex; flex-direction:column; gap:4px;">
            <span>{"Line Thickness"}</span>
            <input type="range" min={MIN_THICKNESS.to_string()} max={MAX_THICKNESS.to_string()} step="1"
                value={props.line_thickness.to_string()} oninput={thickness_cb} />
        </label>
        <label style="display:flex; flex-direction:column; gap:4px;">
            <span>{"Model Threshold"}</span>
            <input type="range" min="1" max="99" step="1"
                value={props.threshold_percent.to_string()} oninput={threshold_cb} />
        </label>
        <label style="display:flex; align-items:center; gap:6px; cursor:pointer;">
            <input type="checkbox" checked={props.flip_horizontal} onchange={flip_cb} />
            <span>{"Mirror Camera"}</span>
        </label>
        <label style="display:flex; flex-direction:column; gap:4px;">
            <span>{"Color"}</span>
            <input type="color" value={props.color.clone()} onchange={color_cb} />
        </label>
    </div>}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_button_follows_phase() {
        assert_eq!(video_label(GesturePhase::Stopped, ModelStatus::Loading), "Loading Model…");
        assert_eq!(video_label(GesturePhase::Stopped, ModelStatus::Ready), "Start Video");
        assert_eq!(video_label(GesturePhase::Starting, ModelStatus::Ready), "Starting…");
        assert_eq!(video_label(GesturePhase::Running, ModelStatus::Ready), "Stop Video");
    }

    #[test]
    fn failed_model_disables_video_button() {
        assert_eq!(video_label(GesturePhase::Stopped, ModelStatus::Failed), "Model Unavailable");
        assert!(video_disabled(GesturePhase::Stopped, ModelStatus::Failed));
        assert!(video_disabled(GesturePhase::Stopped, ModelStatus::Loading));
        assert!(!video_disabled(GesturePhase::Stopped, ModelStatus::Ready));
    }
}
