use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct NoticeOverlayProps {
    pub message: Option<String>,
    pub on_dismiss: Callback<()>,
}

#[function_component]
pub fn NoticeOverlay(props: &NoticeOverlayProps) -> Html {
    let Some(message) = props.message.clone() else {
        return html! {};
    };
    let dismiss_cb = {
        let cb = props.on_dismiss.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div role="alert" style="position:fixed; bottom:16px; left:50%; transform:translateX(-50%); background:rgba(0,0,0,0.85); color:#fff; border:2px solid #f85149; padding:12px 20px; border-radius:12px; display:flex; gap:12px; align-items:center;">
            <span>{ message }</span>
            <button onclick={dismiss_cb}>{"OK"}</button>
        </div>
    }
}
