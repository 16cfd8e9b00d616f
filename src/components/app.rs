use std::rc::Rc;

use super::drawing_board::DrawingBoard;
use crate::config::BoardConfig;
use crate::error::BoardError;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    pub config: Rc<BoardConfig>,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let failure = use_state(|| None::<BoardError>);
    // Bumped on retry so the board remounts from scratch.
    let generation = use_state(|| 0_u32);

    let on_fatal = {
        let failure = failure.clone();
        Callback::from(move |e: BoardError| failure.set(Some(e)))
    };
    let retry = {
        let failure = failure.clone();
        let generation = generation.clone();
        Callback::from(move |_| {
            log::info!("remounting drawing board with a 2d context");
            generation.set(*generation + 1);
            failure.set(None);
        })
    };

    let content = match &*failure {
        Some(err) => html! {
            <div style="margin:48px auto; max-width:480px; text-align:center; border:2px solid #f85149; border-radius:12px; padding:24px;">
                <h2 style="margin:0 0 12px 0;">{"Drawing is unavailable"}</h2>
                <p style="margin:4px 0 16px 0;">{ format!("{err}. Falling back to a plain 2D context.") }</p>
                <button onclick={retry}>{"OK"}</button>
            </div>
        },
        None => html! {
            <DrawingBoard key={generation.to_string()} config={props.config.clone()} {on_fatal} />
        },
    };

    html! { <div id="root">{ content }</div> }
}
