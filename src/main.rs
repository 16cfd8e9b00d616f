mod components;
mod config;
mod error;
mod gesture;
mod handtrack;
mod listeners;
mod model;
mod state;
mod surface;
mod util;

use std::rc::Rc;

use components::{App, AppProps};
use config::BoardConfig;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Trace) {
        web_sys::console::warn_1(&format!("logger already set: {e}").into());
    }
    let config = BoardConfig::load();
    log::set_max_level(config.log_level().to_level_filter());
    log::info!("gesture board starting");
    yew::Renderer::<App>::with_props(AppProps {
        config: Rc::new(config),
    })
    .render();
}
