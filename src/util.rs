// Small window helpers shared by components.

pub fn viewport_width() -> Option<f64> {
    web_sys::window()?.inner_width().ok()?.as_f64()
}

/// Blocking notice, used where the user must acknowledge before continuing.
pub fn alert(msg: &str) {
    if let Some(win) = web_sys::window() {
        if win.alert_with_message(msg).is_err() {
            log::warn!("alert suppressed: {msg}");
        }
    }
}
