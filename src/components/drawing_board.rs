use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlCanvasElement, HtmlVideoElement, MouseEvent};
use yew::prelude::*;

use super::{board_controls::BoardControls, notice_overlay::NoticeOverlay};
use crate::config::{BoardConfig, LayoutRule};
use crate::error::BoardError;
use crate::gesture::{GestureController, SharedSurfaces};
use crate::handtrack::HandModel;
use crate::listeners::EventSubscription;
use crate::model::{BoardAction, BoardState, Point, SurfaceRole, threshold_to_percent};
use crate::state::{GesturePhase, PointerInput, PointerSignal};
use crate::surface::{Surface, SurfaceRegistry, acquire_context};
use crate::util::{alert, viewport_width};

type SharedPointers = Rc<RefCell<HashMap<SurfaceRole, PointerInput>>>;

#[derive(Properties, PartialEq, Clone)]
pub struct DrawingBoardProps {
    pub config: Rc<BoardConfig>,
    /// Raised when the board cannot work at all and must be replaced.
    pub on_fatal: Callback<BoardError>,
}

fn offset(e: &MouseEvent) -> Point {
    Point::new(e.offset_x() as f64, e.offset_y() as f64)
}

fn pointer_listener(
    canvas: &HtmlCanvasElement,
    event: &'static str,
    role: SurfaceRole,
    surfaces: &SharedSurfaces,
    pointers: &SharedPointers,
    to_signal: fn(&MouseEvent) -> PointerSignal,
) -> Result<EventSubscription, BoardError> {
    let surfaces = surfaces.clone();
    let pointers = pointers.clone();
    EventSubscription::new(canvas, event, move |e: MouseEvent| {
        let signal = to_signal(&e);
        let mut reg = surfaces.borrow_mut();
        if let Some(surface) = reg.get_mut(role) {
            pointers.borrow_mut().entry(role).or_default().handle(signal, surface);
        }
    })
}

/// Registers both canvases and wires their pointer listeners.
fn mount_surfaces(
    canvases: [(SurfaceRole, &NodeRef); 2],
    surfaces: &SharedSurfaces,
    pointers: &SharedPointers,
    dot_radius: f64,
) -> Result<Vec<EventSubscription>, BoardError> {
    let mut subs = Vec::new();
    for (role, node) in canvases {
        let canvas = node
            .cast::<HtmlCanvasElement>()
            .ok_or(BoardError::SurfaceContextUnavailable { role })?;
        let ctx = acquire_context(&canvas, role)?;
        surfaces
            .borrow_mut()
            .insert(Surface::new(role, ctx).with_dot_radius(dot_radius));
        subs.push(pointer_listener(&canvas, "mousedown", role, surfaces, pointers, |_| PointerSignal::Down)?);
        subs.push(pointer_listener(&canvas, "mousemove", role, surfaces, pointers, |e| {
            PointerSignal::Move(offset(e))
        })?);
        subs.push(pointer_listener(&canvas, "mouseup", role, surfaces, pointers, |_| PointerSignal::Up)?);
        if role == SurfaceRole::Dotted {
            subs.push(pointer_listener(&canvas, "mouseenter", role, surfaces, pointers, |e| {
                PointerSignal::Enter(offset(e))
            })?);
        }
    }
    Ok(subs)
}

fn layout_listener(rule: LayoutRule, board: UseReducerHandle<BoardState>) -> Result<EventSubscription, BoardError> {
    let window = web_sys::window().ok_or_else(|| BoardError::Subscription("no global window".into()))?;
    EventSubscription::new(&window, "resize", move |_: Event| {
        if let Some(width) = viewport_width() {
            board.dispatch(BoardAction::Resize(rule.size_for_viewport(width)));
        }
    })
}

#[function_component(DrawingBoard)]
pub fn drawing_board(props: &DrawingBoardProps) -> Html {
    let config = props.config.clone();
    let dotted_ref = use_node_ref();
    let undotted_ref = use_node_ref();
    let video_ref = use_node_ref();
    let board = {
        let config = config.clone();
        use_reducer(move || BoardState::from_config(&config))
    };
    let surfaces: SharedSurfaces = {
        let size = board.size;
        let style = board.style.clone();
        use_mut_ref(move || SurfaceRegistry::new(size, style))
    };
    let pointers: SharedPointers = use_mut_ref(HashMap::new);
    let controller = {
        let surfaces = surfaces.clone();
        let tick_ms = config.draw_tick_ms;
        use_memo((), move |_| GestureController::new(surfaces, tick_ms))
    };

    // Mount: surfaces, listeners, model. Unmount tears all of it down.
    {
        let dotted_ref = dotted_ref.clone();
        let undotted_ref = undotted_ref.clone();
        let surfaces = surfaces.clone();
        let pointers = pointers.clone();
        let controller = controller.clone();
        let board = board.clone();
        let on_fatal = props.on_fatal.clone();
        let config = config.clone();
        use_effect_with((), move |_| {
            let mut subs = Vec::new();
            let mounted = mount_surfaces(
                [(SurfaceRole::Dotted, &dotted_ref), (SurfaceRole::Undotted, &undotted_ref)],
                &surfaces,
                &pointers,
                config.dot_radius,
            )
            .and_then(|s| {
                subs = s;
                layout_listener(config.layout, board.clone())
            });
            match mounted {
                Ok(resize_sub) => subs.push(resize_sub),
                Err(e) if e.is_fatal() => {
                    log::error!("{e}");
                    on_fatal.emit(e);
                }
                Err(e) => {
                    log::warn!("{e}");
                    board.dispatch(BoardAction::ShowNotice(e.to_string()));
                }
            }
            if let Some(width) = viewport_width() {
                board.dispatch(BoardAction::Resize(config.layout.size_for_viewport(width)));
            }

            let alive = Rc::new(Cell::new(true));
            {
                let alive = alive.clone();
                let controller = controller.clone();
                let board = board.clone();
                let params = config.model;
                spawn_local(async move {
                    match HandModel::load(&params).await {
                        Ok(model) if alive.get() => {
                            controller.set_model(model);
                            board.dispatch(BoardAction::ModelLoaded);
                        }
                        Ok(_) => log::debug!("board unmounted before the model loaded"),
                        Err(e) => {
                            log::error!("{e}");
                            if alive.get() {
                                board.dispatch(BoardAction::ModelFailed);
                                board.dispatch(BoardAction::ShowNotice(e.to_string()));
                            }
                        }
                    }
                });
            }

            move || {
                alive.set(false);
                drop(subs);
                controller.shutdown();
            }
        });
    }

    // Size and style are shared by every surface.
    {
        let surfaces = surfaces.clone();
        use_effect_with((board.size, board.style.clone()), move |(size, style)| {
            let mut reg = surfaces.borrow_mut();
            reg.resize(*size);
            reg.set_style(style.clone());
            || ()
        });
    }

    {
        let controller = controller.clone();
        // Keyed on readiness too, so edits made while loading reach the model.
        use_effect_with(board.params_to_push(), move |params| {
            if let Some(params) = params {
                controller.set_params(params);
            }
            || ()
        });
    }

    let on_clear = {
        let surfaces = surfaces.clone();
        let pointers = pointers.clone();
        Callback::from(move |_| {
            surfaces.borrow_mut().clear_all();
            pointers.borrow_mut().values_mut().for_each(PointerInput::release);
        })
    };
    let on_toggle_video = {
        let controller = controller.clone();
        let board = board.clone();
        let video_ref = video_ref.clone();
        Callback::from(move |_| {
            if controller.phase() != GesturePhase::Stopped {
                controller.stop();
                board.dispatch(BoardAction::SetPhase(GesturePhase::Stopped));
                return;
            }
            let Some(video) = video_ref.cast::<HtmlVideoElement>() else {
                return;
            };
            board.dispatch(BoardAction::SetPhase(GesturePhase::Starting));
            let controller = controller.clone();
            let board = board.clone();
            spawn_local(async move {
                let result = controller.start(video).await;
                board.dispatch(BoardAction::SetPhase(controller.phase()));
                if let Err(e) = result {
                    log::warn!("{e}");
                    if e == BoardError::CameraUnavailable {
                        alert(&e.to_string());
                    }
                    board.dispatch(BoardAction::ShowNotice(e.to_string()));
                }
            });
        })
    };
    let on_thickness = {
        let board = board.clone();
        Callback::from(move |t: u8| board.dispatch(BoardAction::SetThickness(t)))
    };
    let on_threshold = {
        let board = board.clone();
        Callback::from(move |p: u8| board.dispatch(BoardAction::SetThresholdPercent(p)))
    };
    let on_color = {
        let board = board.clone();
        Callback::from(move |c: String| board.dispatch(BoardAction::SetColor(c)))
    };
    let on_flip = {
        let board = board.clone();
        Callback::from(move |f: bool| board.dispatch(BoardAction::SetFlip(f)))
    };
    let on_dismiss = {
        let board = board.clone();
        Callback::from(move |_| board.dispatch(BoardAction::DismissNotice))
    };

    let canvas_style = "border:2px solid black; touch-action:none;";
    html! {
        <div style="display:flex; flex-direction:column; gap:12px; padding:12px;">
            <BoardControls
                line_thickness={board.style.thickness()}
                threshold_percent={threshold_to_percent(board.model_params.score_threshold)}
                flip_horizontal={board.model_params.flip_horizontal}
                color={board.style.color().to_string()}
                phase={board.phase}
                model_status={board.model_status}
                {on_clear}
                {on_toggle_video}
                {on_thickness}
                {on_threshold}
                {on_color}
                {on_flip}
            />
            <div style="display:flex; flex-wrap:wrap; gap:12px;">
                <canvas ref={dotted_ref} id="dotted" style={canvas_style} />
                <canvas ref={undotted_ref} id="undotted" style={canvas_style} />
                <video ref={video_ref} width={board.size.width.to_string()} height={board.size.height.to_string()}
                    style="border:2px solid black;" />
            </div>
            <NoticeOverlay message={board.notice.clone()} {on_dismiss} />
        </div>
    }
}
