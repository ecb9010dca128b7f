use crate::dom;
use crate::input;
use folio_core::{SceneCommand, ViewerEvent, ViewerSession, PARTICLE_BUTTON_ID, THEME_TOGGLE_ID};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Mirror the DOM-side commands a session returns. Everything else is
/// already applied inside the session.
pub fn apply_host_commands(document: &web::Document, commands: &[SceneCommand]) {
    for cmd in commands {
        if let SceneCommand::SetDocumentTheme { dark } = cmd {
            dom::set_document_dark(document, *dark);
        }
    }
}

pub fn wire_buttons(document: &web::Document, session: Rc<RefCell<ViewerSession>>) {
    // theme toggle: the document class is the source of truth, as on the page
    {
        let session = session.clone();
        let doc = document.clone();
        dom::add_click_listener(document, THEME_TOGGLE_ID, move || {
            let dark = !dom::is_document_dark(&doc);
            let cmds = session.borrow_mut().handle(ViewerEvent::SetTheme(dark));
            apply_host_commands(&doc, &cmds);
        });
    }

    // particle burst
    dom::add_click_listener(document, PARTICLE_BUTTON_ID, move || {
        session.borrow_mut().handle(ViewerEvent::BurstParticles);
    });
}

pub fn wire_resize(
    canvas: web::HtmlCanvasElement,
    mount: web::Element,
    session: Rc<RefCell<ViewerSession>>,
) {
    if let Some(window) = web::window() {
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas);
            session.borrow_mut().handle(ViewerEvent::Resize {
                width: mount.client_width() as f32,
                height: mount.client_height() as f32,
            });
        }) as Box<dyn FnMut()>);
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub session: Rc<RefCell<ViewerSession>>,
    pub drag: Rc<RefCell<input::DragState>>,
}

pub fn wire_input_handlers(w: InputWiring) {
    // click -> pick
    {
        let session = w.session.clone();
        let canvas_click = w.canvas.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::MouseEvent| {
            let (x, y) = input::client_pos(&ev);
            let viewport = input::canvas_viewport(&canvas_click);
            session.borrow_mut().handle(ViewerEvent::Click { x, y, viewport });
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // pointerdown
    {
        let drag_m = w.drag.clone();
        let canvas_target = w.canvas.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let (x, y) = input::client_pos(&ev);
            drag_m.borrow_mut().begin(ev.pointer_id(), x, y);
            let _ = canvas_target.set_pointer_capture(ev.pointer_id());
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // pointermove
    {
        let drag_m = w.drag.clone();
        let session = w.session.clone();
        let canvas_move = w.canvas.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let (x, y) = input::client_pos(&ev);
            let Some((dx, dy)) = drag_m.borrow_mut().move_to(ev.pointer_id(), x, y) else {
                return;
            };
            let viewport_height = canvas_move.client_height() as f32;
            session
                .borrow_mut()
                .handle(ViewerEvent::OrbitDrag { dx, dy, viewport_height });
        }) as Box<dyn FnMut(_)>);
        if let Some(wnd) = web::window() {
            let _ = wnd
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
        }
        closure.forget();
    }

    // pointerup / pointercancel
    {
        let drag_m = w.drag.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            drag_m.borrow_mut().end(ev.pointer_id());
        }) as Box<dyn FnMut(_)>);
        if let Some(wnd) = web::window() {
            for kind in ["pointerup", "pointercancel"] {
                let _ = wnd.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            }
        }
        closure.forget();
    }

    // wheel -> zoom; not passive so the page does not scroll under the canvas
    {
        let session = w.session.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::WheelEvent| {
            ev.prevent_default();
            session.borrow_mut().handle(ViewerEvent::Zoom { delta_y: ev.delta_y() as f32 });
        }) as Box<dyn FnMut(_)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_passive(false);
        let _ = w.canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            closure.as_ref().unchecked_ref(),
            &opts,
        );
        closure.forget();
    }
}
