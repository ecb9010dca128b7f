#![cfg(target_arch = "wasm32")]

mod dom;
mod events;
mod frame;
mod input;
mod loader;
mod render;

use folio_core::{ViewerConfig, ViewerError, ViewerEvent, ViewerSession, MODEL_ATTRIBUTE};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("folio-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let mut config = ViewerConfig::default();

    // Nothing is set up without the mount element.
    let mount = document
        .get_element_by_id(&config.mount_id)
        .ok_or_else(|| ViewerError::MissingMount(config.mount_id.clone()))?;
    if let Some(path) = mount.get_attribute(MODEL_ATTRIBUTE).filter(|p| !p.trim().is_empty()) {
        config = config.with_model_path(path);
    }

    let canvas = dom::create_canvas_in(&document, &mount)?;
    dom::sync_canvas_backing_size(&canvas);

    let session = Rc::new(RefCell::new(ViewerSession::new(
        &config,
        dom::is_document_dark(&document),
    )?));
    session.borrow_mut().handle(ViewerEvent::Resize {
        width: mount.client_width() as f32,
        height: mount.client_height() as f32,
    });

    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        session: session.clone(),
        drag: Rc::new(RefCell::new(input::DragState::default())),
    });
    events::wire_buttons(&document, session.clone());
    events::wire_resize(canvas.clone(), mount, session.clone());

    loader::spawn_scene_load(config.model_path.clone(), session.clone());

    // Interaction keeps working without a GPU; only drawing is skipped.
    let gpu = frame::init_gpu(&canvas).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        session,
        gpu,
        canvas,
        last_instant: Instant::now(),
        uploaded_revision: 0,
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
