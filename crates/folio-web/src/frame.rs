use crate::render;
use folio_core::ViewerSession;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub session: Rc<RefCell<ViewerSession>>,
    pub gpu: Option<render::GpuState>,
    pub canvas: web::HtmlCanvasElement,
    pub last_instant: Instant,
    /// Scene revision currently uploaded to the GPU.
    pub uploaded_revision: u64,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;

        self.session.borrow_mut().advance(dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let session = self.session.borrow();
        if session.scene_revision() != self.uploaded_revision {
            gpu.upload_scene(session.scene());
            self.uploaded_revision = session.scene_revision();
        }
        gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
        match gpu.render(&session) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(e) => log::warn!("[gpu] frame skipped: {:?}", e),
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState> {
    match render::GpuState::new(canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("[gpu] WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
