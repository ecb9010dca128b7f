use folio_core::DARK_CLASS;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    match document.get_element_by_id(element_id) {
        Some(el) => {
            let closure =
                wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        None => log::debug!("[dom] no #{} on this page", element_id),
    }
}

/// Create a block-level canvas filling `mount` and append it.
pub fn create_canvas_in(
    document: &web::Document,
    mount: &web::Element,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    canvas
        .set_attribute("style", "display:block;width:100%;height:100%;touch-action:none")
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    mount
        .append_child(&canvas)
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    Ok(canvas)
}

/// Keep the canvas backing store at CSS size * devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

pub fn is_document_dark(document: &web::Document) -> bool {
    document
        .document_element()
        .map(|root| root.class_list().contains(DARK_CLASS))
        .unwrap_or(false)
}

pub fn set_document_dark(document: &web::Document, dark: bool) {
    if let Some(root) = document.document_element() {
        let _ = root.class_list().toggle_with_force(DARK_CLASS, dark);
    }
}
