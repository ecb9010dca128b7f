use folio_core::Viewport;
use web_sys as web;

/// Active orbit drag, tracked per pointer.
#[derive(Default, Clone, Copy)]
pub struct DragState {
    pub active: bool,
    pub pointer_id: i32,
    pub last_x: f32,
    pub last_y: f32,
}

impl DragState {
    pub fn begin(&mut self, pointer_id: i32, x: f32, y: f32) {
        *self = Self { active: true, pointer_id, last_x: x, last_y: y };
    }

    /// Pixel delta since the last move of the dragging pointer.
    pub fn move_to(&mut self, pointer_id: i32, x: f32, y: f32) -> Option<(f32, f32)> {
        if !self.active || pointer_id != self.pointer_id {
            return None;
        }
        let delta = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        Some(delta)
    }

    pub fn end(&mut self, pointer_id: i32) {
        if pointer_id == self.pointer_id {
            self.active = false;
        }
    }
}

// ---------------- Pointer helpers ----------------
#[inline]
pub fn canvas_viewport(canvas: &web::HtmlCanvasElement) -> Viewport {
    let rect = canvas.get_bounding_client_rect();
    Viewport::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

#[inline]
pub fn client_pos(ev: &web::MouseEvent) -> (f32, f32) {
    (ev.client_x() as f32, ev.client_y() as f32)
}
