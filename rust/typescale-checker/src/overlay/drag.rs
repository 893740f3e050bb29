use crate::host::{ListenKind, ListenTarget, OverlayHost};

/// An in-progress drag of the overlay.
///
/// The move and release listeners are acquired when the drag begins and
/// released together by [`DragSession::end`], so repeated drags never stack
/// listeners.
#[derive(Debug)]
pub struct DragSession<L> {
    offset_x: f64,
    offset_y: f64,
    on_move: L,
    on_release: L,
}

impl<L> DragSession<L> {
    /// Start dragging `ui` from the pointer position `(page_x, page_y)`.
    pub fn begin<H: OverlayHost<Listener = L>>(
        host: &mut H,
        ui: &H::Element,
        page_x: f64,
        page_y: f64,
    ) -> Self {
        let rect = host.bounding_rect(ui);
        let on_move = host.listen(ListenTarget::Window, ListenKind::DragMove);
        let on_release = host.listen(ListenTarget::Window, ListenKind::DragEnd);

        Self {
            offset_x: page_x - rect.left,
            offset_y: page_y - rect.top,
            on_move,
            on_release,
        }
    }

    /// Move `ui` so that it follows the pointer, kept inside the window.
    pub fn follow<H: OverlayHost<Listener = L>>(
        &self,
        host: &mut H,
        ui: &H::Element,
        page_x: f64,
        page_y: f64,
    ) -> (f64, f64) {
        let rect = host.bounding_rect(ui);
        let (window_width, window_height) = host.window_size();
        let left = clamp_to_window(page_x - self.offset_x, window_width, rect.width);
        let top = clamp_to_window(page_y - self.offset_y, window_height, rect.height);

        host.set_style(ui, "left", &format!("{left}px"));
        host.set_style(ui, "top", &format!("{top}px"));
        host.set_style(ui, "right", "auto");
        (left, top)
    }

    /// Stop dragging and detach both listeners.
    pub fn end<H: OverlayHost<Listener = L>>(self, host: &mut H) {
        host.unlisten(self.on_move);
        host.unlisten(self.on_release);
    }
}

/// Clamp a coordinate to `0..=window_extent - ui_extent`, preferring `0` when
/// the overlay is larger than the window.
pub fn clamp_to_window(position: f64, window_extent: f64, ui_extent: f64) -> f64 {
    position.min(window_extent - ui_extent).max(0.0)
}
