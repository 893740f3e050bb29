//! The host environment the checker runs against.
//!
//! Nothing in the scanner or the overlay touches `window` or `document`
//! directly. Instead they are handed a host: [`StyleHost`] for the read-only
//! surface the scanner needs (tree walk, resolved styles, viewport) and
//! [`OverlayHost`] for the mutations, listeners, animation frames and timers
//! the overlay needs. The browser binding lives in `web`; tests use
//! `helpers::FakeDocument`.

use std::fmt::Debug;
use std::time::Duration;

use crate::{TypeScaleError, style::ComputedStyle};

/// A direct child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildNode<E> {
    /// A child element
    Element(E),
    /// A text node and its content
    Text(String),
    /// Comments, processing instructions and anything else
    Other,
}

/// A rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Read access to a rendered document.
pub trait StyleHost {
    /// Handle to an element in the host document.
    type Element: Clone + PartialEq + Debug;

    /// The document body, if there is one.
    fn body(&self) -> Option<Self::Element>;

    /// Every element below `root`, in document order, excluding `root`.
    fn descendants(&self, root: &Self::Element) -> Vec<Self::Element>;

    /// The direct child nodes of `element`, in order.
    fn child_nodes(&self, element: &Self::Element) -> Vec<ChildNode<Self::Element>>;

    /// The resolved style of `element`.
    fn computed_style(&self, element: &Self::Element) -> ComputedStyle;

    /// Lower-case tag name of `element`.
    fn tag_name(&self, element: &Self::Element) -> String;

    /// The width of the document's root element, excluding scrollbars.
    fn viewport_width(&self) -> f64;

    /// The window's inner width, including a vertical scrollbar. Viewport
    /// units resolve against this width.
    fn window_width(&self) -> f64;

    /// The document root's resolved font size in pixels.
    fn root_font_size(&self) -> f64;
}

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenTarget<E> {
    Window,
    Element(E),
}

/// The groups of DOM events the checker subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenKind {
    /// `keydown`, delivered as [`UiEvent::Key`]
    KeyDown,
    /// `resize`, delivered as [`UiEvent::Resize`]
    Resize,
    /// Pointer events inside the overlay, delegated from its container and
    /// delivered as hover, click, close and drag-start events
    OverlayPointer,
    /// `mousemove` while dragging, delivered as [`UiEvent::DragMove`]
    DragMove,
    /// `mouseup` while dragging, delivered as [`UiEvent::DragEnd`]
    DragEnd,
}

/// A key press as seen by the global keyboard listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// The `KeyboardEvent.key` value
    pub key: String,
    /// Whether Ctrl was held
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape" || self.key == "Esc"
    }
}

/// Events delivered from the host to the checker.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Key(KeyInput),
    /// The window was resized
    Resize,
    /// The resize debounce timer elapsed
    ResizeSettled,
    /// An animation frame requested through [`OverlayHost::request_frame`]
    Frame,
    /// The pointer entered the report entry at `item`
    HoverStart { item: usize },
    /// The pointer left the report entry at `item`
    HoverEnd { item: usize },
    /// The report entry at `item` was clicked
    ItemClick { item: usize },
    /// The overlay's close control was clicked
    Close,
    DragStart { page_x: f64, page_y: f64 },
    DragMove { page_x: f64, page_y: f64 },
    DragEnd,
}

/// Write access to the host document plus its event, frame and timer
/// scheduling.
///
/// Listeners, frames and timers all report back through [`UiEvent`]s that
/// the embedding delivers to [`crate::Checker::handle`].
pub trait OverlayHost: StyleHost {
    /// Registration handle returned by [`OverlayHost::listen`].
    type Listener: Debug;
    /// Handle for a pending animation frame.
    type Frame: Debug;
    /// Handle for a pending timer.
    type Timer: Debug;

    fn create_element(&mut self, tag: &str) -> Result<Self::Element, TypeScaleError>;
    fn append_child(&mut self, parent: &Self::Element, child: &Self::Element);
    fn append_text(&mut self, parent: &Self::Element, text: &str);
    /// Detach `element` from the document.
    fn remove_element(&mut self, element: &Self::Element);

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str);
    fn remove_attribute(&mut self, element: &Self::Element, name: &str);
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn add_class(&mut self, element: &Self::Element, class: &str);
    fn remove_class(&mut self, element: &Self::Element, class: &str);
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    /// Elements carrying `class`, `root` included, in document order.
    fn elements_with_class(&self, root: &Self::Element, class: &str) -> Vec<Self::Element>;

    /// Set an inline style property.
    fn set_style(&mut self, element: &Self::Element, property: &str, value: &str);
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    /// The window's inner width and height.
    fn window_size(&self) -> (f64, f64);
    fn scroll_y(&self) -> f64;
    fn scroll_to(&mut self, y: f64);

    fn listen(&mut self, target: ListenTarget<Self::Element>, kind: ListenKind) -> Self::Listener;
    fn unlisten(&mut self, listener: Self::Listener);

    /// Ask for a [`UiEvent::Frame`] before the next repaint.
    fn request_frame(&mut self) -> Self::Frame;
    fn cancel_frame(&mut self, frame: Self::Frame);

    /// Ask for a [`UiEvent::ResizeSettled`] after `delay`.
    fn set_timer(&mut self, delay: Duration) -> Self::Timer;
    fn clear_timer(&mut self, timer: Self::Timer);
}
