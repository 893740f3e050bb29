use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Document, Element, Event, EventTarget, KeyboardEvent, MouseEvent, Node, Window};

use crate::{
    TypeScaleError,
    host::{ChildNode, KeyInput, ListenKind, ListenTarget, OverlayHost, Rect, StyleHost, UiEvent},
    overlay::{ITEM_ATTRIBUTE, ROLE_ATTRIBUTE},
    style::{ComputedStyle, parse_float},
};

/// Receives every [`UiEvent`] a [`WebHost`] produces.
pub type Dispatch = Rc<dyn Fn(UiEvent)>;

type Handler = Closure<dyn FnMut(Event)>;

fn dom_error(error: JsValue) -> TypeScaleError {
    TypeScaleError::Dom(format!("{error:?}"))
}

/// Attach `handler` for `event` on `target`, refusing anything that is not
/// callable.
pub fn add_listener(
    target: &EventTarget,
    event: &str,
    handler: &JsValue,
) -> Result<(), TypeScaleError> {
    let handler = as_handler(event, handler)?;
    target
        .add_event_listener_with_callback(event, handler)
        .map_err(dom_error)
}

pub fn remove_listener(
    target: &EventTarget,
    event: &str,
    handler: &JsValue,
) -> Result<(), TypeScaleError> {
    let handler = as_handler(event, handler)?;
    target
        .remove_event_listener_with_callback(event, handler)
        .map_err(dom_error)
}

fn as_handler<'a>(
    event: &str,
    handler: &'a JsValue,
) -> Result<&'a js_sys::Function, TypeScaleError> {
    handler
        .dyn_ref::<js_sys::Function>()
        .ok_or_else(|| TypeScaleError::HandlerMismatch {
            event: event.to_string(),
            received: handler
                .js_typeof()
                .as_string()
                .unwrap_or_else(|| "unknown".into()),
        })
}

fn dom_events(kind: ListenKind) -> &'static [&'static str] {
    match kind {
        ListenKind::KeyDown => &["keydown"],
        ListenKind::Resize => &["resize"],
        ListenKind::OverlayPointer => &["mouseover", "mouseout", "click", "mousedown"],
        ListenKind::DragMove => &["mousemove"],
        ListenKind::DragEnd => &["mouseup"],
    }
}

struct Registration {
    target: EventTarget,
    kind: ListenKind,
}

/// [`OverlayHost`] over the page's `window` and `document`.
///
/// One event handler is created per [`ListenKind`] and reused for every
/// registration of that kind, so a handler is never dropped while the
/// browser may still call it. The same holds for the animation frame and
/// timer callbacks.
pub struct WebHost {
    window: Window,
    document: Document,
    dispatch: Dispatch,
    handlers: HashMap<ListenKind, Handler>,
    registrations: HashMap<u32, Registration>,
    next_registration: u32,
    on_frame: Closure<dyn FnMut(f64)>,
    on_timer: Closure<dyn FnMut()>,
}

impl WebHost {
    pub fn new(window: Window, document: Document, dispatch: Dispatch) -> Self {
        let frame_dispatch = dispatch.clone();
        let on_frame = Closure::wrap(Box::new(move |_timestamp: f64| {
            frame_dispatch(UiEvent::Frame);
        }) as Box<dyn FnMut(f64)>);

        let timer_dispatch = dispatch.clone();
        let on_timer = Closure::wrap(Box::new(move || {
            timer_dispatch(UiEvent::ResizeSettled);
        }) as Box<dyn FnMut()>);

        Self {
            window,
            document,
            dispatch,
            handlers: HashMap::new(),
            registrations: HashMap::new(),
            next_registration: 1,
            on_frame,
            on_timer,
        }
    }

    fn handler(&mut self, kind: ListenKind) -> &Handler {
        let dispatch = &self.dispatch;
        self.handlers.entry(kind).or_insert_with(|| {
            let dispatch = dispatch.clone();
            Closure::wrap(Box::new(move |event: Event| {
                if let Some(event) = translate(kind, &event) {
                    dispatch(event);
                }
            }) as Box<dyn FnMut(Event)>)
        })
    }

    fn computed(&self, element: &Element) -> Option<web_sys::CssStyleDeclaration> {
        self.window.get_computed_style(element).ok().flatten()
    }
}

/// Turn a DOM event into the [`UiEvent`] the checker expects, if any.
fn translate(kind: ListenKind, event: &Event) -> Option<UiEvent> {
    match kind {
        ListenKind::KeyDown => {
            let key = event.dyn_ref::<KeyboardEvent>()?;
            Some(UiEvent::Key(KeyInput::new(key.key(), key.ctrl_key())))
        }
        ListenKind::Resize => Some(UiEvent::Resize),
        ListenKind::OverlayPointer => translate_pointer(event),
        ListenKind::DragMove => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            Some(UiEvent::DragMove {
                page_x: mouse.page_x() as f64,
                page_y: mouse.page_y() as f64,
            })
        }
        ListenKind::DragEnd => Some(UiEvent::DragEnd),
    }
}

fn translate_pointer(event: &Event) -> Option<UiEvent> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let item = target.closest(&format!("[{ITEM_ATTRIBUTE}]")).ok().flatten();
    let index = item
        .as_ref()
        .and_then(|link| link.get_attribute(ITEM_ATTRIBUTE))
        .and_then(|index| index.parse::<usize>().ok());
    let role = |name: &str| {
        target
            .closest(&format!("[{ROLE_ATTRIBUTE}=\"{name}\"]"))
            .ok()
            .flatten()
            .is_some()
    };

    match event.type_().as_str() {
        "mouseover" | "mouseout" => {
            let (link, item) = (item?, index?);
            // Moving between nodes inside the same entry is not a hover change.
            let related = mouse
                .related_target()
                .and_then(|related| related.dyn_into::<Node>().ok());
            if related.is_some_and(|related| link.contains(Some(&related))) {
                return None;
            }
            if event.type_() == "mouseover" {
                Some(UiEvent::HoverStart { item })
            } else {
                Some(UiEvent::HoverEnd { item })
            }
        }
        "click" => {
            if let Some(item) = index {
                event.prevent_default();
                Some(UiEvent::ItemClick { item })
            } else if role("close") {
                Some(UiEvent::Close)
            } else {
                None
            }
        }
        "mousedown" => {
            if role("header") && !role("close") {
                event.prevent_default();
                Some(UiEvent::DragStart {
                    page_x: mouse.page_x() as f64,
                    page_y: mouse.page_y() as f64,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

fn elements(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl StyleHost for WebHost {
    type Element = Element;

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn descendants(&self, root: &Element) -> Vec<Element> {
        match root.query_selector_all("*") {
            Ok(list) => elements(&list),
            Err(error) => {
                tracing::warn!(?error, "Could not list descendants");
                Vec::new()
            }
        }
    }

    fn child_nodes(&self, element: &Element) -> Vec<ChildNode<Element>> {
        let nodes = element.child_nodes();
        (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .map(|node| match node.node_type() {
                Node::ELEMENT_NODE => match node.dyn_into::<Element>() {
                    Ok(element) => ChildNode::Element(element),
                    Err(_) => ChildNode::Other,
                },
                Node::TEXT_NODE => ChildNode::Text(node.text_content().unwrap_or_default()),
                _ => ChildNode::Other,
            })
            .collect()
    }

    fn computed_style(&self, element: &Element) -> ComputedStyle {
        let Some(style) = self.computed(element) else {
            return ComputedStyle::default();
        };
        let read = |property: &str| style.get_property_value(property).unwrap_or_default();
        let clip = read("clip");

        ComputedStyle {
            font_size: read("font-size"),
            font_family: read("font-family"),
            display: read("display"),
            visibility: read("visibility"),
            opacity: read("opacity"),
            width: read("width"),
            height: read("height"),
            overflow: read("overflow"),
            clip: (!clip.is_empty()).then_some(clip),
        }
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name().to_ascii_lowercase()
    }

    fn viewport_width(&self) -> f64 {
        match self.document.document_element() {
            Some(root) => root.client_width() as f64,
            None => self.window_width(),
        }
    }

    fn window_width(&self) -> f64 {
        self.window_size().0
    }

    fn root_font_size(&self) -> f64 {
        self.document
            .document_element()
            .and_then(|root| self.computed(&root))
            .and_then(|style| style.get_property_value("font-size").ok())
            .map(|size| parse_float(&size))
            .unwrap_or(f64::NAN)
    }
}

impl OverlayHost for WebHost {
    type Listener = u32;
    type Frame = i32;
    type Timer = i32;

    fn create_element(&mut self, tag: &str) -> Result<Element, TypeScaleError> {
        self.document.create_element(tag).map_err(dom_error)
    }

    fn append_child(&mut self, parent: &Element, child: &Element) {
        if let Err(error) = parent.append_child(child) {
            tracing::warn!(?error, "Could not append element");
        }
    }

    fn append_text(&mut self, parent: &Element, text: &str) {
        if let Err(error) = parent.append_with_str_1(text) {
            tracing::warn!(?error, "Could not append text");
        }
    }

    fn remove_element(&mut self, element: &Element) {
        element.remove();
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&mut self, element: &Element, name: &str, value: &str) {
        if let Err(error) = element.set_attribute(name, value) {
            tracing::warn!(?error, name, "Could not set attribute");
        }
    }

    fn remove_attribute(&mut self, element: &Element, name: &str) {
        if let Err(error) = element.remove_attribute(name) {
            tracing::warn!(?error, name, "Could not remove attribute");
        }
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn add_class(&mut self, element: &Element, class: &str) {
        if let Err(error) = element.class_list().add_1(class) {
            tracing::warn!(?error, class, "Could not add class");
        }
    }

    fn remove_class(&mut self, element: &Element, class: &str) {
        if let Err(error) = element.class_list().remove_1(class) {
            tracing::warn!(?error, class, "Could not remove class");
        }
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn elements_with_class(&self, root: &Element, class: &str) -> Vec<Element> {
        let collection = root.get_elements_by_class_name(class);
        let descendants = (0..collection.length()).filter_map(|index| collection.item(index));
        let root = self.has_class(root, class).then(|| root.clone());
        root.into_iter().chain(descendants).collect()
    }

    fn set_style(&mut self, element: &Element, property: &str, value: &str) {
        let Some(element) = element.dyn_ref::<web_sys::HtmlElement>() else {
            return;
        };
        if let Err(error) = element.style().set_property(property, value) {
            tracing::warn!(?error, property, "Could not set style");
        }
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            top: rect.top(),
            left: rect.left(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn window_size(&self) -> (f64, f64) {
        let extent = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
        };
        (
            extent(self.window.inner_width()),
            extent(self.window.inner_height()),
        )
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&mut self, y: f64) {
        let x = self.window.scroll_x().unwrap_or(0.0);
        self.window.scroll_to_with_x_and_y(x, y);
    }

    fn listen(&mut self, target: ListenTarget<Element>, kind: ListenKind) -> u32 {
        let target: EventTarget = match target {
            ListenTarget::Window => self.window.clone().into(),
            ListenTarget::Element(element) => element.into(),
        };
        let handler: JsValue = self.handler(kind).as_ref().clone();
        for event in dom_events(kind) {
            if let Err(error) = add_listener(&target, event, &handler) {
                tracing::warn!(%error, "Could not add listener");
            }
        }

        let handle = self.next_registration;
        self.next_registration += 1;
        self.registrations.insert(handle, Registration { target, kind });
        handle
    }

    fn unlisten(&mut self, listener: u32) {
        let Some(Registration { target, kind }) = self.registrations.remove(&listener) else {
            return;
        };
        let handler: JsValue = self.handler(kind).as_ref().clone();
        for event in dom_events(kind) {
            if let Err(error) = remove_listener(&target, event, &handler) {
                tracing::warn!(%error, "Could not remove listener");
            }
        }
    }

    fn request_frame(&mut self) -> i32 {
        self.window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
            .unwrap_or_else(|error| {
                tracing::warn!(?error, "Could not request an animation frame");
                0
            })
    }

    fn cancel_frame(&mut self, frame: i32) {
        if let Err(error) = self.window.cancel_animation_frame(frame) {
            tracing::warn!(?error, "Could not cancel an animation frame");
        }
    }

    fn set_timer(&mut self, delay: Duration) -> i32 {
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.on_timer.as_ref().unchecked_ref(),
                millis,
            )
            .unwrap_or_else(|error| {
                tracing::warn!(?error, "Could not set a timer");
                0
            })
    }

    fn clear_timer(&mut self, timer: i32) {
        self.window.clear_timeout_with_handle(timer);
    }
}

#[cfg(test)]
mod tests {
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn it_refuses_handlers_that_are_not_functions() {
        let target = web_sys::EventTarget::new().expect("event target");

        let result = add_listener(&target, "keydown", &JsValue::from_str("onKeyDown"));

        assert_eq!(
            result,
            Err(TypeScaleError::HandlerMismatch {
                event: "keydown".into(),
                received: "string".into(),
            })
        );
    }
}
