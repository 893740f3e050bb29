//! An in-memory host document.
//!
//! [`FakeDocument`] implements [`StyleHost`] and [`OverlayHost`] over a small
//! arena of nodes. Styles and layout boxes are assigned by the test rather
//! than computed, and listeners, frames and timers are only recorded, so a
//! test drives the checker by handing it [`crate::host::UiEvent`]s itself.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::{
    TypeScaleError,
    host::{ChildNode, ListenKind, ListenTarget, OverlayHost, Rect, StyleHost},
    style::ComputedStyle,
};

/// Handle to an element of a [`FakeDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeElement(usize);

impl FakeElement {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum FakeChild {
    Element(FakeElement),
    Text(String),
    Comment,
}

#[derive(Debug, Clone)]
struct FakeNode {
    tag: String,
    parent: Option<FakeElement>,
    children: Vec<FakeChild>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: ComputedStyle,
    inline_style: BTreeMap<String, String>,
    rect: Rect,
}

impl FakeNode {
    fn new(tag: &str, style: ComputedStyle) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            style,
            inline_style: BTreeMap::new(),
            rect: Rect::default(),
        }
    }
}

/// A listener registration recorded by [`FakeDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct FakeListener {
    pub handle: u64,
    pub target: ListenTarget<FakeElement>,
    pub kind: ListenKind,
}

/// An in-memory document with a single `<body>` root.
#[derive(Debug, Clone)]
pub struct FakeDocument {
    nodes: Vec<FakeNode>,
    window: (f64, f64),
    viewport_width: Option<f64>,
    root_font_size: f64,
    scroll_y: f64,
    max_scroll_y: f64,
    next_handle: u64,
    listeners: Vec<FakeListener>,
    frames: Vec<u64>,
    timers: BTreeMap<u64, Duration>,
}

impl FakeDocument {
    /// An empty document in a window of the given inner size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            nodes: vec![FakeNode::new("body", ComputedStyle::visible(16.0))],
            window: (width, height),
            viewport_width: None,
            root_font_size: 16.0,
            scroll_y: 0.0,
            max_scroll_y: f64::INFINITY,
            next_handle: 1,
            listeners: Vec::new(),
            frames: Vec::new(),
            timers: BTreeMap::new(),
        }
    }

    /// The `<body>` element.
    pub fn root(&self) -> FakeElement {
        FakeElement(0)
    }

    /// Create an element with the given resolved style under `parent`.
    pub fn push_element(
        &mut self,
        parent: FakeElement,
        tag: &str,
        style: ComputedStyle,
    ) -> FakeElement {
        let element = FakeElement(self.nodes.len());
        self.nodes.push(FakeNode::new(tag, style));
        self.attach(parent, element);
        element
    }

    pub fn push_text(&mut self, parent: FakeElement, text: &str) {
        self.nodes[parent.0]
            .children
            .push(FakeChild::Text(text.to_string()));
    }

    pub fn push_comment(&mut self, parent: FakeElement) {
        self.nodes[parent.0].children.push(FakeChild::Comment);
    }

    pub fn set_computed_style(&mut self, element: FakeElement, style: ComputedStyle) {
        self.nodes[element.0].style = style;
    }

    pub fn set_rect(&mut self, element: FakeElement, rect: Rect) {
        self.nodes[element.0].rect = rect;
    }

    /// Resize the window. The viewport width follows unless overridden.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.window = (width, height);
    }

    /// Report a viewport width different from the window width, as when a
    /// scrollbar takes up space.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = Some(width);
    }

    pub fn set_root_font_size(&mut self, size: f64) {
        self.root_font_size = size;
    }

    /// Cap how far the page can scroll.
    pub fn set_max_scroll(&mut self, max: f64) {
        self.max_scroll_y = max;
    }

    pub fn inline_style(&self, element: FakeElement, property: &str) -> Option<String> {
        self.nodes[element.0].inline_style.get(property).cloned()
    }

    pub fn classes(&self, element: FakeElement) -> Vec<String> {
        self.nodes[element.0].classes.clone()
    }

    /// Concatenated text of `element` and its descendants.
    pub fn text_content(&self, element: FakeElement) -> String {
        let mut text = String::new();
        for child in &self.nodes[element.0].children {
            match child {
                FakeChild::Element(child) => text.push_str(&self.text_content(*child)),
                FakeChild::Text(content) => text.push_str(content),
                FakeChild::Comment => {}
            }
        }
        text
    }

    /// Whether `element` is still reachable from the body.
    pub fn is_connected(&self, element: FakeElement) -> bool {
        let mut current = element;
        loop {
            if current == self.root() {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Connected elements carrying an `id` attribute.
    pub fn elements_with_id(&self) -> Vec<FakeElement> {
        self.descendants(&self.root())
            .into_iter()
            .filter(|element| self.nodes[element.0].attributes.contains_key("id"))
            .collect()
    }

    pub fn listeners(&self) -> &[FakeListener] {
        &self.listeners
    }

    pub fn listener_count(&self, kind: ListenKind) -> usize {
        self.listeners
            .iter()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_timers(&self) -> Vec<Duration> {
        self.timers.values().copied().collect()
    }

    /// Take the oldest pending frame, as the browser would when it fires.
    pub fn fire_frame(&mut self) -> bool {
        if self.frames.is_empty() {
            false
        } else {
            self.frames.remove(0);
            true
        }
    }

    /// Take every pending timer, as if their delays elapsed.
    pub fn fire_timers(&mut self) -> usize {
        let fired = self.timers.len();
        self.timers.clear();
        fired
    }

    fn attach(&mut self, parent: FakeElement, child: FakeElement) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(FakeChild::Element(child));
    }

    fn detach(&mut self, element: FakeElement) {
        if let Some(parent) = self.nodes[element.0].parent.take() {
            self.nodes[parent.0]
                .children
                .retain(|child| !matches!(child, FakeChild::Element(e) if *e == element));
        }
    }

    fn collect_descendants(&self, element: FakeElement, into: &mut Vec<FakeElement>) {
        for child in &self.nodes[element.0].children {
            if let FakeChild::Element(child) = child {
                into.push(*child);
                self.collect_descendants(*child, into);
            }
        }
    }

    fn handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl StyleHost for FakeDocument {
    type Element = FakeElement;

    fn body(&self) -> Option<FakeElement> {
        Some(self.root())
    }

    fn descendants(&self, root: &FakeElement) -> Vec<FakeElement> {
        let mut descendants = Vec::new();
        self.collect_descendants(*root, &mut descendants);
        descendants
    }

    fn child_nodes(&self, element: &FakeElement) -> Vec<ChildNode<FakeElement>> {
        self.nodes[element.0]
            .children
            .iter()
            .map(|child| match child {
                FakeChild::Element(child) => ChildNode::Element(*child),
                FakeChild::Text(text) => ChildNode::Text(text.clone()),
                FakeChild::Comment => ChildNode::Other,
            })
            .collect()
    }

    fn computed_style(&self, element: &FakeElement) -> ComputedStyle {
        self.nodes[element.0].style.clone()
    }

    fn tag_name(&self, element: &FakeElement) -> String {
        self.nodes[element.0].tag.clone()
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width.unwrap_or(self.window.0)
    }

    fn window_width(&self) -> f64 {
        self.window.0
    }

    fn root_font_size(&self) -> f64 {
        self.root_font_size
    }
}

impl OverlayHost for FakeDocument {
    type Listener = u64;
    type Frame = u64;
    type Timer = u64;

    fn create_element(&mut self, tag: &str) -> Result<FakeElement, TypeScaleError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(TypeScaleError::Dom(format!("Invalid tag name '{tag}'")));
        }
        let element = FakeElement(self.nodes.len());
        self.nodes.push(FakeNode::new(tag, ComputedStyle::visible(16.0)));
        Ok(element)
    }

    fn append_child(&mut self, parent: &FakeElement, child: &FakeElement) {
        self.attach(*parent, *child);
    }

    fn append_text(&mut self, parent: &FakeElement, text: &str) {
        self.push_text(*parent, text);
    }

    fn remove_element(&mut self, element: &FakeElement) {
        self.detach(*element);
    }

    fn attribute(&self, element: &FakeElement, name: &str) -> Option<String> {
        self.nodes[element.0].attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, element: &FakeElement, name: &str, value: &str) {
        self.nodes[element.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, element: &FakeElement, name: &str) {
        self.nodes[element.0].attributes.remove(name);
    }

    fn element_by_id(&self, id: &str) -> Option<FakeElement> {
        std::iter::once(self.root())
            .chain(self.descendants(&self.root()))
            .find(|element| {
                self.nodes[element.0].attributes.get("id").map(String::as_str) == Some(id)
            })
    }

    fn add_class(&mut self, element: &FakeElement, class: &str) {
        let classes = &mut self.nodes[element.0].classes;
        if !classes.iter().any(|existing| existing == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, element: &FakeElement, class: &str) {
        self.nodes[element.0]
            .classes
            .retain(|existing| existing != class);
    }

    fn has_class(&self, element: &FakeElement, class: &str) -> bool {
        self.nodes[element.0]
            .classes
            .iter()
            .any(|existing| existing == class)
    }

    fn elements_with_class(&self, root: &FakeElement, class: &str) -> Vec<FakeElement> {
        std::iter::once(*root)
            .chain(self.descendants(root))
            .filter(|element| self.has_class(element, class))
            .collect()
    }

    fn set_style(&mut self, element: &FakeElement, property: &str, value: &str) {
        self.nodes[element.0]
            .inline_style
            .insert(property.to_string(), value.to_string());
    }

    fn bounding_rect(&self, element: &FakeElement) -> Rect {
        self.nodes[element.0].rect
    }

    fn window_size(&self) -> (f64, f64) {
        self.window
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll_y);
    }

    fn listen(&mut self, target: ListenTarget<FakeElement>, kind: ListenKind) -> u64 {
        let handle = self.handle();
        self.listeners.push(FakeListener {
            handle,
            target,
            kind,
        });
        handle
    }

    fn unlisten(&mut self, listener: u64) {
        self.listeners.retain(|existing| existing.handle != listener);
    }

    fn request_frame(&mut self) -> u64 {
        let handle = self.handle();
        self.frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, frame: u64) {
        self.frames.retain(|existing| *existing != frame);
    }

    fn set_timer(&mut self, delay: Duration) -> u64 {
        let handle = self.handle();
        self.timers.insert(handle, delay);
        handle
    }

    fn clear_timer(&mut self, timer: u64) {
        self.timers.remove(&timer);
    }
}
