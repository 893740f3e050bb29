//! The floating report overlay.
//!
//! [`Overlay::render`] lists every error and warning of a report, errors
//! first, each entry deep-linking to its element. Hovering an entry
//! spotlights the element, clicking it scrolls the element into the middle
//! of the window, and the header drags the overlay around within the
//! window. [`Overlay::teardown`] returns the page to its prior state.

mod drag;
mod registry;
mod scroll;
mod view;

pub use drag::*;
pub use registry::*;
pub use scroll::*;
pub use view::*;

use crate::{
    CheckerConfig, TypeScaleError,
    host::{ListenKind, ListenTarget, OverlayHost},
    scanner::ClassificationReport,
};

/// A rendered overlay and the interaction state attached to it.
pub struct Overlay<H: OverlayHost> {
    root: H::Element,
    view: OverlayView<H::Element>,
    pointer: Option<H::Listener>,
    hovered: Option<usize>,
    drag: Option<DragSession<H::Listener>>,
    scroll: Option<ScrollAnimation<H::Frame>>,
    focus_class: String,
    active_class: String,
    scroll_easing: f64,
    scroll_settle_distance: f64,
}

impl<H: OverlayHost> Overlay<H> {
    /// Build the overlay for `report` under `root` and start listening for
    /// pointer interaction on it.
    pub fn render(
        host: &mut H,
        root: &H::Element,
        report: &ClassificationReport<H::Element>,
        registry: &mut IdRegistry<H::Element>,
        config: &CheckerConfig,
    ) -> Result<Self, TypeScaleError> {
        let view = view::build(host, root, report, registry, config)?;
        let pointer = host.listen(
            ListenTarget::Element(view.container.clone()),
            ListenKind::OverlayPointer,
        );

        Ok(Self {
            root: root.clone(),
            view,
            pointer: Some(pointer),
            hovered: None,
            drag: None,
            scroll: None,
            focus_class: config.focus_class(),
            active_class: config.active_class(),
            scroll_easing: config.scroll_easing,
            scroll_settle_distance: config.scroll_settle_distance,
        })
    }

    pub fn container(&self) -> &H::Element {
        &self.view.container
    }

    pub fn items(&self) -> &[OverlayItem<H::Element>] {
        &self.view.items
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    /// Spotlight the element behind entry `item`.
    pub fn hover_start(&mut self, host: &mut H, item: usize) {
        let Some(entry) = self.view.items.get(item) else {
            return;
        };
        let target = entry.target.clone();
        self.hover_end(host);

        host.add_class(&self.root, &self.focus_class);
        host.add_class(&target, &self.active_class);
        self.hovered = Some(item);
    }

    /// Undo [`Overlay::hover_start`].
    pub fn hover_end(&mut self, host: &mut H) {
        if let Some(item) = self.hovered.take() {
            if let Some(entry) = self.view.items.get(item) {
                host.remove_class(&entry.target, &self.active_class);
            }
            host.remove_class(&self.root, &self.focus_class);
        }
    }

    /// Start scrolling the element behind entry `item` to the middle of the
    /// window. A scroll already in flight is abandoned.
    pub fn navigate(&mut self, host: &mut H, item: usize) {
        let Some(entry) = self.view.items.get(item) else {
            return;
        };
        let target = centered_offset(host, &entry.target);
        if let Some(previous) = self.scroll.take() {
            previous.cancel(host);
        }

        tracing::debug!(item, target, "Scrolling to flagged element");
        self.scroll = Some(ScrollAnimation::start(
            host,
            target,
            self.scroll_easing,
            self.scroll_settle_distance,
        ));
    }

    /// Advance the scroll animation on an animation frame.
    pub fn step_scroll(&mut self, host: &mut H) {
        let running = match self.scroll.as_mut() {
            Some(animation) => animation.step(host),
            None => return,
        };
        if !running {
            self.scroll = None;
        }
    }

    pub fn drag_start(&mut self, host: &mut H, page_x: f64, page_y: f64) {
        self.drag_end(host);
        self.drag = Some(DragSession::begin(
            host,
            &self.view.container,
            page_x,
            page_y,
        ));
    }

    /// Follow the pointer while dragging. Returns the new `(left, top)`.
    pub fn drag_move(&mut self, host: &mut H, page_x: f64, page_y: f64) -> Option<(f64, f64)> {
        self.drag
            .as_ref()
            .map(|session| session.follow(host, &self.view.container, page_x, page_y))
    }

    pub fn drag_end(&mut self, host: &mut H) {
        if let Some(session) = self.drag.take() {
            session.end(host);
        }
    }

    /// Detach the overlay and every listener, frame and class it added, and
    /// release its hold on the ids `registry` generated for it. Ids a report
    /// still refers to stay in place.
    pub fn teardown(mut self, host: &mut H, registry: &mut IdRegistry<H::Element>) {
        self.hover_end(host);
        if let Some(animation) = self.scroll.take() {
            animation.cancel(host);
        }
        self.drag_end(host);
        if let Some(pointer) = self.pointer.take() {
            host.unlisten(pointer);
        }
        host.remove_element(&self.view.container);
        registry.release(host, IdOwner::Overlay);
    }
}

impl<H: OverlayHost> std::fmt::Debug for Overlay<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("items", &self.view.items.len())
            .field("hovered", &self.hovered)
            .field("dragging", &self.drag.is_some())
            .field("scrolling", &self.scroll.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        Scanner,
        helpers::{FakeDocument, FakeElement},
        host::{Rect, StyleHost},
        style::ComputedStyle,
    };

    struct Page {
        document: FakeDocument,
        body: FakeElement,
        heading: FakeElement,
        small: FakeElement,
        config: CheckerConfig,
    }

    fn page() -> Page {
        let mut document = FakeDocument::new(1800.0, 900.0);
        let body = document.root();
        let heading = document.push_element(body, "h3", ComputedStyle::visible(36.0));
        document.push_text(heading, "Almost");
        let small = document.push_element(body, "small", ComputedStyle::visible(13.0));
        document.push_text(small, "Wrong");
        let fine = document.push_element(body, "p", ComputedStyle::visible(16.0));
        document.push_text(fine, "Fine");

        Page {
            document,
            body,
            heading,
            small,
            config: CheckerConfig::default(),
        }
    }

    type Rendered = (Overlay<FakeDocument>, IdRegistry<FakeElement>);

    fn render(page: &mut Page) -> anyhow::Result<Rendered> {
        let body = page.document.body();
        let report = Scanner::new(&page.document, &page.config).scan(body.as_ref())?;
        let mut registry = IdRegistry::new(page.config.id_prefix.clone());
        let overlay = Overlay::render(
            &mut page.document,
            &page.body,
            &report,
            &mut registry,
            &page.config,
        )?;
        Ok((overlay, registry))
    }

    #[test]
    fn it_lists_errors_before_warnings() -> anyhow::Result<()> {
        let mut page = page();
        let (overlay, _) = render(&mut page)?;
        let document = &page.document;

        let items = overlay.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].target, page.small);
        assert_eq!(items[0].severity, crate::scanner::Severity::Error);
        assert_eq!(items[1].target, page.heading);
        assert_eq!(items[1].severity, crate::scanner::Severity::Warning);

        assert_eq!(document.text_content(items[0].link), "<small> 13px");
        assert_eq!(
            document.attribute(&items[0].link, "href"),
            Some(format!("#{}", items[0].id))
        );
        assert_eq!(document.element_by_id(&items[0].id), Some(page.small));
        assert!(document.text_content(*overlay.container()).contains("errors: 1"));
        assert!(document.text_content(*overlay.container()).contains("warnings: 1"));
        assert_eq!(document.listener_count(ListenKind::OverlayPointer), 1);
        Ok(())
    }

    #[test]
    fn it_spotlights_the_hovered_element() -> anyhow::Result<()> {
        let mut page = page();
        let (mut overlay, _) = render(&mut page)?;
        let focus = page.config.focus_class();
        let active = page.config.active_class();

        overlay.hover_start(&mut page.document, 0);
        assert!(page.document.has_class(&page.body, &focus));
        assert!(page.document.has_class(&page.small, &active));

        overlay.hover_start(&mut page.document, 1);
        assert!(!page.document.has_class(&page.small, &active));
        assert!(page.document.has_class(&page.heading, &active));

        overlay.hover_end(&mut page.document);
        assert!(!page.document.has_class(&page.body, &focus));
        assert!(!page.document.has_class(&page.heading, &active));
        assert_eq!(overlay.hovered(), None);
        Ok(())
    }

    #[test]
    fn it_ignores_entries_that_do_not_exist() -> anyhow::Result<()> {
        let mut page = page();
        let (mut overlay, _) = render(&mut page)?;

        overlay.hover_start(&mut page.document, 42);
        overlay.navigate(&mut page.document, 42);

        assert_eq!(overlay.hovered(), None);
        assert!(!overlay.is_scrolling());
        Ok(())
    }

    #[test]
    fn it_clamps_a_drag_to_the_window() -> anyhow::Result<()> {
        let mut page = page();
        let (mut overlay, _) = render(&mut page)?;
        let container = *overlay.container();
        page.document.set_rect(
            container,
            Rect {
                top: 16.0,
                left: 1464.0,
                width: 320.0,
                height: 200.0,
            },
        );

        overlay.drag_start(&mut page.document, 1500.0, 30.0);
        let position = overlay.drag_move(&mut page.document, 9000.0, -500.0);

        assert_eq!(position, Some((1480.0, 0.0)));
        let style = |property: &str| page.document.inline_style(container, property);
        assert_eq!(style("left").as_deref(), Some("1480px"));
        assert_eq!(style("top").as_deref(), Some("0px"));
        assert_eq!(style("right").as_deref(), Some("auto"));
        Ok(())
    }

    #[test]
    fn it_does_not_accumulate_drag_listeners() -> anyhow::Result<()> {
        let mut page = page();
        let (mut overlay, _) = render(&mut page)?;

        for _ in 0..5 {
            overlay.drag_start(&mut page.document, 10.0, 10.0);
            overlay.drag_move(&mut page.document, 20.0, 20.0);
            overlay.drag_end(&mut page.document);
        }
        assert_eq!(page.document.listener_count(ListenKind::DragMove), 0);
        assert_eq!(page.document.listener_count(ListenKind::DragEnd), 0);

        overlay.drag_start(&mut page.document, 10.0, 10.0);
        overlay.drag_start(&mut page.document, 10.0, 10.0);
        assert_eq!(page.document.listener_count(ListenKind::DragMove), 1);
        assert_eq!(page.document.listener_count(ListenKind::DragEnd), 1);

        overlay.drag_end(&mut page.document);
        assert_eq!(overlay.drag_move(&mut page.document, 50.0, 50.0), None);
        Ok(())
    }

    #[test]
    fn it_scrolls_the_target_to_the_middle_of_the_window() -> anyhow::Result<()> {
        let mut page = page();
        let (mut overlay, _) = render(&mut page)?;
        page.document.set_rect(
            page.small,
            Rect {
                top: 2000.0,
                left: 0.0,
                width: 400.0,
                height: 100.0,
            },
        );

        overlay.navigate(&mut page.document, 0);
        assert!(overlay.is_scrolling());

        let mut frames = 0;
        while page.document.fire_frame() {
            overlay.step_scroll(&mut page.document);
            frames += 1;
            assert!(frames < 1000, "scroll never settled");
        }

        let remaining = 1600.0 - page.document.scroll_y();
        assert!((0.0..=3.0).contains(&remaining));
        assert!(!overlay.is_scrolling());
        Ok(())
    }

    #[test]
    fn it_restarts_a_scroll_in_flight() -> anyhow::Result<()> {
        let mut page = page();
        let (mut overlay, _) = render(&mut page)?;

        overlay.navigate(&mut page.document, 0);
        overlay.navigate(&mut page.document, 1);

        assert_eq!(page.document.pending_frames(), 1);
        Ok(())
    }

    #[test]
    fn it_leaves_nothing_behind_on_teardown() -> anyhow::Result<()> {
        let mut page = page();
        let (mut overlay, mut registry) = render(&mut page)?;
        let container = *overlay.container();

        overlay.hover_start(&mut page.document, 0);
        overlay.navigate(&mut page.document, 1);
        overlay.drag_start(&mut page.document, 10.0, 10.0);
        // The hovered element disappears before the overlay is closed.
        page.document.remove_element(&page.small);

        overlay.teardown(&mut page.document, &mut registry);

        assert!(!page.document.is_connected(container));
        assert!(page.document.listeners().is_empty());
        assert_eq!(page.document.pending_frames(), 0);
        assert!(page.document.elements_with_id().is_empty());
        assert!(page.document.classes(page.body).is_empty());
        assert!(page.document.classes(page.small).is_empty());
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn it_keeps_ids_a_report_still_links_to() -> anyhow::Result<()> {
        let mut page = page();
        let (overlay, mut registry) = render(&mut page)?;
        let id = overlay.items()[0].id.clone();
        assert_eq!(
            registry.assign(&mut page.document, &page.small, IdOwner::Report),
            id
        );

        overlay.teardown(&mut page.document, &mut registry);

        assert_eq!(page.document.element_by_id(&id), Some(page.small));
        assert_eq!(page.document.elements_with_id(), vec![page.small]);
        assert_eq!(registry.held_by(IdOwner::Overlay), 0);
        Ok(())
    }
}
