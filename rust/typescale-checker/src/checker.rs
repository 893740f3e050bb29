//! The checker's activation lifecycle.
//!
//! A [`Checker`] owns the host document and toggles between inactive and
//! active. Activating scans the page, highlights the flagged elements and
//! renders the [`Overlay`]; deactivating reverses all of it, except for the
//! ids the panel was last sent. While active, a window resize schedules a
//! debounced re-scan.
//!
//! Every DOM event, animation frame and timer the checker asked for comes
//! back through [`Checker::handle`]; cross-script requests arrive through
//! [`Checker::handle_message`].

use crate::{
    CheckerConfig, TypeScaleError, highlight,
    host::{KeyInput, ListenKind, ListenTarget, OverlayHost, UiEvent},
    message::{Message, NodeRef, ReportPayload},
    overlay::{IdOwner, IdRegistry, Overlay},
    scanner::{ClassificationReport, Scanner},
};

/// Everything that exists only while the checker is active.
struct Session<H: OverlayHost> {
    root: H::Element,
    overlay: Overlay<H>,
    resize: H::Listener,
    pending_refresh: Option<H::Timer>,
}

pub struct Checker<H: OverlayHost> {
    host: H,
    config: CheckerConfig,
    keyboard: Option<H::Listener>,
    session: Option<Session<H>>,
    /// Ids handed out to the overlay and to report payloads
    ids: IdRegistry<H::Element>,
}

impl<H: OverlayHost> Checker<H> {
    pub fn new(host: H, config: CheckerConfig) -> Self {
        let ids = IdRegistry::new(config.id_prefix.clone());
        Self {
            host,
            config,
            keyboard: None,
            session: None,
            ids,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the keyboard shortcut is being listened for.
    pub fn is_installed(&self) -> bool {
        self.keyboard.is_some()
    }

    /// The overlay, while active.
    pub fn overlay(&self) -> Option<&Overlay<H>> {
        self.session.as_ref().map(|session| &session.overlay)
    }

    /// Start listening for the keyboard shortcut. Installing twice has no
    /// further effect.
    pub fn install(&mut self) {
        if self.keyboard.is_none() {
            self.keyboard = Some(self.host.listen(ListenTarget::Window, ListenKind::KeyDown));
        }
    }

    /// Scan the document body.
    ///
    /// The overlay's own text is left out of the report.
    pub fn scan(&self) -> Result<ClassificationReport<H::Element>, TypeScaleError> {
        let body = self.host.body();
        let mut report = Scanner::new(&self.host, &self.config).scan(body.as_ref())?;

        if let Some(session) = &self.session {
            let container = session.overlay.container();
            let overlay: Vec<H::Element> = std::iter::once(container.clone())
                .chain(self.host.descendants(container))
                .collect();
            report.retain(|element| !overlay.contains(element));
        }

        Ok(report)
    }

    /// Scan, highlight and show the overlay. Does nothing when already
    /// active.
    pub fn activate(&mut self) -> Result<(), TypeScaleError> {
        if self.session.is_some() {
            return Ok(());
        }

        let root = self.host.body().ok_or_else(|| {
            TypeScaleError::InvalidInput("The document has no body to check".into())
        })?;
        let overlay = self.present(&root)?;
        let resize = self.host.listen(ListenTarget::Window, ListenKind::Resize);

        tracing::info!(
            flagged = overlay.items().len(),
            "Type scale checker activated"
        );
        self.session = Some(Session {
            root,
            overlay,
            resize,
            pending_refresh: None,
        });
        Ok(())
    }

    /// Remove the overlay, its listeners and every highlight from the page.
    /// Safe to call when inactive.
    ///
    /// Ids sent to the panel in the last report stay in place so the panel
    /// can keep pointing at elements.
    pub fn deactivate(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let Session {
            root,
            overlay,
            resize,
            pending_refresh,
        } = session;

        overlay.teardown(&mut self.host, &mut self.ids);
        highlight::clear(&mut self.host, &root, &self.config);
        self.host.unlisten(resize);
        if let Some(timer) = pending_refresh {
            self.host.clear_timer(timer);
        }
        tracing::info!("Type scale checker deactivated");
    }

    pub fn toggle(&mut self) -> Result<(), TypeScaleError> {
        if self.is_active() {
            self.deactivate();
            Ok(())
        } else {
            self.activate()
        }
    }

    /// React to an event delivered by the host.
    pub fn handle(&mut self, event: UiEvent) -> Result<(), TypeScaleError> {
        match event {
            UiEvent::Key(key) => return self.handle_key(&key),
            UiEvent::Resize => self.schedule_refresh(),
            UiEvent::ResizeSettled => return self.refresh(),
            UiEvent::Close => self.deactivate(),
            event => {
                let Some(session) = self.session.as_mut() else {
                    tracing::debug!(?event, "Ignoring event while inactive");
                    return Ok(());
                };
                let overlay = &mut session.overlay;
                match event {
                    UiEvent::Frame => overlay.step_scroll(&mut self.host),
                    UiEvent::HoverStart { item } => overlay.hover_start(&mut self.host, item),
                    UiEvent::HoverEnd { .. } => overlay.hover_end(&mut self.host),
                    UiEvent::ItemClick { item } => overlay.navigate(&mut self.host, item),
                    UiEvent::DragStart { page_x, page_y } => {
                        overlay.drag_start(&mut self.host, page_x, page_y)
                    }
                    UiEvent::DragMove { page_x, page_y } => {
                        overlay.drag_move(&mut self.host, page_x, page_y);
                    }
                    UiEvent::DragEnd => overlay.drag_end(&mut self.host),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Answer a message from another script context.
    pub fn handle_message(&mut self, message: Message) -> Result<Option<Message>, TypeScaleError> {
        match message {
            Message::RequestReport => {
                let report = self.scan()?;
                self.ids.release(&mut self.host, IdOwner::Report);
                let payload = ReportPayload::from_report(&mut self.host, &report, &mut self.ids);
                Ok(Some(Message::SendReport(payload)))
            }
            Message::HighlightNode(node) => {
                self.mark(&node, true);
                Ok(None)
            }
            Message::RemoveHighlightNode(node) => {
                self.mark(&node, false);
                Ok(None)
            }
            Message::SendReport(_) => {
                tracing::debug!("Ignoring report addressed to the panel");
                Ok(None)
            }
        }
    }

    fn handle_key(&mut self, key: &KeyInput) -> Result<(), TypeScaleError> {
        if key.is_escape() {
            self.deactivate();
            Ok(())
        } else if key.ctrl && key.key.eq_ignore_ascii_case(&self.config.toggle_key) {
            self.toggle()
        } else {
            Ok(())
        }
    }

    fn mark(&mut self, node: &NodeRef, active: bool) {
        let Some(element) = self.host.element_by_id(&node.id) else {
            tracing::warn!(id = %node.id, "No element with the requested id");
            return;
        };
        let class = self.config.active_class();
        if active {
            self.host.add_class(&element, &class);
        } else {
            self.host.remove_class(&element, &class);
        }
    }

    fn schedule_refresh(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(timer) = session.pending_refresh.take() {
            self.host.clear_timer(timer);
        }
        session.pending_refresh = Some(self.host.set_timer(self.config.resize_debounce()));
    }

    /// Rebuild highlights and overlay for the current viewport. The old
    /// overlay is removed first so it is not scanned.
    fn refresh(&mut self) -> Result<(), TypeScaleError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let Session {
            root,
            overlay,
            resize,
            pending_refresh,
        } = session;

        overlay.teardown(&mut self.host, &mut self.ids);
        highlight::clear(&mut self.host, &root, &self.config);
        if let Some(timer) = pending_refresh {
            self.host.clear_timer(timer);
        }

        match self.present(&root) {
            Ok(overlay) => {
                self.session = Some(Session {
                    root,
                    overlay,
                    resize,
                    pending_refresh: None,
                });
                Ok(())
            }
            Err(error) => {
                self.host.unlisten(resize);
                Err(error)
            }
        }
    }

    fn present(&mut self, root: &H::Element) -> Result<Overlay<H>, TypeScaleError> {
        let report = Scanner::new(&self.host, &self.config).scan(Some(root))?;
        highlight::apply(&mut self.host, &report, &self.config);

        Overlay::render(&mut self.host, root, &report, &mut self.ids, &self.config).inspect_err(
            |_| {
                highlight::clear(&mut self.host, root, &self.config);
                self.ids.release(&mut self.host, IdOwner::Overlay);
            },
        )
    }
}

impl<H: OverlayHost> Drop for Checker<H> {
    fn drop(&mut self) {
        self.deactivate();
        self.ids.clear(&mut self.host);
        if let Some(keyboard) = self.keyboard.take() {
            self.host.unlisten(keyboard);
        }
    }
}
