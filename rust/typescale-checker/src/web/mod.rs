//! Browser bindings.
//!
//! [`WebHost`] implements the host traits over `web-sys`, and [`mount`]
//! wires a [`Checker`] to it so that DOM events, animation frames and timers
//! flow back into [`Checker::handle`]. [`start`] does that for a content
//! script and also connects the checker to the panel.

mod console;
mod host;

pub use console::*;
pub use host::*;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::{Checker, CheckerConfig, TypeScaleError, bridge, host::UiEvent};

/// A checker bound to the current page.
pub type PageChecker = Rc<RefCell<Checker<WebHost>>>;

/// Create a checker for the current page. Call [`Checker::install`] on it to
/// enable the keyboard shortcut.
pub fn mount(config: CheckerConfig) -> Result<PageChecker, TypeScaleError> {
    config.validate()?;
    let window =
        web_sys::window().ok_or_else(|| TypeScaleError::Dom("No global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| TypeScaleError::Dom("Window has no document".into()))?;

    Ok(Rc::new_cyclic(|checker: &Weak<RefCell<Checker<WebHost>>>| {
        let checker = checker.clone();
        let dispatch: Dispatch = Rc::new(move |event| deliver(&checker, event));
        RefCell::new(Checker::new(WebHost::new(window, document, dispatch), config))
    }))
}

/// Mount a checker, install its keyboard shortcut and answer panel messages
/// with it.
///
/// A page without an extension messaging channel still gets the shortcut;
/// the failure to connect is logged instead of returned.
pub fn start(config: CheckerConfig) -> Result<PageChecker, TypeScaleError> {
    let checker = mount(config)?;
    checker.borrow_mut().install();

    let handler = Rc::clone(&checker);
    let connected = bridge::on_message(move |message| {
        let mut checker = handler.try_borrow_mut().map_err(|_| {
            TypeScaleError::Messaging("The checker is busy handling another event".into())
        })?;
        checker.handle_message(message)
    });
    if let Err(error) = connected {
        tracing::warn!(%error, "Panel messaging is unavailable, only the shortcut will work");
    }

    Ok(checker)
}

fn deliver(checker: &Weak<RefCell<Checker<WebHost>>>, event: UiEvent) {
    let Some(cell) = checker.upgrade() else {
        return;
    };
    let Ok(mut checker) = cell.try_borrow_mut() else {
        tracing::debug!(?event, "Dropping event delivered while the checker is busy");
        return;
    };
    if let Err(error) = checker.handle(event) {
        tracing::warn!(%error, "Failed to handle event");
    }
}
