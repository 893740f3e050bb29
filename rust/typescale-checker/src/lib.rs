//! Browser extension that audits a page's rendered text against a type scale.
//!
//! `typescale-checker` walks the live document, works out which sizes of the
//! design system's fluid type scale are in effect at the current viewport
//! width, and classifies every visible text-bearing element as conforming,
//! a warning (on the static scale only) or an error (on neither scale).
//! Flagged elements are highlighted in place and listed in a draggable
//! overlay that links back to them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │ Content script (host page)                │
//! │                                           │
//! │  keydown / resize / overlay pointer       │
//! │        │                                  │
//! │        ▼                                  │
//! │  Checker ── Scanner ── fluid / scale      │
//! │     │                                     │
//! │     ├── highlight (classes + titles)      │
//! │     └── Overlay (view, drag, scroll, ids) │
//! │        ▲                                  │
//! └────────│──────────────────────────────────┘
//!          │ { __typeChecker: true, payload }
//! ┌────────│──────────────────────────────────┐
//! │ Panel  │  (extension origin)              │
//! │  ReportPanel ── bridge ───────────────────┘
//! └───────────────────────────────────────────┘
//! ```
//!
//! The core never touches browser globals. It is written against the
//! [`host::StyleHost`] and [`host::OverlayHost`] traits; on `wasm32` the
//! `web` module binds them to `web-sys`, and tests bind them to the
//! in-memory `helpers::FakeDocument`.
//!
//! # Modules
//!
//! - **[`scale`]**: breakpoints, the static scale and the fluid scale table.
//! - **[`fluid`]**: resolves the fluid scale for a viewport width.
//! - **[`scanner`]**: classifies text-bearing elements into a report.
//! - **[`highlight`]**: marks flagged elements in place.
//! - **[`overlay`]**: the interactive report overlay.
//! - **[`checker`]**: activation lifecycle, shortcuts, resize handling and
//!   cross-script messages.
//! - **[`message`]**: the `{type, data}` message protocol.
//! - **[`components`]**: Leptos UI for the extension panel.
//!
//! # Entry points
//!
//! - **`content`** binary: injected into the page; mounts the checker and
//!   answers panel messages.
//! - **`panel`** binary: mounts the report panel.

mod error;
pub use error::*;

mod config;
pub use config::*;

pub mod fluid;
pub mod highlight;
pub mod host;
pub mod message;
pub mod overlay;
pub mod scale;
pub mod scanner;
pub mod style;

mod checker;
pub use checker::*;

pub use scanner::Scanner;

#[cfg(any(test, feature = "helpers"))]
pub mod helpers;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod web;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod bridge;

pub mod components;
