//! Leptos UI for the extension panel.
//!
//! The component tree is:
//!
//! ```text
//! ReportApp
//! └── ReportView          (summary line for the inspected tab)
//!     └── FindingList     (errors, then warnings)
//!         └── FindingRow  (hover to spotlight the element in the page)
//! ```

mod report;

pub use report::*;

use leptos::prelude::*;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
use crate::message::Message;
use crate::message::ReportPayload;

/// Root component for the panel.
///
/// Requests a report from the active tab on mount and whenever the user
/// asks for a rescan.
#[component]
pub fn ReportApp() -> impl IntoView {
    let report = RwSignal::new(Option::<ReportPayload>::None);
    let loading = RwSignal::new(true);
    let error_msg = RwSignal::new(Option::<String>::None);

    let load = move || {
        loading.set(true);
        error_msg.set(None);

        #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
        wasm_bindgen_futures::spawn_local(async move {
            match crate::bridge::send_to_active_tab(&Message::RequestReport).await {
                Ok(Some(Message::SendReport(payload))) => report.set(Some(payload)),
                Ok(_) => error_msg.set(Some("The page did not answer with a report".into())),
                Err(error) => error_msg.set(Some(error.to_string())),
            }
            loading.set(false);
        });

        #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
        loading.set(false);
    };
    load();

    view! {
        <div class="type-checker-panel">
            <header class="type-checker-panel__header">
                <h1>"Type scale"</h1>
                <button on:click=move |_| load()>"Rescan"</button>
            </header>
            {move || {
                if loading.get() {
                    view! { <p class="loading">"Checking the page..."</p> }.into_any()
                } else if let Some(err) = error_msg.get() {
                    view! { <p class="error">{err}</p> }.into_any()
                } else {
                    match report.get() {
                        Some(payload) => view! { <ReportView payload=payload /> }.into_any(),
                        None => view! { <p class="empty">"No report yet."</p> }.into_any(),
                    }
                }
            }}
        </div>
    }
}
