//! Report rendering for the panel.

use leptos::prelude::*;

use crate::message::{Message, NodeRef, ReportEntry, ReportPayload};

/// One-line summary of a report.
pub fn summary(payload: &ReportPayload) -> String {
    format!(
        "{} @ {}px: {} ok, {} warnings, {} errors",
        payload.breakpoint,
        payload.viewport_width,
        payload.ok,
        payload.warning.len(),
        payload.error.len()
    )
}

/// Ask the inspected page to toggle the spotlight on an element.
fn forward(message: Message) {
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(error) = crate::bridge::send_to_active_tab(&message).await {
            tracing::warn!(%error, "Could not reach the inspected page");
        }
    });

    #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
    tracing::debug!(?message, "No page to forward to");
}

#[component]
pub fn ReportView(payload: ReportPayload) -> impl IntoView {
    let line = summary(&payload);

    view! {
        <div class="report">
            <p class="report-summary">{line}</p>
            <FindingList title="Errors" entries=payload.error />
            <FindingList title="Warnings" entries=payload.warning />
        </div>
    }
}

#[component]
pub fn FindingList(title: &'static str, entries: Vec<ReportEntry>) -> impl IntoView {
    let heading = format!("{title}: {}", entries.len());

    view! {
        <section class="finding-list">
            <h2>{heading}</h2>
            <ul>
                {entries
                    .into_iter()
                    .map(|entry| view! { <FindingRow entry=entry /> })
                    .collect::<Vec<_>>()}
            </ul>
        </section>
    }
}

/// A flagged element. Hovering the row spotlights the element in the page.
#[component]
pub fn FindingRow(entry: ReportEntry) -> impl IntoView {
    let enter_id = entry.id.clone();
    let leave_id = entry.id.clone();

    view! {
        <li
            class="finding"
            on:mouseenter=move |_| forward(Message::HighlightNode(NodeRef::new(enter_id.clone())))
            on:mouseleave=move |_| {
                forward(Message::RemoveHighlightNode(NodeRef::new(leave_id.clone())))
            }
        >
            <code class="finding-tag">{format!("<{}>", entry.tag)}</code>
            " "
            <span class="finding-size">{entry.computed_font_size}</span>
        </li>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::scale::Breakpoint;

    #[test]
    fn it_summarizes_a_report_in_one_line() {
        let payload = ReportPayload {
            breakpoint: Breakpoint::Md,
            viewport_width: 800.0,
            ok: 12,
            warning: Vec::new(),
            error: vec![ReportEntry {
                id: "type-checker-node-0000002a".into(),
                tag: "small".into(),
                font_size: 13.0,
                computed_font_size: "13px".into(),
            }],
        };

        assert_eq!(summary(&payload), "MD @ 800px: 12 ok, 0 warnings, 1 errors");
    }
}
