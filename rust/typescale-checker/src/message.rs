//! Messages exchanged between the content script and the extension panel.
//!
//! A [`Message`] serializes as a tagged `{type, data}` object. Between script
//! contexts it travels as JSON inside an envelope:
//!
//! ```text
//! request:  { __typeChecker: true, payload: "<Message JSON>" }
//! reply:    { payload: "<Message JSON>" }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    TypeScaleError,
    host::OverlayHost,
    overlay::{IdOwner, IdRegistry},
    scale::Breakpoint,
    scanner::{ClassificationReport, Finding},
};

/// Envelope field marking a message as one of ours.
pub const ENVELOPE_MARKER: &str = "__typeChecker";

/// Envelope field holding the serialized [`Message`].
pub const ENVELOPE_PAYLOAD: &str = "payload";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Message {
    /// Ask the page for its current report
    RequestReport,
    /// The page's answer to [`Message::RequestReport`]
    SendReport(ReportPayload),
    /// Spotlight the element with the given id
    HighlightNode(NodeRef),
    /// Undo [`Message::HighlightNode`]
    RemoveHighlightNode(NodeRef),
}

impl Message {
    pub fn to_json(&self) -> Result<String, TypeScaleError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TypeScaleError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reference to a page element by its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
}

impl NodeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A flagged element as seen from another script context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: String,
    pub tag: String,
    pub font_size: f64,
    pub computed_font_size: String,
}

/// A serializable summary of a [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub breakpoint: Breakpoint,
    pub viewport_width: f64,
    /// How many occurrences passed
    pub ok: usize,
    pub warning: Vec<ReportEntry>,
    pub error: Vec<ReportEntry>,
}

impl ReportPayload {
    /// Summarize `report`, giving each flagged element an id through
    /// `registry` so the receiver can refer back to it. The ids are held for
    /// [`IdOwner::Report`] until that owner is released.
    pub fn from_report<H: OverlayHost>(
        host: &mut H,
        report: &ClassificationReport<H::Element>,
        registry: &mut IdRegistry<H::Element>,
    ) -> Self {
        let mut entries = |findings: &[Finding<H::Element>]| -> Vec<ReportEntry> {
            findings
                .iter()
                .map(|finding| ReportEntry {
                    id: registry.assign(host, &finding.element, IdOwner::Report),
                    tag: host.tag_name(&finding.element),
                    font_size: finding.font_size,
                    computed_font_size: finding.computed_font_size.clone(),
                })
                .collect()
        };

        let error = entries(&report.error);
        let warning = entries(&report.warning);

        Self {
            breakpoint: report.breakpoint,
            viewport_width: report.viewport_width,
            ok: report.ok.len(),
            warning,
            error,
        }
    }

    pub fn flagged(&self) -> usize {
        self.warning.len() + self.error.len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        CheckerConfig, Scanner, helpers::FakeDocument, host::StyleHost, style::ComputedStyle,
    };

    #[test]
    fn it_uses_the_tagged_wire_format() -> anyhow::Result<()> {
        let highlight = Message::HighlightNode(NodeRef::new("intro"));
        let value: serde_json::Value = serde_json::from_str(&highlight.to_json()?)?;
        assert_eq!(value, json!({ "type": "highlight_node", "data": { "id": "intro" } }));

        let request: serde_json::Value = serde_json::from_str(&Message::RequestReport.to_json()?)?;
        assert_eq!(request, json!({ "type": "request_report" }));

        let removal = Message::from_json(r#"{"type":"remove_highlight_node","data":{"id":"x"}}"#)?;
        assert_eq!(removal, Message::RemoveHighlightNode(NodeRef::new("x")));
        Ok(())
    }

    #[test]
    fn it_rejects_unknown_message_types() {
        let result = Message::from_json(r#"{"type":"launch_rockets"}"#);
        assert!(matches!(result, Err(TypeScaleError::MalformedMessage(_))));
    }

    #[test]
    fn it_summarizes_a_report_with_linkable_ids() -> anyhow::Result<()> {
        let config = CheckerConfig::default();
        let mut document = FakeDocument::new(1800.0, 900.0);
        let body = document.root();
        let wrong = document.push_element(body, "small", ComputedStyle::visible(13.0));
        document.push_text(wrong, "wrong");
        let fine = document.push_element(body, "p", ComputedStyle::visible(16.0));
        document.push_text(fine, "fine");

        let report = Scanner::new(&document, &config).scan(document.body().as_ref())?;
        let mut registry = IdRegistry::new(config.id_prefix.clone());
        let payload = ReportPayload::from_report(&mut document, &report, &mut registry);

        assert_eq!(payload.breakpoint, Breakpoint::Max);
        assert_eq!(payload.ok, 1);
        assert!(payload.warning.is_empty());
        assert_eq!(payload.error.len(), 1);
        assert_eq!(payload.error[0].tag, "small");
        assert_eq!(payload.error[0].computed_font_size, "13px");
        assert_eq!(document.element_by_id(&payload.error[0].id), Some(wrong));
        assert_eq!(registry.held_by(IdOwner::Report), 1);

        let message = Message::SendReport(payload.clone());
        let value: serde_json::Value = serde_json::from_str(&message.to_json()?)?;
        assert_eq!(value["type"], "send_report");
        assert_eq!(value["data"]["breakpoint"], "MAX");
        assert_eq!(Message::from_json(&message.to_json()?)?, message);
        Ok(())
    }
}
