//! Compliance scanning of rendered text.
//!
//! [`Scanner::scan`] walks every element below a root, picks out the
//! elements that directly contain non-whitespace text, and classifies each
//! one by its resolved font size:
//!
//! - **ok**: invisible, or within tolerance of a size on the active fluid scale
//! - **warning**: visible, off the fluid scale, but exactly on the static scale
//! - **error**: visible and on neither scale
//!
//! An element with several qualifying text children is classified once per
//! text child.

use serde::Serialize;

use crate::{
    CheckerConfig, TypeScaleError,
    fluid::resolve_scale_at,
    host::{ChildNode, StyleHost},
    scale::{Breakpoint, static_scale},
    style::parse_float,
};

/// Result of classifying one text-bearing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

/// A classified text-bearing element.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding<E> {
    pub element: E,
    /// Font size compared against the scales, serif adjustment included
    pub font_size: f64,
    /// The font size exactly as the host reported it
    pub computed_font_size: String,
    pub visible: bool,
}

/// The partition of one scan's text-bearing elements.
///
/// Each list keeps document traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport<E> {
    pub breakpoint: Breakpoint,
    pub viewport_width: f64,
    pub ok: Vec<Finding<E>>,
    pub warning: Vec<Finding<E>>,
    pub error: Vec<Finding<E>>,
}

impl<E> ClassificationReport<E> {
    fn new(breakpoint: Breakpoint, viewport_width: f64) -> Self {
        Self {
            breakpoint,
            viewport_width,
            ok: Vec::new(),
            warning: Vec::new(),
            error: Vec::new(),
        }
    }

    fn push(&mut self, severity: Severity, finding: Finding<E>) {
        match severity {
            Severity::Ok => self.ok.push(finding),
            Severity::Warning => self.warning.push(finding),
            Severity::Error => self.error.push(finding),
        }
    }

    /// Number of classified occurrences across all three lists.
    pub fn len(&self) -> usize {
        self.ok.len() + self.warning.len() + self.error.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the findings whose element satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) {
        for findings in [&mut self.ok, &mut self.warning, &mut self.error] {
            findings.retain(|finding| keep(&finding.element));
        }
    }

    /// Warnings and errors, errors first.
    pub fn flagged(&self) -> impl Iterator<Item = (Severity, &Finding<E>)> {
        self.error
            .iter()
            .map(|finding| (Severity::Error, finding))
            .chain(self.warning.iter().map(|finding| (Severity::Warning, finding)))
    }
}

/// Classifies the text of a host document against the type scales.
pub struct Scanner<'a, H: StyleHost> {
    host: &'a H,
    config: &'a CheckerConfig,
}

impl<'a, H: StyleHost> Scanner<'a, H> {
    pub fn new(host: &'a H, config: &'a CheckerConfig) -> Self {
        Self { host, config }
    }

    /// Elements that directly hold non-whitespace text, once per such text
    /// child, in traversal order.
    pub fn text_bearing_elements(&self, root: &H::Element) -> Vec<H::Element> {
        self.host
            .descendants(root)
            .into_iter()
            .flat_map(|element| {
                self.host
                    .child_nodes(&element)
                    .into_iter()
                    .filter(|child| match child {
                        ChildNode::Text(text) => text.chars().any(|c| !c.is_whitespace()),
                        _ => false,
                    })
                    .map(move |_| element.clone())
            })
            .collect()
    }

    /// Classify every text-bearing element under `root`.
    ///
    /// Fails with [`TypeScaleError::InvalidInput`] when no root is given.
    pub fn scan(
        &self,
        root: Option<&H::Element>,
    ) -> Result<ClassificationReport<H::Element>, TypeScaleError> {
        let root = root.ok_or_else(|| {
            TypeScaleError::InvalidInput(
                "A root element must be supplied to check for sizing errors".into(),
            )
        })?;

        let breakpoints = &self.config.breakpoints;
        let viewport_width = self.host.viewport_width();
        let breakpoint = breakpoints.classify(viewport_width);
        let fluid_scale = resolve_scale_at(breakpoints, breakpoint, self.host.window_width());
        let static_scale = static_scale();
        let base_font_size = base_font_size(self.host.root_font_size());

        let mut report = ClassificationReport::new(breakpoint, viewport_width);

        for element in self.text_bearing_elements(root) {
            let style = self.host.computed_style(&element);
            let adjustment = if style.is_serif() {
                self.config.serif_adjustment
            } else {
                0.0
            };
            let font_size = parse_float(&style.font_size) + adjustment;
            let visible = style.is_visible(base_font_size);

            let fluid_match = fluid_scale
                .iter()
                .any(|size| (size - font_size).abs() < self.config.fluid_tolerance);
            let static_match = static_scale.iter().any(|size| *size == font_size);

            let severity = match (visible, fluid_match, static_match) {
                (false, _, _) | (true, true, _) => Severity::Ok,
                (true, false, true) => Severity::Warning,
                (true, false, false) => Severity::Error,
            };

            report.push(
                severity,
                Finding {
                    element,
                    font_size,
                    computed_font_size: style.font_size,
                    visible,
                },
            );
        }

        tracing::debug!(
            breakpoint = %report.breakpoint,
            viewport_width,
            ok = report.ok.len(),
            warning = report.warning.len(),
            error = report.error.len(),
            "Scanned document for type scale compliance"
        );

        Ok(report)
    }
}

fn base_font_size(root_font_size: f64) -> f64 {
    if root_font_size.is_finite() && root_font_size > 0.0 {
        root_font_size
    } else {
        16.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        helpers::{FakeDocument, FakeElement},
        style::ComputedStyle,
    };

    fn paragraph(document: &mut FakeDocument, style: ComputedStyle, text: &str) -> FakeElement {
        let body = document.root();
        let element = document.push_element(body, "p", style);
        document.push_text(element, text);
        element
    }

    fn scan(document: &FakeDocument) -> anyhow::Result<ClassificationReport<FakeElement>> {
        let config = CheckerConfig::default();
        let body = document.body();
        Ok(Scanner::new(document, &config).scan(body.as_ref())?)
    }

    #[test]
    fn it_rejects_a_missing_root() {
        let document = FakeDocument::new(1280.0, 800.0);
        let config = CheckerConfig::default();

        let result = Scanner::new(&document, &config).scan(None);

        assert!(matches!(result, Err(TypeScaleError::InvalidInput(_))));
    }

    #[test_log::test]
    fn it_accepts_sixteen_pixels_at_the_max_breakpoint() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(1800.0, 900.0);
        paragraph(&mut document, ComputedStyle::visible(16.0), "Body copy");

        let report = scan(&document)?;

        assert_eq!(report.breakpoint, Breakpoint::Max);
        assert_eq!(report.ok.len(), 1);
        assert!(report.warning.is_empty());
        assert!(report.error.is_empty());
        Ok(())
    }

    #[test]
    fn it_flags_sizes_on_neither_scale_as_errors() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(1280.0, 800.0);
        paragraph(&mut document, ComputedStyle::visible(13.0), "Too small");

        let report = scan(&document)?;

        assert_eq!(report.error.len(), 1);
        assert_eq!(report.error[0].font_size, 13.0);
        assert_eq!(report.error[0].computed_font_size, "13px");
        Ok(())
    }

    #[test]
    fn it_warns_about_static_sizes_off_the_fluid_scale() -> anyhow::Result<()> {
        // 2.25em = 36px is on the static scale but no slot resolves to it at MAX.
        let mut document = FakeDocument::new(1800.0, 900.0);
        paragraph(&mut document, ComputedStyle::visible(36.0), "Heading");

        let report = scan(&document)?;

        assert_eq!(report.warning.len(), 1);
        assert!(report.error.is_empty());
        Ok(())
    }

    #[test]
    fn it_matches_the_fluid_scale_within_an_exclusive_tolerance() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(1800.0, 900.0);
        paragraph(&mut document, ComputedStyle::visible(16.24999), "Near");
        paragraph(&mut document, ComputedStyle::visible(16.25), "Edge");

        let report = scan(&document)?;

        assert_eq!(report.ok.len(), 1);
        assert_eq!(report.ok[0].font_size, 16.24999);
        assert_eq!(report.error.len(), 1);
        assert_eq!(report.error[0].font_size, 16.25);
        Ok(())
    }

    #[test]
    fn it_matches_the_static_scale_exactly() -> anyhow::Result<()> {
        // At 300px the fluid scale has no 36px or 36.01px entry.
        let mut document = FakeDocument::new(300.0, 600.0);
        paragraph(&mut document, ComputedStyle::visible(36.0), "Exact");
        paragraph(&mut document, ComputedStyle::visible(36.01), "Off");

        let report = scan(&document)?;

        assert_eq!(report.warning.len(), 1);
        assert_eq!(report.warning[0].font_size, 36.0);
        assert_eq!(report.error.len(), 1);
        assert_eq!(report.error[0].font_size, 36.01);
        Ok(())
    }

    #[test]
    fn it_interpolates_from_the_window_width_beside_a_scrollbar() -> anyhow::Result<()> {
        // A 15px scrollbar narrows the root element but not the window.
        let mut document = FakeDocument::new(1000.0, 800.0);
        document.set_viewport_width(985.0);
        let size = crate::fluid::fluid_type(4.25, 9.75, 640.0, 1056.0, 1000.0);
        let body = document.root();
        let heading = document.push_element(body, "h1", ComputedStyle::visible(size));
        document.push_text(heading, "Display");

        let report = scan(&document)?;

        assert_eq!(report.breakpoint, Breakpoint::Md);
        assert_eq!(report.viewport_width, 985.0);
        assert_eq!(report.ok.len(), 1);
        assert!(report.error.is_empty());
        Ok(())
    }

    #[test]
    fn it_treats_invisible_elements_as_ok() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(1280.0, 800.0);
        let mut hidden = ComputedStyle::visible(13.0);
        hidden.display = "none".into();
        paragraph(&mut document, hidden, "Hidden");

        let report = scan(&document)?;

        assert_eq!(report.ok.len(), 1);
        assert!(!report.ok[0].visible);
        assert!(report.error.is_empty());
        Ok(())
    }

    #[test]
    fn it_adds_a_pixel_to_serif_faces() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(1800.0, 900.0);
        let mut serif = ComputedStyle::visible(15.0);
        serif.font_family = "\"IBM Plex Serif\", serif".into();
        paragraph(&mut document, serif, "Serif");

        let report = scan(&document)?;

        assert_eq!(report.ok.len(), 1);
        assert_eq!(report.ok[0].font_size, 16.0);
        Ok(())
    }

    #[test]
    fn it_classifies_once_per_text_child_and_skips_whitespace() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(1280.0, 800.0);
        let body = document.root();
        let section = document.push_element(body, "section", ComputedStyle::visible(16.0));
        document.push_text(section, "   \n\t ");
        let paragraph = document.push_element(section, "p", ComputedStyle::visible(13.0));
        document.push_text(paragraph, "First");
        let emphasis = document.push_element(paragraph, "em", ComputedStyle::visible(16.0));
        document.push_text(emphasis, "inner");
        document.push_text(paragraph, "Second");

        let config = CheckerConfig::default();
        let scanner = Scanner::new(&document, &config);
        let text_bearing = scanner.text_bearing_elements(&body);

        assert_eq!(text_bearing, vec![paragraph, paragraph, emphasis]);

        let report = scanner.scan(Some(&body))?;
        assert_eq!(report.len(), text_bearing.len());
        assert_eq!(report.error.len(), 2);
        Ok(())
    }

    #[test]
    fn it_partitions_every_text_bearing_element_once() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(900.0, 800.0);
        for size in [12.0, 13.0, 14.0, 16.0, 20.0, 24.0, 36.0, 41.0, 64.0] {
            paragraph(&mut document, ComputedStyle::visible(size), "copy");
        }
        let mut hidden = ComputedStyle::visible(13.0);
        hidden.visibility = "hidden".into();
        paragraph(&mut document, hidden, "hidden");

        let report = scan(&document)?;

        assert_eq!(report.len(), 10);
        let mut seen: Vec<usize> = report
            .ok
            .iter()
            .chain(report.warning.iter())
            .chain(report.error.iter())
            .map(|finding| finding.element.index())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 10);
        Ok(())
    }

    #[test]
    fn it_uses_the_root_font_size_as_the_visibility_threshold() -> anyhow::Result<()> {
        let mut document = FakeDocument::new(1280.0, 800.0);
        document.set_root_font_size(40.0);
        let mut compact = ComputedStyle::visible(13.0);
        compact.height = "32px".into();
        paragraph(&mut document, compact, "Compact");

        let report = scan(&document)?;

        assert_eq!(report.ok.len(), 1);
        assert!(!report.ok[0].visible);
        Ok(())
    }
}
