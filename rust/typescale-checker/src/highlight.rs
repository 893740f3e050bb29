//! In-page highlighting of flagged elements.
//!
//! Warnings and errors get a severity class and a `title` that shows the
//! computed font size on hover. [`clear`] undoes both, and also drops any
//! spotlight left on an element by the panel.

use crate::{CheckerConfig, host::OverlayHost, scanner::ClassificationReport};

/// Tooltip text for a flagged element.
pub fn title_for(computed_font_size: &str) -> String {
    format!("Computed font-size: {computed_font_size}.")
}

/// Style every warning and error of `report`.
pub fn apply<H: OverlayHost>(
    host: &mut H,
    report: &ClassificationReport<H::Element>,
    config: &CheckerConfig,
) {
    let warning_class = config.warning_class();
    let error_class = config.error_class();

    for finding in &report.warning {
        host.add_class(&finding.element, &warning_class);
        host.set_attribute(&finding.element, "title", &title_for(&finding.computed_font_size));
    }
    for finding in &report.error {
        host.add_class(&finding.element, &error_class);
        host.set_attribute(&finding.element, "title", &title_for(&finding.computed_font_size));
    }
}

/// Remove severity classes and their titles, and the active class, from
/// everything under `root`.
pub fn clear<H: OverlayHost>(host: &mut H, root: &H::Element, config: &CheckerConfig) {
    for class in [config.error_class(), config.warning_class()] {
        for element in host.elements_with_class(root, &class) {
            host.remove_class(&element, &class);
            host.remove_attribute(&element, "title");
        }
    }
    let active = config.active_class();
    for element in host.elements_with_class(root, &active) {
        host.remove_class(&element, &active);
    }
}
