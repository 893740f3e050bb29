use crate::{
    CheckerConfig, TypeScaleError,
    host::OverlayHost,
    scanner::{ClassificationReport, Finding, Severity},
};

use super::{IdOwner, IdRegistry};

/// Attribute carrying an entry's position in [`OverlayView::items`].
pub const ITEM_ATTRIBUTE: &str = "data-type-checker-item";

/// Attribute naming the part of the overlay an element plays.
pub const ROLE_ATTRIBUTE: &str = "data-type-checker-role";

/// One report entry in the overlay, linked to the page element it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem<E> {
    pub target: E,
    /// The target's id, as used in the entry's `#id` link
    pub id: String,
    pub severity: Severity,
    pub link: E,
}

/// The overlay's DOM.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView<E> {
    pub container: E,
    pub header: E,
    pub close: E,
    pub items: Vec<OverlayItem<E>>,
}

fn child<H: OverlayHost>(
    host: &mut H,
    parent: &H::Element,
    tag: &str,
    class: &str,
) -> Result<H::Element, TypeScaleError> {
    let element = host.create_element(tag)?;
    host.add_class(&element, class);
    host.append_child(parent, &element);
    Ok(element)
}

/// Build the overlay for `report` and attach it to `root`.
///
/// Errors are listed before warnings. Every flagged element is given an id
/// through `registry` so its entry can link to it.
pub fn build<H: OverlayHost>(
    host: &mut H,
    root: &H::Element,
    report: &ClassificationReport<H::Element>,
    registry: &mut IdRegistry<H::Element>,
    config: &CheckerConfig,
) -> Result<OverlayView<H::Element>, TypeScaleError> {
    let container = host.create_element("div")?;
    host.add_class(&container, &config.class_prefix);
    host.set_attribute(&container, ROLE_ATTRIBUTE, "overlay");
    host.set_style(&container, "position", "fixed");
    host.set_style(&container, "top", "16px");
    host.set_style(&container, "right", "16px");
    host.set_style(&container, "z-index", "2147483647");

    let header = child(host, &container, "div", &config.class("__header"))?;
    host.set_attribute(&header, ROLE_ATTRIBUTE, "header");
    let title = child(host, &header, "span", &config.class("__title"))?;
    host.append_text(
        &title,
        &format!(
            "Type scale: {} @ {}px",
            report.breakpoint, report.viewport_width
        ),
    );
    let close = child(host, &header, "button", &config.class("__close"))?;
    host.set_attribute(&close, ROLE_ATTRIBUTE, "close");
    host.set_attribute(&close, "title", "Close");
    host.append_text(&close, "\u{d7}");

    let mut items = Vec::new();
    for (severity, findings) in [
        (Severity::Error, &report.error),
        (Severity::Warning, &report.warning),
    ] {
        let label = match severity {
            Severity::Error => "errors",
            _ => "warnings",
        };
        let section = child(host, &container, "section", &config.class("__section"))?;
        host.set_attribute(&section, ROLE_ATTRIBUTE, label);
        let heading = child(host, &section, "h2", &config.class("__heading"))?;
        host.append_text(&heading, &format!("{label}: {}", findings.len()));

        let list = child(host, &section, "ul", &config.class("__list"))?;
        for finding in findings {
            items.push(entry(host, &list, finding, severity, items.len(), registry, config)?);
        }
    }

    host.append_child(root, &container);

    Ok(OverlayView {
        container,
        header,
        close,
        items,
    })
}

fn entry<H: OverlayHost>(
    host: &mut H,
    list: &H::Element,
    finding: &Finding<H::Element>,
    severity: Severity,
    index: usize,
    registry: &mut IdRegistry<H::Element>,
    config: &CheckerConfig,
) -> Result<OverlayItem<H::Element>, TypeScaleError> {
    let id = registry.assign(host, &finding.element, IdOwner::Overlay);
    let row = child(host, list, "li", &config.class("__item"))?;
    let link = child(host, &row, "a", &config.class("__link"))?;
    host.set_attribute(&link, "href", &format!("#{id}"));
    host.set_attribute(&link, ITEM_ATTRIBUTE, &index.to_string());
    let tag = host.tag_name(&finding.element);
    host.append_text(&link, &format!("<{tag}> {}", finding.computed_font_size));

    Ok(OverlayItem {
        target: finding.element.clone(),
        id,
        severity,
        link,
    })
}
