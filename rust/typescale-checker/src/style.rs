//! Snapshot of an element's resolved style and the predicates evaluated
//! against it.
//!
//! Values are kept as the strings the host reports (e.g. `"16px"`,
//! `"auto"`), and numbers are read from them the way browsers' `parseFloat`
//! and `parseInt` do: the longest numeric prefix wins and anything
//! unparsable reads as NaN.

/// The computed (not authored) style properties the scanner looks at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedStyle {
    pub font_size: String,
    pub font_family: String,
    pub display: String,
    pub visibility: String,
    pub opacity: String,
    pub width: String,
    pub height: String,
    pub overflow: String,
    /// `None` when the host does not expose a `clip` value at all.
    pub clip: Option<String>,
}

impl ComputedStyle {
    /// A fully visible, sans-serif block with the given font size in pixels.
    pub fn visible(font_size: f64) -> Self {
        Self {
            font_size: format!("{font_size}px"),
            font_family: "\"IBM Plex Sans\", sans-serif".into(),
            display: "block".into(),
            visibility: "visible".into(),
            opacity: "1".into(),
            width: "640px".into(),
            height: "48px".into(),
            overflow: "visible".into(),
            clip: Some("auto".into()),
        }
    }

    /// The font size in pixels, or NaN if it cannot be read.
    pub fn font_size_px(&self) -> f64 {
        parse_float(&self.font_size)
    }

    /// Whether the font family is neither a sans-serif nor a monospace face.
    pub fn is_serif(&self) -> bool {
        let family = self.font_family.to_ascii_lowercase();
        !(family.contains("sans") || family.contains("mono"))
    }

    /// Whether the element is rendered and large enough to be read.
    ///
    /// The element must be displayed, not hidden, not fully transparent,
    /// wider and taller than `base_font_size`, not clipping its overflow, and
    /// expose a `clip` value.
    pub fn is_visible(&self, base_font_size: f64) -> bool {
        self.display != "none"
            && self.visibility != "hidden"
            && parse_float(&self.opacity) > 0.0
            && parse_int(&self.width) > base_font_size
            && parse_int(&self.height) > base_font_size
            && self.overflow != "hidden"
            && self.clip.is_some()
    }
}

/// Read the leading decimal number of a CSS value (`"16.5px"` -> 16.5).
pub fn parse_float(value: &str) -> f64 {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        if fraction_end > fraction_start || has_digits {
            has_digits = has_digits || fraction_end > fraction_start;
            end = fraction_end;
        }
    }
    if !has_digits {
        return f64::NAN;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits {
            end = exponent_end;
        }
    }

    trimmed[..end].parse().unwrap_or(f64::NAN)
}

/// Read the leading integer of a CSS value (`"640.75px"` -> 640).
pub fn parse_int(value: &str) -> f64 {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return f64::NAN;
    }

    trimmed[..end].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_reads_leading_numbers_like_a_browser() {
        assert_eq!(parse_float("16px"), 16.0);
        assert_eq!(parse_float(" 13.5px"), 13.5);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("-2em"), -2.0);
        assert_eq!(parse_float("1e1px"), 10.0);
        assert_eq!(parse_float("3.px"), 3.0);
        assert!(parse_float("auto").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float(".").is_nan());

        assert_eq!(parse_int("640.75px"), 640.0);
        assert_eq!(parse_int("-12px"), -12.0);
        assert!(parse_int("auto").is_nan());
    }

    #[test]
    fn it_treats_sans_and_mono_families_as_non_serif() {
        let mut style = ComputedStyle::visible(16.0);
        assert!(!style.is_serif());

        style.font_family = "Menlo, Monaco, monospace".into();
        assert!(!style.is_serif());

        style.font_family = "\"IBM Plex Serif\", Georgia, serif".into();
        assert!(style.is_serif());
    }

    #[test]
    fn it_requires_every_visibility_condition() {
        let visible = ComputedStyle::visible(16.0);
        assert!(visible.is_visible(16.0));

        let cases: Vec<fn(&mut ComputedStyle)> = vec![
            |style| style.display = "none".into(),
            |style| style.visibility = "hidden".into(),
            |style| style.opacity = "0".into(),
            |style| style.width = "16px".into(),
            |style| style.height = "12px".into(),
            |style| style.width = "auto".into(),
            |style| style.overflow = "hidden".into(),
            |style| style.clip = None,
        ];

        for mutate in cases {
            let mut style = visible.clone();
            mutate(&mut style);
            assert!(!style.is_visible(16.0), "{style:?} should be invisible");
        }
    }
}
