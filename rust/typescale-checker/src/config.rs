//! Checker configuration.
//!
//! Defaults reproduce the design system's published values; a JSON document
//! may override any subset of fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{TypeScaleError, scale::BreakpointSet};

/// Tunables for scanning, highlighting and the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Breakpoint thresholds in pixels
    pub breakpoints: BreakpointSet,
    /// Exclusive tolerance, in pixels, for matching the fluid scale
    pub fluid_tolerance: f64,
    /// Pixels added to serif faces before matching
    pub serif_adjustment: f64,
    /// Key that toggles the checker when pressed with Ctrl
    pub toggle_key: String,
    /// Quiet period before a resize triggers a re-scan
    pub resize_debounce_ms: u64,
    /// Prefix of every class the checker writes
    pub class_prefix: String,
    /// Prefix of synthetic element ids
    pub id_prefix: String,
    /// Share of the remaining distance covered by each scroll step
    pub scroll_easing: f64,
    /// Remaining distance, in pixels, at which scrolling stops
    pub scroll_settle_distance: f64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            breakpoints: BreakpointSet::default(),
            fluid_tolerance: 0.25,
            serif_adjustment: 1.0,
            toggle_key: "t".into(),
            resize_debounce_ms: 100,
            class_prefix: "type-checker".into(),
            id_prefix: "type-checker-node".into(),
            scroll_easing: 0.1,
            scroll_settle_distance: 3.0,
        }
    }
}

impl CheckerConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self, TypeScaleError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TypeScaleError::InvalidConfiguration(format!("{e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TypeScaleError> {
        self.breakpoints.validate()?;

        if !(self.fluid_tolerance > 0.0) {
            return Err(TypeScaleError::InvalidConfiguration(format!(
                "Fluid tolerance must be positive, got {}",
                self.fluid_tolerance
            )));
        }
        if !(self.scroll_easing > 0.0 && self.scroll_easing <= 1.0) {
            return Err(TypeScaleError::InvalidConfiguration(format!(
                "Scroll easing must be in (0, 1], got {}",
                self.scroll_easing
            )));
        }
        if !(self.scroll_settle_distance >= 0.0) {
            return Err(TypeScaleError::InvalidConfiguration(format!(
                "Scroll settle distance must not be negative, got {}",
                self.scroll_settle_distance
            )));
        }
        if self.toggle_key.is_empty() {
            return Err(TypeScaleError::InvalidConfiguration(
                "Toggle key must not be empty".into(),
            ));
        }
        if self.class_prefix.is_empty() || self.id_prefix.is_empty() {
            return Err(TypeScaleError::InvalidConfiguration(
                "Class and id prefixes must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Build a BEM-style class name under [`CheckerConfig::class_prefix`],
    /// e.g. `class("__error")`.
    pub fn class(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.class_prefix)
    }

    pub fn error_class(&self) -> String {
        self.class("__error")
    }

    pub fn warning_class(&self) -> String {
        self.class("__warning")
    }

    pub fn active_class(&self) -> String {
        self.class("__active")
    }

    pub fn focus_class(&self) -> String {
        self.class("--focus")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_fills_missing_fields_with_defaults() -> anyhow::Result<()> {
        let config =
            CheckerConfig::from_json(r#"{ "toggle_key": "y", "resize_debounce_ms": 250 }"#)?;

        assert_eq!(config.toggle_key, "y");
        assert_eq!(config.resize_debounce(), Duration::from_millis(250));
        assert_eq!(config.breakpoints, BreakpointSet::default());
        assert_eq!(config.fluid_tolerance, 0.25);
        Ok(())
    }

    #[test]
    fn it_rejects_invalid_values() {
        for json in [
            r#"{ "breakpoints": { "sm": 700, "md": 640, "lg": 1056, "max": 1650 } }"#,
            r#"{ "fluid_tolerance": 0 }"#,
            r#"{ "scroll_easing": 1.5 }"#,
            r#"{ "toggle_key": "" }"#,
            r#"{ "class_prefix": "" }"#,
            r#"{ "fluid_tolerance": "wide" }"#,
        ] {
            assert!(
                matches!(
                    CheckerConfig::from_json(json),
                    Err(TypeScaleError::InvalidConfiguration(_))
                ),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn it_derives_class_names_from_the_prefix() {
        let config = CheckerConfig::default();

        assert_eq!(config.error_class(), "type-checker__error");
        assert_eq!(config.warning_class(), "type-checker__warning");
        assert_eq!(config.focus_class(), "type-checker--focus");
    }
}
