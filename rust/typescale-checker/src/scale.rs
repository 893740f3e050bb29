//! The type scale model.
//!
//! Two scales are defined here. The *static* scale is a fixed list of pixel
//! sizes derived from [`BASE_EMS_SCALE`]. The *fluid* scale ([`FLUID_SCALE`])
//! is a table of type-style slots whose size depends on the viewport width;
//! each slot says, per breakpoint, whether the size is a constant or a linear
//! interpolation between two em sizes over that breakpoint's width range.
//! Resolving the fluid scale for a concrete width lives in [`crate::fluid`].

use serde::{Deserialize, Serialize};

use crate::TypeScaleError;

/// Pixels per em unit used when converting scale values.
pub const PX_PER_EM: f64 = 16.0;

/// Base type scale in ems. The leading zero is a sentinel.
pub const BASE_EMS_SCALE: [f64; 25] = [
    0.0, 0.75, 0.875, 1.0, 1.125, 1.25, 1.5, 1.75, 2.0, 2.25, 2.625, 3.0, 3.375, 3.75, 4.25, 4.75,
    5.25, 5.75, 6.375, 7.0, 7.625, 8.25, 9.0, 9.75, 10.5,
];

/// Translate an em (or rem) measurement into pixels.
pub fn rem_to_px(size: f64) -> f64 {
    size * PX_PER_EM
}

/// The static type scale in pixels.
pub fn static_scale() -> Vec<f64> {
    BASE_EMS_SCALE.iter().copied().map(rem_to_px).collect()
}

/// A named viewport-width bucket.
///
/// Buckets are half-open: a width equal to a threshold belongs to the bucket
/// that threshold opens. Note that the bucket called [`Breakpoint::Sm`] covers
/// widths from the `sm` threshold up to (but excluding) `md`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Breakpoint {
    /// Narrower than `sm`
    Base,
    /// `sm` <= width < `md`
    Sm,
    /// `md` <= width < `lg`
    Md,
    /// `lg` <= width < `max`
    Lg,
    /// `max` <= width
    Max,
}

impl Breakpoint {
    /// The upper-case label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Breakpoint::Base => "BASE",
            Breakpoint::Sm => "SM",
            Breakpoint::Md => "MD",
            Breakpoint::Lg => "LG",
            Breakpoint::Max => "MAX",
        }
    }
}

impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum window widths, in pixels, that open each breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointSet {
    /// Lower bound of [`Breakpoint::Sm`]
    pub sm: f64,
    /// Lower bound of [`Breakpoint::Md`]
    pub md: f64,
    /// Lower bound of [`Breakpoint::Lg`]
    pub lg: f64,
    /// Lower bound of [`Breakpoint::Max`]
    pub max: f64,
}

impl Default for BreakpointSet {
    fn default() -> Self {
        Self {
            sm: 320.0,
            md: 640.0,
            lg: 1056.0,
            max: 1650.0,
        }
    }
}

impl BreakpointSet {
    /// Build a breakpoint set, rejecting thresholds that are not strictly
    /// increasing.
    pub fn new(sm: f64, md: f64, lg: f64, max: f64) -> Result<Self, TypeScaleError> {
        let set = Self { sm, md, lg, max };
        set.validate()?;
        Ok(set)
    }

    /// Check that `sm < md < lg < max` and that every threshold is finite.
    pub fn validate(&self) -> Result<(), TypeScaleError> {
        let thresholds = [self.sm, self.md, self.lg, self.max];
        if thresholds.iter().any(|value| !value.is_finite()) {
            return Err(TypeScaleError::InvalidConfiguration(format!(
                "Breakpoints must be finite: {thresholds:?}"
            )));
        }
        if !thresholds.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(TypeScaleError::InvalidConfiguration(format!(
                "Breakpoints must be strictly increasing: {thresholds:?}"
            )));
        }
        Ok(())
    }

    /// The width at which the given breakpoint begins.
    pub fn lower_bound(&self, breakpoint: Breakpoint) -> f64 {
        match breakpoint {
            Breakpoint::Base => 0.0,
            Breakpoint::Sm => self.sm,
            Breakpoint::Md => self.md,
            Breakpoint::Lg => self.lg,
            Breakpoint::Max => self.max,
        }
    }

    /// Find the breakpoint bucket a viewport width falls into.
    pub fn classify(&self, width: f64) -> Breakpoint {
        if width < self.sm {
            Breakpoint::Base
        } else if width < self.md {
            Breakpoint::Sm
        } else if width < self.lg {
            Breakpoint::Md
        } else if width < self.max {
            Breakpoint::Lg
        } else {
            Breakpoint::Max
        }
    }
}

/// How a fluid slot is sized within one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeRule {
    /// A fixed size in ems
    Constant(f64),
    /// A size that grows linearly from `min_em` to `max_em` as the viewport
    /// widens from the `from` threshold to the `to` threshold
    Interpolated {
        /// Size at the start of the range, in ems
        min_em: f64,
        /// Size at the end of the range, in ems
        max_em: f64,
        /// Breakpoint whose threshold starts the range
        from: Breakpoint,
        /// Breakpoint whose threshold ends the range
        to: Breakpoint,
    },
}

/// One slot of the fluid type scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidSize {
    /// Slot label
    pub name: &'static str,
    /// Size below the `sm` threshold, in ems
    pub base: f64,
    /// Rule for [`Breakpoint::Sm`]
    pub sm: SizeRule,
    /// Rule for [`Breakpoint::Md`]
    pub md: SizeRule,
    /// Rule for [`Breakpoint::Lg`]
    pub lg: SizeRule,
    /// Size from the `max` threshold on, in ems
    pub max: f64,
}

const fn fixed(index: usize) -> SizeRule {
    SizeRule::Constant(BASE_EMS_SCALE[index])
}

const fn interpolated(min: usize, max: usize, from: Breakpoint, to: Breakpoint) -> SizeRule {
    SizeRule::Interpolated {
        min_em: BASE_EMS_SCALE[min],
        max_em: BASE_EMS_SCALE[max],
        from,
        to,
    }
}

const fn small(min: usize, max: usize) -> SizeRule {
    interpolated(min, max, Breakpoint::Sm, Breakpoint::Md)
}

const fn medium(min: usize, max: usize) -> SizeRule {
    interpolated(min, max, Breakpoint::Md, Breakpoint::Lg)
}

const fn large(min: usize, max: usize) -> SizeRule {
    interpolated(min, max, Breakpoint::Lg, Breakpoint::Max)
}

const fn slot(
    name: &'static str,
    base: usize,
    sm: SizeRule,
    md: SizeRule,
    lg: SizeRule,
    max: usize,
) -> FluidSize {
    FluidSize {
        name,
        base: BASE_EMS_SCALE[base],
        sm,
        md,
        lg,
        max: BASE_EMS_SCALE[max],
    }
}

/// The fluid type scale.
pub const FLUID_SCALE: [FluidSize; 12] = [
    slot("A", 1, fixed(1), fixed(1), large(1, 3), 3),
    slot("B", 1, fixed(1), fixed(1), large(1, 3), 3),
    slot("C", 2, fixed(2), fixed(2), large(2, 4), 4),
    slot("D", 3, fixed(3), fixed(3), large(3, 4), 4),
    slot("E", 3, fixed(3), fixed(3), large(3, 5), 5),
    slot("F", 4, small(4, 5), fixed(5), large(5, 6), 6),
    slot("G", 5, small(5, 6), fixed(6), large(6, 8), 8),
    slot("H", 6, fixed(6), medium(6, 7), large(7, 8), 8),
    slot("I", 7, small(7, 8), medium(8, 9), large(9, 10), 10),
    slot("J", 7, small(7, 9), medium(9, 10), large(10, 13), 13),
    slot("K", 10, small(10, 14), medium(14, 23), large(23, 24), 24),
    slot("L", 10, small(10, 14), medium(14, 23), large(23, 24), 24),
];
