//! Resolution of the fluid type scale for a concrete viewport width.
//!
//! Everything here is a pure function of its arguments. Fluid sizes depend
//! on the viewport, so callers resolve the scale again on every scan rather
//! than holding on to a previous result.

use crate::scale::{
    Breakpoint, BreakpointSet, FLUID_SCALE, FluidSize, PX_PER_EM, SizeRule, rem_to_px,
};

/// Interpolate a pixel size between two em sizes over a viewport range.
///
/// `min_em` is reached at `min_viewport` and `max_em` at `max_viewport`; the
/// result is not clamped to the range.
pub fn fluid_type(
    min_em: f64,
    max_em: f64,
    min_viewport: f64,
    max_viewport: f64,
    width: f64,
) -> f64 {
    min_em * PX_PER_EM
        + ((max_em - min_em) * PX_PER_EM / (max_viewport - min_viewport)) * (width - min_viewport)
}

fn evaluate(rule: SizeRule, breakpoints: &BreakpointSet, width: f64) -> f64 {
    match rule {
        SizeRule::Constant(em) => rem_to_px(em),
        SizeRule::Interpolated {
            min_em,
            max_em,
            from,
            to,
        } => fluid_type(
            min_em,
            max_em,
            breakpoints.lower_bound(from),
            breakpoints.lower_bound(to),
            width,
        ),
    }
}

/// Resolve one fluid slot to pixels for the given breakpoint and width.
pub fn resolve_size(
    size: &FluidSize,
    breakpoint: Breakpoint,
    breakpoints: &BreakpointSet,
    width: f64,
) -> f64 {
    match breakpoint {
        Breakpoint::Base => rem_to_px(size.base),
        Breakpoint::Sm => evaluate(size.sm, breakpoints, width),
        Breakpoint::Md => evaluate(size.md, breakpoints, width),
        Breakpoint::Lg => evaluate(size.lg, breakpoints, width),
        Breakpoint::Max => rem_to_px(size.max),
    }
}

/// The pixel sizes permitted by the fluid scale at the given viewport width,
/// one per slot of [`FLUID_SCALE`], in table order.
pub fn resolve_active_scale(breakpoints: &BreakpointSet, width: f64) -> Vec<f64> {
    resolve_scale_at(breakpoints, breakpoints.classify(width), width)
}

/// Like [`resolve_active_scale`], with the breakpoint chosen by the caller.
///
/// Pages pick the breakpoint from the root element's width but interpolate
/// from the window's inner width, which includes a vertical scrollbar.
pub fn resolve_scale_at(
    breakpoints: &BreakpointSet,
    breakpoint: Breakpoint,
    width: f64,
) -> Vec<f64> {
    FLUID_SCALE
        .iter()
        .map(|size| resolve_size(size, breakpoint, breakpoints, width))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_interpolates_linearly_across_a_range() {
        assert_eq!(fluid_type(1.0, 2.0, 100.0, 200.0, 100.0), 16.0);
        assert_eq!(fluid_type(1.0, 2.0, 100.0, 200.0, 150.0), 24.0);
        assert_eq!(fluid_type(1.0, 2.0, 100.0, 200.0, 200.0), 32.0);
    }

    #[test]
    fn it_resolves_the_same_scale_for_the_same_width() {
        let breakpoints = BreakpointSet::default();

        for width in [0.0, 319.0, 320.0, 500.0, 640.0, 900.0, 1056.0, 1300.0, 1650.0, 2400.0] {
            assert_eq!(
                resolve_active_scale(&breakpoints, width),
                resolve_active_scale(&breakpoints, width)
            );
        }
    }

    #[test]
    fn it_uses_base_sizes_below_the_first_threshold() {
        let scale = resolve_active_scale(&BreakpointSet::default(), 300.0);

        assert_eq!(
            scale,
            vec![12.0, 12.0, 14.0, 16.0, 16.0, 18.0, 20.0, 24.0, 28.0, 28.0, 42.0, 42.0]
        );
    }

    #[test]
    fn it_uses_max_sizes_without_interpolation() {
        let scale = resolve_active_scale(&BreakpointSet::default(), 1800.0);

        assert_eq!(
            scale,
            vec![16.0, 16.0, 18.0, 18.0, 20.0, 24.0, 32.0, 32.0, 42.0, 60.0, 168.0, 168.0]
        );
    }

    #[test]
    fn it_resolves_a_threshold_width_into_the_bucket_it_opens() {
        let breakpoints = BreakpointSet::default();
        let scale = resolve_active_scale(&breakpoints, 320.0);

        // Slot F interpolates 18px -> 20px across SM, starting exactly at 18px.
        assert_eq!(scale[5], 18.0);
        // Slot A is constant through SM.
        assert_eq!(scale[0], 12.0);
    }

    #[test]
    fn it_interpolates_within_the_large_bucket() {
        let breakpoints = BreakpointSet::default();
        let midpoint = (1056.0 + 1650.0) / 2.0;
        let scale = resolve_active_scale(&breakpoints, midpoint);

        // Slot A grows from 12px to 16px between LG and MAX.
        assert!((scale[0] - 14.0).abs() < 1e-9);
        // Slot K grows from 156px to 168px.
        assert!((scale[10] - 162.0).abs() < 1e-9);
    }

    #[test]
    fn it_interpolates_at_a_width_other_than_the_classified_one() {
        let breakpoints = BreakpointSet::default();
        let scale = resolve_scale_at(&breakpoints, Breakpoint::Md, 1000.0);

        // Slot K spans 4.25em -> 9.75em across MD.
        assert_eq!(scale[10], fluid_type(4.25, 9.75, 640.0, 1056.0, 1000.0));
        assert_eq!(
            resolve_scale_at(&breakpoints, breakpoints.classify(985.0), 985.0),
            resolve_active_scale(&breakpoints, 985.0)
        );
    }

    #[test]
    fn it_grows_monotonically_inside_each_bucket() {
        let breakpoints = BreakpointSet::default();

        for (start, end) in [(320.0, 639.0), (640.0, 1055.0), (1056.0, 1649.0)] {
            let narrow = resolve_active_scale(&breakpoints, start);
            let wide = resolve_active_scale(&breakpoints, end);

            for (low, high) in narrow.iter().zip(wide.iter()) {
                assert!(low <= high);
            }
        }
    }
}
