use crate::host::OverlayHost;

/// The scroll offset that vertically centres `element` in the window.
pub fn centered_offset<H: OverlayHost>(host: &H, element: &H::Element) -> f64 {
    let rect = host.bounding_rect(element);
    let (_, window_height) = host.window_size();
    (host.scroll_y() + rect.top + rect.height / 2.0 - window_height / 2.0).max(0.0)
}

/// An eased scroll towards a target offset, one step per animation frame.
///
/// Each step covers `easing` of the remaining distance; the animation stops
/// once the remaining distance is at most `settle_distance`, or when the
/// page refuses to scroll any further.
#[derive(Debug)]
pub struct ScrollAnimation<F> {
    target: f64,
    easing: f64,
    settle_distance: f64,
    frame: Option<F>,
}

impl<F> ScrollAnimation<F> {
    pub fn start<H: OverlayHost<Frame = F>>(
        host: &mut H,
        target: f64,
        easing: f64,
        settle_distance: f64,
    ) -> Self {
        Self {
            target,
            easing,
            settle_distance,
            frame: Some(host.request_frame()),
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Advance by one frame. Returns `false` once the animation is over.
    pub fn step<H: OverlayHost<Frame = F>>(&mut self, host: &mut H) -> bool {
        // The frame that delivered this step has fired.
        self.frame = None;

        let current = host.scroll_y();
        let remaining = self.target - current;
        if remaining.abs() <= self.settle_distance {
            return false;
        }

        host.scroll_to(current + remaining * self.easing);
        if (host.scroll_y() - current).abs() < f64::EPSILON {
            return false;
        }

        self.frame = Some(host.request_frame());
        true
    }

    /// Stop the animation, withdrawing any pending frame.
    pub fn cancel<H: OverlayHost<Frame = F>>(self, host: &mut H) {
        if let Some(frame) = self.frame {
            host.cancel_frame(frame);
        }
    }
}
