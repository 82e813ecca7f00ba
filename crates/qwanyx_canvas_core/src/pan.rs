//! Horizontal click-drag panning with release inertia.
//!
//! # Invariants
//! - Scroll offset stays within `[0, max_scroll]` when `max_scroll` is known.
//! - Inertia only runs between a pan release and the next pan start.

use crate::config::CanvasConfig;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanGesture {
    start_x: f64,
    start_offset: f64,
}

/// Viewport scroll state driven by background pan gestures.
#[derive(Debug, Clone, PartialEq)]
pub struct PanController {
    factor: f64,
    decay: f64,
    min_velocity: f64,
    offset: f64,
    max_scroll: Option<f64>,
    velocity: f64,
    gesture: Option<PanGesture>,
    coasting: bool,
}

impl PanController {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            factor: config.pan_factor,
            decay: config.inertia_decay,
            min_velocity: config.inertia_min_velocity,
            offset: 0.0,
            max_scroll: None,
            velocity: 0.0,
            gesture: None,
            coasting: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_panning(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn is_coasting(&self) -> bool {
        self.coasting
    }

    /// Sets the scrollable extent (content width minus viewport width).
    pub fn set_max_scroll(&mut self, max_scroll: Option<f64>) {
        self.max_scroll = max_scroll.map(|value| value.max(0.0));
        self.offset = self.clamp(self.offset);
    }

    /// Syncs the offset after an external scroll (wheel, programmatic).
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = self.clamp(offset);
    }

    /// Starts a pan at pointer `x`, stopping any inertia.
    pub fn begin(&mut self, x: f64) {
        self.gesture = Some(PanGesture {
            start_x: x,
            start_offset: self.offset,
        });
        self.velocity = 0.0;
        self.coasting = false;
    }

    /// Updates the offset from pointer `x`. Returns the new offset.
    pub fn update(&mut self, x: f64) -> Option<f64> {
        let gesture = self.gesture?;
        let walk = (x - gesture.start_x) * self.factor;
        let next = self.clamp(gesture.start_offset - walk);
        self.velocity = self.offset - next;
        self.offset = next;
        Some(next)
    }

    /// Ends the pan on pointer-up or pointer-leave.
    ///
    /// Returns `true` when inertia frames should follow.
    pub fn end(&mut self) -> bool {
        if self.gesture.take().is_none() {
            return false;
        }
        self.coasting = self.velocity.abs() > self.min_velocity;
        trace!(
            "event=pan_end module=pan status=ok offset={} velocity={} coasting={}",
            self.offset,
            self.velocity,
            self.coasting
        );
        self.coasting
    }

    /// Advances one animation frame of inertia.
    ///
    /// Returns the new offset, or `None` once the motion has settled.
    pub fn inertia_step(&mut self) -> Option<f64> {
        if !self.coasting || self.velocity.abs() <= self.min_velocity {
            self.coasting = false;
            return None;
        }
        self.offset = self.clamp(self.offset - self.velocity);
        self.velocity *= self.decay;
        Some(self.offset)
    }

    /// Stops any pan or inertia without moving.
    pub fn stop(&mut self) {
        self.gesture = None;
        self.coasting = false;
        self.velocity = 0.0;
    }

    fn clamp(&self, offset: f64) -> f64 {
        let lower = offset.max(0.0);
        match self.max_scroll {
            Some(max) => lower.min(max),
            None => lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PanController;
    use crate::config::CanvasConfig;

    #[test]
    fn pointer_delta_is_doubled_and_inverted() {
        let mut pan = PanController::new(&CanvasConfig::default());
        pan.set_offset(500.0);
        pan.begin(300.0);

        assert_eq!(pan.update(280.0), Some(540.0));
        assert_eq!(pan.update(350.0), Some(400.0));
        assert_eq!(pan.velocity(), 140.0);
    }

    #[test]
    fn offset_is_clamped_to_scroll_extent() {
        let mut pan = PanController::new(&CanvasConfig::default());
        pan.set_max_scroll(Some(100.0));
        pan.begin(0.0);
        assert_eq!(pan.update(-500.0), Some(100.0));
        assert_eq!(pan.update(500.0), Some(0.0));
    }

    #[test]
    fn inertia_decays_until_settled() {
        let mut pan = PanController::new(&CanvasConfig::default());
        pan.set_offset(1000.0);
        pan.begin(100.0);
        pan.update(95.0);
        assert!(pan.end());

        let mut frames = 0;
        let mut last = pan.offset();
        while let Some(offset) = pan.inertia_step() {
            assert!(offset > last, "drag left keeps scrolling right");
            last = offset;
            frames += 1;
            assert!(frames < 1000, "inertia must terminate");
        }
        assert!(frames > 0);
        assert!(!pan.is_coasting());
    }

    #[test]
    fn slow_release_does_not_coast() {
        let mut pan = PanController::new(&CanvasConfig::default());
        pan.begin(100.0);
        pan.update(100.1);
        assert!(!pan.end());
        assert_eq!(pan.inertia_step(), None);
    }
}
