//! Progress renderers
//!
//! A renderer is told about every phase change, synchronously, and draws
//! from the payload. It must not call back into the controller from
//! `on_phase_changed`.

use std::f32::consts::TAU;

use crate::phase::Phase;

/// Visual feedback for a refresh controller
pub trait ProgressRenderer {
    fn on_phase_changed(&mut self, phase: Phase);
}

/// A renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl ProgressRenderer for NullRenderer {
    fn on_phase_changed(&mut self, _phase: Phase) {}
}

// ============================================================================
// Activity indicator
// ============================================================================

/// Spinner that grows and turns with the pull
///
/// This is the default renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityIndicator {
    scale: f32,
    rotation: f32,
    hidden: bool,
    animating: bool,
}

impl ActivityIndicator {
    pub fn new() -> Self {
        Self {
            scale: 0.0,
            rotation: 0.0,
            hidden: true,
            animating: false,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    fn transform(&mut self, progress: f32) {
        self.hidden = false;
        self.scale = progress;
        self.rotation = TAU * progress;
    }
}

impl Default for ActivityIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressRenderer for ActivityIndicator {
    fn on_phase_changed(&mut self, phase: Phase) {
        match phase {
            Phase::Idle => {
                self.animating = false;
                self.hidden = true;
            }
            Phase::Pulling { progress } => self.transform(progress),
            Phase::Committed { .. } => self.transform(1.0),
            Phase::Active => {
                self.hidden = false;
                self.animating = true;
            }
            Phase::Settling { progress } => self.transform(1.0 - progress),
        }
    }
}

// ============================================================================
// Arc indicator
// ============================================================================

/// Arc that sweeps open with the pull, then spins while active
#[derive(Debug, Clone, PartialEq)]
pub struct ArcIndicator {
    color: [f32; 4],
    sweep: f32,
    opacity: f32,
    rotating: bool,
}

impl ArcIndicator {
    /// Resting opacity before the pull nears the threshold
    pub const BASE_OPACITY: f32 = 0.5;

    pub fn new(color: [f32; 4]) -> Self {
        Self {
            color,
            sweep: 0.0,
            opacity: Self::BASE_OPACITY,
            rotating: false,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Sweep as a fraction of a full turn
    pub fn sweep(&self) -> f32 {
        self.sweep
    }

    pub fn sweep_radians(&self) -> f32 {
        self.sweep * TAU
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    fn reset(&mut self) {
        self.rotating = false;
        self.opacity = Self::BASE_OPACITY;
        self.pull(0.0);
    }

    fn pull(&mut self, progress: f32) {
        self.sweep = (progress - 0.2).max(0.0);
        if progress > 0.8 {
            self.opacity = Self::BASE_OPACITY + 0.5 * (progress - 0.8) / 0.2;
        }
    }
}

impl Default for ArcIndicator {
    fn default() -> Self {
        Self::new([0.6, 0.6, 0.6, 1.0])
    }
}

impl ProgressRenderer for ArcIndicator {
    fn on_phase_changed(&mut self, phase: Phase) {
        match phase {
            Phase::Idle => self.reset(),
            Phase::Pulling { progress } => self.pull(progress),
            Phase::Committed { .. } => {}
            Phase::Active => self.rotating = true,
            Phase::Settling { progress } => self.opacity = 1.0 - progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_indicator_follows_pull() {
        let mut indicator = ActivityIndicator::new();
        assert!(indicator.is_hidden());

        indicator.on_phase_changed(Phase::pulling(0.5));
        assert!(!indicator.is_hidden());
        assert_eq!(indicator.scale(), 0.5);
        assert_eq!(indicator.rotation(), TAU * 0.5);

        indicator.on_phase_changed(Phase::committed(12.0));
        assert_eq!(indicator.scale(), 1.0);

        indicator.on_phase_changed(Phase::Active);
        assert!(indicator.is_animating());

        indicator.on_phase_changed(Phase::settling(0.25));
        assert_eq!(indicator.scale(), 0.75);

        indicator.on_phase_changed(Phase::Idle);
        assert!(indicator.is_hidden());
        assert!(!indicator.is_animating());
    }

    #[test]
    fn test_arc_sweep_and_opacity() {
        let mut arc = ArcIndicator::default();
        arc.on_phase_changed(Phase::pulling(0.1));
        assert_eq!(arc.sweep(), 0.0);
        assert_eq!(arc.opacity(), 0.5);

        arc.on_phase_changed(Phase::pulling(0.6));
        assert!((arc.sweep() - 0.4).abs() < 1e-6);
        assert_eq!(arc.opacity(), 0.5);

        arc.on_phase_changed(Phase::pulling(1.0));
        assert!((arc.opacity() - 1.0).abs() < 1e-6);

        arc.on_phase_changed(Phase::Active);
        assert!(arc.is_rotating());

        arc.on_phase_changed(Phase::settling(0.75));
        assert!((arc.opacity() - 0.25).abs() < 1e-6);

        arc.on_phase_changed(Phase::Idle);
        assert!(!arc.is_rotating());
        assert_eq!(arc.opacity(), ArcIndicator::BASE_OPACITY);
        assert_eq!(arc.sweep(), 0.0);
    }
}
