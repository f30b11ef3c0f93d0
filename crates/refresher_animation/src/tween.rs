//! Value tweens
//!
//! A [`Tween`] interpolates between two values over a fixed duration. It is
//! advanced explicitly with [`Tween::tick`] from a frame callback, and
//! [`Tween::value`] returns the live interpolated value at any point, which
//! lets a caller sample an in-flight animation instead of only seeing its
//! final target.
//!
//! # Example
//!
//! ```rust
//! use refresher_animation::{Easing, Tween};
//! use refresher_core::EdgeInsets;
//!
//! let mut tween = Tween::new(
//!     EdgeInsets::vertical(60.0, 0.0),
//!     EdgeInsets::ZERO,
//!     350,
//!     Easing::Linear,
//! );
//!
//! tween.tick(175.0);
//! assert_eq!(tween.value().top, 30.0);
//!
//! tween.tick(175.0);
//! assert!(tween.is_finished());
//! assert_eq!(tween.value(), EdgeInsets::ZERO);
//! ```

use refresher_core::{EdgeInsets, Point};
use tracing::trace;

use crate::easing::Easing;

/// Linear interpolation between two values of the same type
pub trait Lerp: Copy {
    fn lerp(from: Self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * t
    }
}

impl Lerp for Point {
    fn lerp(from: Point, to: Point, t: f32) -> Point {
        Point::new(f32::lerp(from.x, to.x, t), f32::lerp(from.y, to.y, t))
    }
}

impl Lerp for EdgeInsets {
    fn lerp(from: EdgeInsets, to: EdgeInsets, t: f32) -> EdgeInsets {
        EdgeInsets::new(
            f32::lerp(from.top, to.top, t),
            f32::lerp(from.left, to.left, t),
            f32::lerp(from.bottom, to.bottom, t),
            f32::lerp(from.right, to.right, t),
        )
    }
}

/// A time-based interpolation from `start` to `target`
#[derive(Clone, Debug)]
pub struct Tween<T: Lerp> {
    start: T,
    target: T,
    duration_ms: u32,
    elapsed_ms: f32,
    easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(start: T, target: T, duration_ms: u32, easing: Easing) -> Self {
        Self {
            start,
            target,
            duration_ms,
            elapsed_ms: 0.0,
            easing,
        }
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Advance by `dt_ms` milliseconds. Negative deltas are ignored.
    pub fn tick(&mut self, dt_ms: f32) {
        if !dt_ms.is_finite() || dt_ms <= 0.0 || self.is_finished() {
            return;
        }
        self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms as f32);
        if self.is_finished() {
            trace!(duration_ms = self.duration_ms, "Tween: finished");
        }
    }

    /// Linear time fraction in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    /// Time fraction after easing
    pub fn eased_progress(&self) -> f32 {
        self.easing.apply(self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// The live interpolated value
    ///
    /// Once finished this is exactly `target`, with no interpolation residue.
    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.target;
        }
        T::lerp(self.start, self.target, self.eased_progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_is_finished() {
        let tween = Tween::new(10.0f32, 20.0, 0, Easing::EaseInOut);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 20.0);
    }

    #[test]
    fn test_value_tracks_easing() {
        let mut tween = Tween::new(0.0f32, 100.0, 100, Easing::EaseIn);
        tween.tick(50.0);
        assert_eq!(tween.progress(), 0.5);
        assert!((tween.value() - 12.5).abs() < 1e-4);
    }

    #[test]
    fn test_tick_clamps_at_duration() {
        let mut tween = Tween::new(0.0f32, 1.0, 100, Easing::Linear);
        tween.tick(40.0);
        tween.tick(-10.0);
        assert_eq!(tween.progress(), 0.4);
        tween.tick(1000.0);
        assert_eq!(tween.progress(), 1.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_target_is_exact_when_finished() {
        // 0.1 + 0.2 style residue must not leak into the final value
        let target = EdgeInsets::new(0.1, 0.0, 0.3, 0.0);
        let mut tween = Tween::new(EdgeInsets::new(60.7, 0.0, 52.3, 0.0), target, 350, Easing::default());
        for _ in 0..30 {
            tween.tick(16.666_666);
        }
        assert_eq!(tween.value(), target);
    }

    #[test]
    fn test_point_lerp() {
        let from = Point::new(0.0, -60.0);
        let to = Point::new(0.0, 0.0);
        assert_eq!(Point::lerp(from, to, 0.25), Point::new(0.0, -45.0));
    }
}
