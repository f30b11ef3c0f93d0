//! Refresher Animation System
//!
//! Easing curves and time-based value tweens.
//!
//! # Features
//!
//! - **Easing**: the host toolkit's standard curves plus arbitrary cubic beziers
//! - **Tweens**: interpolate any [`Lerp`] value (scalars, points, insets)
//! - **Live sampling**: a tween can be queried for its interpolated value at
//!   any frame, which is what the settle loop reports as progress

pub mod easing;
pub mod tween;

pub use easing::Easing;
pub use tween::{Lerp, Tween};
