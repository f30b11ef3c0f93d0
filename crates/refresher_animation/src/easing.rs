//! Easing functions for animations

use serde::{Deserialize, Serialize};

/// Easing curve applied to a tween's time fraction
///
/// The default is `EaseInOut`, the curve UI toolkits use for implicit view
/// animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// The standard "ease in-out" bezier control points (0.42, 0, 0.58, 1)
    pub const fn standard() -> Self {
        Easing::CubicBezier(0.42, 0.0, 0.58, 1.0)
    }

    /// Map a linear time fraction to an eased fraction
    ///
    /// Input is clamped to `[0, 1]`; the endpoints map exactly to 0 and 1.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }
}

/// Unit cubic bezier through (0, 0) and (1, 1), kept as polynomial
/// coefficients per coordinate
struct UnitBezier {
    x: [f64; 3],
    y: [f64; 3],
}

impl UnitBezier {
    const TOLERANCE: f64 = 1e-7;
    const MAX_STEPS: usize = 24;

    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        // x control points outside [0, 1] would make x(s) non-monotonic
        let x1 = (x1 as f64).clamp(0.0, 1.0);
        let x2 = (x2 as f64).clamp(0.0, 1.0);
        Self {
            x: Self::coefficients(x1, x2),
            y: Self::coefficients(y1 as f64, y2 as f64),
        }
    }

    fn coefficients(p1: f64, p2: f64) -> [f64; 3] {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        [a, b, c]
    }

    fn eval([a, b, c]: [f64; 3], s: f64) -> f64 {
        ((a * s + b) * s + c) * s
    }

    fn derivative([a, b, c]: [f64; 3], s: f64) -> f64 {
        (3.0 * a * s + 2.0 * b) * s + c
    }

    /// Curve parameter whose x coordinate is `x`
    ///
    /// Newton steps inside a shrinking bracket; a step that would leave the
    /// bracket halves it instead.
    fn solve(&self, x: f64) -> f64 {
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut s = x;
        for _ in 0..Self::MAX_STEPS {
            let err = Self::eval(self.x, s) - x;
            if err.abs() < Self::TOLERANCE {
                break;
            }
            if err < 0.0 {
                lo = s;
            } else {
                hi = s;
            }
            let slope = Self::derivative(self.x, s);
            let newton = s - err / slope;
            s = if slope.abs() > Self::TOLERANCE && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
        }
        s
    }

    fn y_for(&self, x: f32) -> f32 {
        Self::eval(self.y, self.solve(x as f64)) as f32
    }
}

fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    UnitBezier::new(x1, y1, x2, y2).y_for(t)
}
