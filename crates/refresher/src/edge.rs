//! Edge-offset math
//!
//! Pure functions over a snapshot of the container's geometry, projected onto
//! the scroll axis. The leading edge (top/left) hosts pull-to-refresh, the
//! trailing edge (bottom/right) hosts load-more.
//!
//! The *appear offset* is the content offset at which the control starts to
//! become visible. *Excess* is how far past that offset the user has
//! scrolled, measured toward the control, so both edges share one
//! threshold rule.

use refresher_core::{Axis, EdgeInsets};

use crate::container::ScrollContainer;

/// Which end of the scroll axis a controller is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Edge {
    /// Top (vertical) or left (horizontal): pull-to-refresh
    #[default]
    Leading,
    /// Bottom (vertical) or right (horizontal): load-more
    Trailing,
}

impl Edge {
    pub fn is_leading(self) -> bool {
        matches!(self, Edge::Leading)
    }

    pub fn is_trailing(self) -> bool {
        matches!(self, Edge::Trailing)
    }

    /// This edge's component of `inset`
    pub fn inset_of(self, inset: &EdgeInsets, axis: Axis) -> f32 {
        match self {
            Edge::Leading => inset.leading(axis),
            Edge::Trailing => inset.trailing(axis),
        }
    }

    /// `inset` with this edge's component replaced
    pub fn with_inset(self, inset: EdgeInsets, axis: Axis, value: f32) -> EdgeInsets {
        match self {
            Edge::Leading => inset.with_leading(axis, value),
            Edge::Trailing => inset.with_trailing(axis, value),
        }
    }
}

/// Axis-projected geometry of a scroll container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub offset: f32,
    pub content: f32,
    pub viewport: f32,
    pub inset_leading: f32,
    pub inset_trailing: f32,
}

impl EdgeGeometry {
    /// Snapshot the container, using `inset` rather than its live inset
    ///
    /// Callers pass the resting inset so an expanded inset mid-cycle does not
    /// move the thresholds.
    pub fn read(container: &dyn ScrollContainer, axis: Axis, inset: EdgeInsets) -> Self {
        Self {
            offset: container.content_offset().along(axis),
            content: container.content_size().along(axis),
            viewport: container.viewport_size().along(axis),
            inset_leading: inset.leading(axis),
            inset_trailing: inset.trailing(axis),
        }
    }

    /// How far the content extends past the visible area
    ///
    /// Negative when the content is shorter than the viewport.
    pub fn content_overflow(&self) -> f32 {
        self.content - (self.viewport - self.inset_leading - self.inset_trailing)
    }

    /// Offset at which the control at `edge` starts to become visible
    pub fn appear_offset(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Leading => -self.inset_leading,
            Edge::Trailing => {
                let overflow = self.content_overflow();
                if overflow > 0.0 {
                    overflow - self.inset_leading
                } else {
                    // Short content: the control already sits at the real end
                    -self.inset_leading
                }
            }
        }
    }

    /// Distance scrolled past the appear offset, toward the control
    pub fn excess(&self, edge: Edge) -> f32 {
        let appear = self.appear_offset(edge);
        match edge {
            Edge::Leading => appear - self.offset,
            Edge::Trailing => self.offset - appear,
        }
    }

    /// Trailing inset that keeps a `height`-tall control visible below the content
    ///
    /// Short content also absorbs the gap between content end and viewport end.
    pub fn active_trailing_inset(&self, height: f32) -> f32 {
        let overflow = self.content_overflow();
        let mut inset = height + self.inset_trailing;
        if overflow < 0.0 {
            inset -= overflow;
        }
        inset
    }
}

/// Pull fraction for a given excess, clamped to `[0, 1]`
pub fn pull_fraction(excess: f32, height: f32) -> f32 {
    if height <= 0.0 || excess.is_nan() {
        return 0.0;
    }
    (excess / height).clamp(0.0, 1.0)
}

/// Offset bounds for a container with the given inset
///
/// The upper bound never drops below the lower one, so short content rests at
/// the leading end.
pub fn offset_bounds(container: &dyn ScrollContainer, axis: Axis) -> (f32, f32) {
    let inset = container.content_inset();
    let min = -inset.leading(axis);
    let max = container.content_size().along(axis) - container.viewport_size().along(axis)
        + inset.trailing(axis);
    (min, max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(offset: f32, content: f32, viewport: f32, leading: f32, trailing: f32) -> EdgeGeometry {
        EdgeGeometry {
            offset,
            content,
            viewport,
            inset_leading: leading,
            inset_trailing: trailing,
        }
    }

    #[test]
    fn test_leading_appear_and_excess() {
        let geo = geometry(-80.0, 2000.0, 600.0, 0.0, 0.0);
        assert_eq!(geo.appear_offset(Edge::Leading), 0.0);
        assert_eq!(geo.excess(Edge::Leading), 80.0);

        let inset = geometry(-30.0, 2000.0, 600.0, 20.0, 0.0);
        assert_eq!(inset.appear_offset(Edge::Leading), -20.0);
        assert_eq!(inset.excess(Edge::Leading), 10.0);
    }

    #[test]
    fn test_trailing_appear_long_content() {
        let geo = geometry(1450.0, 2000.0, 600.0, 0.0, 0.0);
        assert_eq!(geo.content_overflow(), 1400.0);
        assert_eq!(geo.appear_offset(Edge::Trailing), 1400.0);
        assert_eq!(geo.excess(Edge::Trailing), 50.0);
    }

    #[test]
    fn test_trailing_appear_short_content() {
        // 400 of content in a 600 viewport with a 20 top inset
        let geo = geometry(40.0, 400.0, 600.0, 20.0, 0.0);
        assert_eq!(geo.content_overflow(), -180.0);
        assert_eq!(geo.appear_offset(Edge::Trailing), -20.0);
        assert_eq!(geo.excess(Edge::Trailing), 60.0);
    }

    #[test]
    fn test_edges_mirror() {
        let geo = geometry(0.0, 2000.0, 600.0, 0.0, 0.0);
        let leading = EdgeGeometry { offset: -25.0, ..geo };
        let trailing = EdgeGeometry { offset: 1425.0, ..geo };
        assert_eq!(leading.excess(Edge::Leading), trailing.excess(Edge::Trailing));
    }

    #[test]
    fn test_active_trailing_inset() {
        let long = geometry(0.0, 2000.0, 600.0, 0.0, 10.0);
        assert_eq!(long.active_trailing_inset(60.0), 70.0);

        let short = geometry(0.0, 400.0, 600.0, 0.0, 0.0);
        assert_eq!(short.active_trailing_inset(60.0), 260.0);
    }

    #[test]
    fn test_pull_fraction_clamps() {
        assert_eq!(pull_fraction(30.0, 60.0), 0.5);
        assert_eq!(pull_fraction(-5.0, 60.0), 0.0);
        assert_eq!(pull_fraction(500.0, 60.0), 1.0);
        assert_eq!(pull_fraction(f32::NAN, 60.0), 0.0);
    }

    #[test]
    fn test_edge_inset_accessors() {
        let inset = EdgeInsets::vertical(12.0, 34.0);
        assert_eq!(Edge::Leading.inset_of(&inset, Axis::Vertical), 12.0);
        assert_eq!(Edge::Trailing.inset_of(&inset, Axis::Vertical), 34.0);
        assert_eq!(
            Edge::Trailing.with_inset(inset, Axis::Vertical, 90.0),
            EdgeInsets::vertical(12.0, 90.0)
        );
    }
}
