//! Scroll container capability
//!
//! The controller never owns the container it decorates. It reads geometry,
//! writes inset and offset, and observes three signals through the
//! [`ScrollContainer`] trait. [`ScrollView`](crate::ScrollView) is the
//! in-memory implementation; platform bindings implement the trait over
//! their native scroll views.

use std::sync::atomic::{AtomicU64, Ordering};

use refresher_core::{Axis, Change, EdgeInsets, Point, Size, SubscriptionId};

/// Process-unique identity of a scroll container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

impl ContainerId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Drag gesture recognizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    #[default]
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GestureState {
    /// The gesture has ended, successfully or not
    pub fn is_finished(self) -> bool {
        matches!(self, GestureState::Ended | GestureState::Cancelled)
    }
}

/// Which container signal a subscription observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offset,
    ContentSize,
    GestureState,
}

/// Handle returned by the `observe_*` methods, passed back to `unobserve`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub kind: SignalKind,
    pub id: SubscriptionId,
}

pub type OffsetHandler = Box<dyn FnMut(&Change<Point>)>;
pub type SizeHandler = Box<dyn FnMut(&Change<Size>)>;
pub type GestureHandler = Box<dyn FnMut(&Change<GestureState>)>;

/// What the controller needs from a scrollable container
///
/// All methods take `&self`: containers use interior mutability, and the
/// controller may write offset or inset from inside one of its own signal
/// handlers. Implementations must not re-deliver a change to the handler
/// that caused it while that handler is still running.
pub trait ScrollContainer {
    fn container_id(&self) -> ContainerId;

    fn content_offset(&self) -> Point;
    fn set_content_offset(&self, offset: Point);

    fn content_size(&self) -> Size;
    fn viewport_size(&self) -> Size;

    fn content_inset(&self) -> EdgeInsets;
    fn set_content_inset(&self, inset: EdgeInsets);

    /// The user's finger is down and moving the content
    fn is_dragging(&self) -> bool;
    fn gesture_state(&self) -> GestureState;

    fn is_user_interaction_enabled(&self) -> bool {
        true
    }

    /// Let the container overscroll along `axis` even when the content fits
    fn set_always_bounces(&self, _axis: Axis) {}

    fn observe_offset(&self, handler: OffsetHandler) -> Subscription;
    fn observe_content_size(&self, handler: SizeHandler) -> Subscription;
    fn observe_gesture_state(&self, handler: GestureHandler) -> Subscription;

    /// Drop a subscription. Returns `false` if it was not live.
    fn unobserve(&self, subscription: Subscription) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_ids_are_unique() {
        let a = ContainerId::next();
        let b = ContainerId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_gesture_finished() {
        assert!(GestureState::Ended.is_finished());
        assert!(GestureState::Cancelled.is_finished());
        assert!(!GestureState::Changed.is_finished());
        assert_eq!(GestureState::default(), GestureState::Possible);
    }
}
