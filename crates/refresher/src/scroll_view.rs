//! In-memory scroll container
//!
//! `ScrollView` holds its observable state in [`Observable`] cells and
//! exposes host-side drivers that play the role of the platform's touch
//! handling: `begin_drag`, `drag_to`, `end_drag` and so on. It does no
//! physics of its own; the host decides where the content is.
//!
//! # Example
//!
//! ```rust
//! use refresher::{GestureState, ScrollContainer, ScrollView};
//! use refresher_core::{Point, Size};
//!
//! let view = ScrollView::new(Size::new(320.0, 600.0), Size::new(320.0, 2000.0));
//! view.begin_drag();
//! view.drag_to(Point::new(0.0, -40.0));
//! assert!(view.is_dragging());
//!
//! view.end_drag();
//! assert_eq!(view.gesture_state(), GestureState::Ended);
//! ```

use std::cell::Cell;
use std::fmt;

use refresher_core::{Axis, EdgeInsets, Observable, Point, Size};

use crate::container::{
    ContainerId, GestureHandler, GestureState, OffsetHandler, ScrollContainer, SignalKind,
    SizeHandler, Subscription,
};

pub struct ScrollView {
    id: ContainerId,
    offset: Observable<Point>,
    content_size: Observable<Size>,
    gesture: Observable<GestureState>,
    viewport: Cell<Size>,
    inset: Cell<EdgeInsets>,
    dragging: Cell<bool>,
    interaction_enabled: Cell<bool>,
    bounces_vertical: Cell<bool>,
    bounces_horizontal: Cell<bool>,
}

impl ScrollView {
    pub fn new(viewport: Size, content: Size) -> Self {
        Self {
            id: ContainerId::next(),
            offset: Observable::new(Point::ZERO),
            content_size: Observable::new(content),
            gesture: Observable::new(GestureState::Possible),
            viewport: Cell::new(viewport),
            inset: Cell::new(EdgeInsets::ZERO),
            dragging: Cell::new(false),
            interaction_enabled: Cell::new(true),
            bounces_vertical: Cell::new(false),
            bounces_horizontal: Cell::new(false),
        }
    }

    /// Builder: start with a content inset, resting at its leading edge
    pub fn with_inset(self, inset: EdgeInsets) -> Self {
        self.inset.set(inset);
        self.offset.set(Point::new(-inset.left, -inset.top));
        self
    }

    // =========================================================================
    // Host drivers
    // =========================================================================

    /// Touch down: the user starts dragging
    pub fn begin_drag(&self) {
        self.dragging.set(true);
        self.gesture.set(GestureState::Began);
    }

    /// Move the content under the finger
    pub fn drag_to(&self, offset: Point) {
        if !self.dragging.get() {
            self.begin_drag();
        }
        self.gesture.set(GestureState::Changed);
        self.offset.set(offset);
    }

    /// Drag to `value` along the vertical axis
    pub fn drag_to_y(&self, value: f32) {
        self.drag_to(self.offset.get().with_along(Axis::Vertical, value));
    }

    /// Drag to `value` along `axis`
    pub fn drag_along(&self, axis: Axis, value: f32) {
        self.drag_to(self.offset.get().with_along(axis, value));
    }

    /// Touch up
    pub fn end_drag(&self) {
        self.dragging.set(false);
        self.gesture.set(GestureState::Ended);
    }

    /// The system took the gesture away (incoming call, parent recognizer)
    pub fn cancel_drag(&self) {
        self.dragging.set(false);
        self.gesture.set(GestureState::Cancelled);
    }

    /// Move the content without a drag, e.g. momentum or a programmatic scroll
    pub fn scroll_to(&self, offset: Point) {
        self.offset.set(offset);
    }

    pub fn set_content_size(&self, size: Size) {
        self.content_size.set(size);
    }

    pub fn set_viewport_size(&self, size: Size) {
        self.viewport.set(size);
    }

    pub fn set_user_interaction_enabled(&self, enabled: bool) {
        self.interaction_enabled.set(enabled);
    }

    pub fn always_bounces(&self, axis: Axis) -> bool {
        match axis {
            Axis::Vertical => self.bounces_vertical.get(),
            Axis::Horizontal => self.bounces_horizontal.get(),
        }
    }

    /// Live subscriptions across all three signals
    pub fn observer_count(&self) -> usize {
        self.offset.subscriber_count()
            + self.content_size.subscriber_count()
            + self.gesture.subscriber_count()
    }
}

impl ScrollContainer for ScrollView {
    fn container_id(&self) -> ContainerId {
        self.id
    }

    fn content_offset(&self) -> Point {
        self.offset.get()
    }

    fn set_content_offset(&self, offset: Point) {
        self.offset.set(offset);
    }

    fn content_size(&self) -> Size {
        self.content_size.get()
    }

    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn content_inset(&self) -> EdgeInsets {
        self.inset.get()
    }

    fn set_content_inset(&self, inset: EdgeInsets) {
        self.inset.set(inset);
    }

    fn is_dragging(&self) -> bool {
        self.dragging.get()
    }

    fn gesture_state(&self) -> GestureState {
        self.gesture.get()
    }

    fn is_user_interaction_enabled(&self) -> bool {
        self.interaction_enabled.get()
    }

    fn set_always_bounces(&self, axis: Axis) {
        match axis {
            Axis::Vertical => self.bounces_vertical.set(true),
            Axis::Horizontal => self.bounces_horizontal.set(true),
        }
    }

    fn observe_offset(&self, handler: OffsetHandler) -> Subscription {
        Subscription {
            kind: SignalKind::Offset,
            id: self.offset.subscribe(handler),
        }
    }

    fn observe_content_size(&self, handler: SizeHandler) -> Subscription {
        Subscription {
            kind: SignalKind::ContentSize,
            id: self.content_size.subscribe(handler),
        }
    }

    fn observe_gesture_state(&self, handler: GestureHandler) -> Subscription {
        Subscription {
            kind: SignalKind::GestureState,
            id: self.gesture.subscribe(handler),
        }
    }

    fn unobserve(&self, subscription: Subscription) -> bool {
        match subscription.kind {
            SignalKind::Offset => self.offset.unsubscribe(subscription.id),
            SignalKind::ContentSize => self.content_size.unsubscribe(subscription.id),
            SignalKind::GestureState => self.gesture.unsubscribe(subscription.id),
        }
    }
}

impl fmt::Debug for ScrollView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollView")
            .field("id", &self.id)
            .field("offset", &self.offset.get())
            .field("content_size", &self.content_size.get())
            .field("viewport", &self.viewport.get())
            .field("inset", &self.inset.get())
            .field("dragging", &self.dragging.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refresher_core::Change;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_drag_emits_gesture_before_offset() {
        let view = ScrollView::new(Size::new(320.0, 600.0), Size::new(320.0, 2000.0));
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_clone = log.clone();
        view.observe_gesture_state(Box::new(move |change: &Change<GestureState>| {
            log_clone.borrow_mut().push(format!("gesture {:?}", change.new))
        }));
        let log_clone = log.clone();
        view.observe_offset(Box::new(move |change: &Change<Point>| {
            log_clone.borrow_mut().push(format!("offset {}", change.new.y))
        }));

        view.drag_to_y(-10.0);
        view.end_drag();

        assert_eq!(
            *log.borrow(),
            vec![
                "gesture Began",
                "gesture Changed",
                "offset -10",
                "gesture Ended",
            ]
        );
        assert!(!view.is_dragging());
    }

    #[test]
    fn test_unobserve_by_kind() {
        let view = ScrollView::new(Size::new(320.0, 600.0), Size::new(320.0, 2000.0));
        let offset = view.observe_offset(Box::new(|_: &Change<Point>| {}));
        let size = view.observe_content_size(Box::new(|_: &Change<Size>| {}));
        assert_eq!(view.observer_count(), 2);

        assert!(view.unobserve(offset));
        assert!(!view.unobserve(offset));
        assert!(view.unobserve(size));
        assert_eq!(view.observer_count(), 0);
    }

    #[test]
    fn test_with_inset_rests_at_leading_edge() {
        let view = ScrollView::new(Size::new(320.0, 600.0), Size::new(320.0, 2000.0))
            .with_inset(EdgeInsets::vertical(20.0, 0.0));
        assert_eq!(view.content_offset(), Point::new(0.0, -20.0));
        assert_eq!(view.content_inset().top, 20.0);
    }
}
