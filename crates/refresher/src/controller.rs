//! Refresh controller
//!
//! A [`RefreshController`] decorates one edge of a scroll container. It
//! listens to the container's offset, content-size and gesture signals,
//! derives a [`Phase`] from how far the control has been pulled into view,
//! and reshapes the container's inset while the caller's action runs.
//!
//! # Cycle
//!
//! 1. Dragging exposes the control: `Pulling(progress)`.
//! 2. Dragging past `height`: `Committed(over_pull)`.
//! 3. Releasing while committed: `Active`. The inset grows by `height` over
//!    `expand_ms`, then the action is invoked.
//! 4. [`RefreshController::end_refreshing`]: `Settling(progress)` every frame
//!    while the inset returns to rest over `settle_ms`, then `Idle`.
//!
//! The resting inset is snapshotted when a cycle starts and written back
//! verbatim when it ends, so a full cycle leaves the container bit-for-bit
//! where it was.
//!
//! # Re-entrancy
//!
//! Controller state lives in a `RefCell`. Every entry point (signal handler,
//! frame callback, deferred task) takes it with `try_borrow_mut`; a signal
//! raised by the controller's own inset or offset write finds it borrowed and
//! is dropped. The action runs after the borrow is released, so it may call
//! back into the controller.
//!
//! Getters never touch that `RefCell`. They read a published copy that is
//! refreshed on every phase change and after every delivery, so other
//! observers of the container can query the controller from inside a signal
//! the controller itself raised.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use refresher::{ControllerConfig, Phase, RefreshController, ScrollContainer, ScrollView};
//! use refresher_core::{MainContext, Size};
//!
//! let ctx = MainContext::new();
//! let view = Rc::new(ScrollView::new(Size::new(320.0, 600.0), Size::new(320.0, 2000.0)));
//!
//! let config = ControllerConfig::builder(|controller| controller.end_refreshing())
//!     .height(60.0)
//!     .build()
//!     .unwrap();
//! let controller = RefreshController::new(&ctx, config);
//! controller.attach(&view);
//!
//! view.begin_drag();
//! view.drag_to_y(-80.0);
//! assert_eq!(controller.phase(), Phase::Committed { over_pull: 20.0 });
//!
//! view.end_drag();
//! assert!(controller.is_refreshing());
//!
//! ctx.advance(Duration::from_secs(1));
//! assert_eq!(controller.phase(), Phase::Idle);
//! assert_eq!(view.content_inset().top, 0.0);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use refresher_animation::Tween;
use refresher_core::{
    Axis, Change, EdgeInsets, FrameControl, FrameId, MainContext, Point, Rect, Size,
};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::config::{ControllerConfig, RefreshAction, RefreshTuning};
use crate::container::{GestureState, ScrollContainer, Subscription};
use crate::edge::{offset_bounds, pull_fraction, Edge, EdgeGeometry};
use crate::exhausted::{Appearance, ExhaustedView};
use crate::phase::{Phase, PhaseTag};
use crate::renderer::ProgressRenderer;

/// Handle to a refresh controller
///
/// Cloning yields another handle to the same controller. Dropping the last
/// handle detaches it.
#[derive(Clone)]
pub struct RefreshController {
    shared: Rc<Shared>,
}

struct Shared {
    ctx: MainContext,
    tuning: RefreshTuning,
    published: Published,
    state: RefCell<ControllerState>,
}

/// What the getters see
struct Published {
    phase: Cell<Phase>,
    enabled: Cell<bool>,
    edge: Cell<Edge>,
    frame: Cell<Rect>,
    original_inset: Cell<EdgeInsets>,
    appearance: Cell<Appearance>,
    container: RefCell<Option<Weak<dyn ScrollContainer>>>,
    exhausted_view: RefCell<Option<ExhaustedView>>,
}

/// Bookkeeping for the cycle between entering `Active` and reaching `Idle`
struct Cycle {
    /// Container inset when the cycle started
    resting: EdgeInsets,
}

struct Expand {
    inset: Tween<f32>,
    offset: Tween<f32>,
    frames: FrameId,
}

struct Settle {
    tween: Tween<f32>,
    start: f32,
    target: f32,
    frames: FrameId,
}

struct Fade {
    tween: Tween<f32>,
    frames: FrameId,
}

struct InstalledView {
    view: ExhaustedView,
    extent: f32,
    /// Trailing inset before the extent was reserved
    base: f32,
    /// Trailing inset with the extent reserved
    reserved: f32,
}

struct ControllerState {
    ctx: MainContext,
    this: Weak<Shared>,
    edge: Edge,
    tuning: RefreshTuning,
    action: RefreshAction,
    renderer: Box<dyn ProgressRenderer>,
    default_exhausted: Option<ExhaustedView>,

    phase: Phase,
    enabled: bool,
    container: Option<Weak<dyn ScrollContainer>>,
    subscriptions: SmallVec<[Subscription; 3]>,
    original_inset: EdgeInsets,
    frame: Rect,
    programmatic: bool,
    /// The commit was released by a cancelled gesture
    cancelled_release: bool,
    action_pending: bool,

    cycle: Option<Cycle>,
    expand: Option<Expand>,
    settle: Option<Settle>,
    fade: Option<Fade>,
    exhausted: Option<InstalledView>,
    appearance: Appearance,
}

/// Run `f` against the controller state, then invoke the action if `f`
/// queued it
///
/// Returns `None` when the state is already borrowed further up the stack.
fn dispatch<R>(shared: &Rc<Shared>, f: impl FnOnce(&mut ControllerState) -> R) -> Option<R> {
    let (result, action) = {
        let Ok(mut state) = shared.state.try_borrow_mut() else {
            trace!("RefreshController: dropping re-entrant delivery");
            return None;
        };
        let result = f(&mut state);
        state.publish();
        let action = if std::mem::take(&mut state.action_pending) {
            Some(state.action.clone())
        } else {
            None
        };
        (result, action)
    };

    if let Some(action) = action {
        trace!("RefreshController: invoking action");
        action(&RefreshController {
            shared: shared.clone(),
        });
    }
    Some(result)
}

fn keep_offset_in_bounds(container: &dyn ScrollContainer, axis: Axis) {
    if container.is_dragging() {
        return;
    }
    let (min, max) = offset_bounds(container, axis);
    let offset = container.content_offset();
    let along = offset.along(axis);
    let clamped = along.clamp(min, max);
    if clamped != along {
        container.set_content_offset(offset.with_along(axis, clamped));
    }
}

impl RefreshController {
    pub fn new(ctx: &MainContext, config: ControllerConfig) -> Self {
        let ControllerConfig {
            tuning,
            edge,
            action,
            renderer,
            exhausted_view,
        } = config;

        let shared = Rc::new_cyclic(|this| Shared {
            ctx: ctx.clone(),
            tuning: tuning.clone(),
            published: Published {
                phase: Cell::new(Phase::Idle),
                enabled: Cell::new(true),
                edge: Cell::new(edge),
                frame: Cell::new(Rect::ZERO),
                original_inset: Cell::new(EdgeInsets::ZERO),
                appearance: Cell::new(Appearance::default()),
                container: RefCell::new(None),
                exhausted_view: RefCell::new(None),
            },
            state: RefCell::new(ControllerState {
                ctx: ctx.clone(),
                this: this.clone(),
                edge,
                tuning,
                action,
                renderer,
                default_exhausted: exhausted_view,
                phase: Phase::Idle,
                enabled: true,
                container: None,
                subscriptions: SmallVec::new(),
                original_inset: EdgeInsets::ZERO,
                frame: Rect::ZERO,
                programmatic: false,
                cancelled_release: false,
                action_pending: false,
                cycle: None,
                expand: None,
                settle: None,
                fade: None,
                exhausted: None,
                appearance: Appearance::default(),
            }),
        });

        Self { shared }
    }

    // =========================================================================
    // Attachment
    // =========================================================================

    /// Bind to `container`, detaching from any previous one first
    ///
    /// The controller holds the container weakly.
    pub fn attach<C: ScrollContainer + 'static>(&self, container: &Rc<C>) {
        let container: Rc<dyn ScrollContainer> = container.clone();
        self.attach_dyn(container);
    }

    pub fn attach_dyn(&self, container: Rc<dyn ScrollContainer>) {
        let Ok(mut state) = self.shared.state.try_borrow_mut() else {
            warn!("RefreshController: attach while busy, ignored");
            return;
        };
        state.teardown();
        state.bind(&container);
        state.publish();
    }

    /// Unsubscribe from the container and stop all animations
    ///
    /// An in-flight cycle is abandoned: the inset is put back to rest and
    /// the phase resets to `Idle` without notifying the renderer.
    pub fn detach(&self) {
        match self.shared.state.try_borrow_mut() {
            Ok(mut state) => {
                state.teardown();
                state.publish();
            }
            Err(_) => warn!("RefreshController: detach while busy, ignored"),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.shared
            .published
            .container
            .borrow()
            .as_ref()
            .is_some_and(|container| container.strong_count() > 0)
    }

    pub(crate) fn set_edge(&self, edge: Edge) {
        let Ok(mut state) = self.shared.state.try_borrow_mut() else {
            warn!("RefreshController: set_edge while busy, ignored");
            return;
        };
        if state.edge != edge {
            state.teardown();
            state.edge = edge;
            state.publish();
        }
    }

    // =========================================================================
    // Programmatic control
    // =========================================================================

    /// Start a cycle as if the user had pulled past the threshold
    ///
    /// Takes effect on the next turn of the context. No-op while disabled or
    /// already active.
    pub fn begin_refreshing(&self) {
        let published = &self.shared.published;
        if !published.enabled.get() || published.phase.get().is(PhaseTag::Active) {
            trace!(
                "RefreshController: begin_refreshing ignored in {}",
                published.phase.get()
            );
            return;
        }

        let weak = Rc::downgrade(&self.shared);
        self.shared.ctx.defer(move || {
            let Some(shared) = weak.upgrade() else {
                warn!("RefreshController: released before begin_refreshing ran");
                return;
            };
            dispatch(&shared, |state| state.begin_programmatic());
        });
    }

    /// Finish the active cycle and settle back to rest
    ///
    /// Takes effect on the next turn of the context.
    pub fn end_refreshing(&self) {
        self.defer_end(|state| state.end_cycle(None));
    }

    /// Finish the active cycle and mark the trailing edge as exhausted
    ///
    /// `view` is shown below the content and the controller disables itself
    /// until [`set_enabled(true)`](Self::set_enabled). Leading controllers
    /// ignore the view.
    pub fn end_refreshing_with(&self, view: ExhaustedView) {
        self.defer_end(move |state| state.end_cycle(Some(view)));
    }

    /// [`end_refreshing_with`](Self::end_refreshing_with) the configured view,
    /// or a default one
    pub fn end_refreshing_exhausted(&self) {
        self.defer_end(|state| {
            let view = state.default_exhausted.clone().unwrap_or_default();
            state.end_cycle(Some(view));
        });
    }

    fn defer_end<F>(&self, f: F)
    where
        F: FnOnce(&mut ControllerState) + 'static,
    {
        let weak = Rc::downgrade(&self.shared);
        self.shared.ctx.defer(move || {
            let Some(shared) = weak.upgrade() else {
                warn!("RefreshController: released before end_refreshing ran");
                return;
            };
            dispatch(&shared, f);
        });
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.shared.published.phase.get()
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase().is(PhaseTag::Active)
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.published.enabled.get()
    }

    /// Enable or disable the controller
    ///
    /// Re-enabling a trailing controller removes its exhausted view on the
    /// next turn. Called while the controller is busy, the change itself
    /// waits for the next turn.
    pub fn set_enabled(&self, enabled: bool) {
        debug!(enabled, "RefreshController: set_enabled");
        if dispatch(&self.shared, |state| state.set_enabled(enabled)).is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.shared);
        self.shared.ctx.defer(move || {
            if let Some(shared) = weak.upgrade() {
                dispatch(&shared, |state| state.set_enabled(enabled));
            }
        });
    }

    pub fn edge(&self) -> Edge {
        self.shared.published.edge.get()
    }

    pub fn height(&self) -> f32 {
        self.shared.tuning.height
    }

    pub fn tuning(&self) -> RefreshTuning {
        self.shared.tuning.clone()
    }

    /// Control frame in content coordinates
    pub fn frame(&self) -> Rect {
        self.shared.published.frame.get()
    }

    /// Last resting inset observed while no cycle was running
    pub fn original_inset(&self) -> EdgeInsets {
        self.shared.published.original_inset.get()
    }

    pub fn appearance(&self) -> Appearance {
        self.shared.published.appearance.get()
    }

    /// The installed exhausted view, if any
    pub fn exhausted_view(&self) -> Option<ExhaustedView> {
        self.shared.published.exhausted_view.borrow().clone()
    }

    /// Both handles refer to the same controller
    pub fn ptr_eq(&self, other: &RefreshController) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for RefreshController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let published = &self.shared.published;
        f.debug_struct("RefreshController")
            .field("edge", &published.edge.get())
            .field("phase", &published.phase.get())
            .field("enabled", &published.enabled.get())
            .field("attached", &self.is_attached())
            .finish()
    }
}

// ============================================================================
// State machine
// ============================================================================

impl ControllerState {
    fn container(&self) -> Option<Rc<dyn ScrollContainer>> {
        self.container.as_ref()?.upgrade()
    }

    fn axis(&self) -> Axis {
        self.tuning.axis
    }

    fn height(&self) -> f32 {
        self.tuning.height
    }

    /// Copy the getter-visible fields into [`Published`]
    fn publish(&self) {
        let Some(shared) = self.this.upgrade() else {
            return;
        };
        let published = &shared.published;
        published.phase.set(self.phase);
        published.enabled.set(self.enabled);
        published.edge.set(self.edge);
        published.frame.set(self.frame);
        published.original_inset.set(self.original_inset);
        published.appearance.set(self.appearance);
        *published.container.borrow_mut() = self.container.clone();
        *published.exhausted_view.borrow_mut() =
            self.exhausted.as_ref().map(|installed| installed.view.clone());
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled || !self.edge.is_trailing() || self.exhausted.is_none() {
            return;
        }
        let weak = self.this.clone();
        self.ctx.defer(move || {
            if let Some(shared) = weak.upgrade() {
                dispatch(&shared, |state| state.remove_exhausted());
            }
        });
    }

    fn set_phase(&mut self, next: Phase) {
        if self.phase.is_identical(&next) {
            return;
        }
        let previous = std::mem::replace(&mut self.phase, next);
        if let Some(shared) = self.this.upgrade() {
            shared.published.phase.set(next);
        }
        let transition = !previous.same_tag(&next);
        if transition {
            debug!(edge = ?self.edge, "RefreshController: {} -> {}", previous, next);
        } else {
            trace!(edge = ?self.edge, "RefreshController: {}", next);
        }

        self.renderer.on_phase_changed(next);

        if transition && next.is(PhaseTag::Active) {
            self.enter_active();
        }
    }

    fn request_loop(&self, step: fn(&mut ControllerState, f32) -> FrameControl) -> FrameId {
        let weak = self.this.clone();
        self.ctx.request_frames(move |tick| {
            let Some(shared) = weak.upgrade() else {
                return FrameControl::Stop;
            };
            dispatch(&shared, |state| step(state, tick.dt_ms)).unwrap_or(FrameControl::Continue)
        })
    }

    fn bind(&mut self, container: &Rc<dyn ScrollContainer>) {
        container.set_always_bounces(self.axis());
        self.container = Some(Rc::downgrade(container));
        self.original_inset = container.content_inset();
        self.layout_frame(&**container);

        let weak = self.this.clone();
        let offset = container.observe_offset(Box::new(move |_: &Change<Point>| {
            if let Some(shared) = weak.upgrade() {
                dispatch(&shared, |state| state.on_offset_changed());
            }
        }));
        let weak = self.this.clone();
        let size = container.observe_content_size(Box::new(move |_: &Change<Size>| {
            if let Some(shared) = weak.upgrade() {
                dispatch(&shared, |state| state.on_content_size_changed());
            }
        }));
        let weak = self.this.clone();
        let gesture = container.observe_gesture_state(Box::new(move |change: &Change<GestureState>| {
            let gesture = change.new;
            if let Some(shared) = weak.upgrade() {
                dispatch(&shared, |state| state.on_gesture_changed(gesture));
            }
        }));
        self.subscriptions.extend([offset, size, gesture]);

        debug!(
            edge = ?self.edge,
            container = container.container_id().raw(),
            "RefreshController: attached"
        );
    }

    fn teardown(&mut self) {
        for frames in [
            self.expand.take().map(|expand| expand.frames),
            self.fade.take().map(|fade| fade.frames),
        ]
        .into_iter()
        .flatten()
        {
            self.ctx.cancel_frames(frames);
        }
        let settle = self.settle.take();
        if let Some(settle) = &settle {
            self.ctx.cancel_frames(settle.frames);
        }

        let container = self.container();
        if let Some(container) = &container {
            for subscription in self.subscriptions.drain(..) {
                container.unobserve(subscription);
            }

            let axis = self.axis();
            let rest = match (&settle, &self.cycle) {
                (Some(settle), _) => Some(settle.target),
                (None, Some(cycle)) => Some(self.edge.inset_of(&cycle.resting, axis)),
                (None, None) => None,
            };
            if let Some(rest) = rest {
                let inset = self.edge.with_inset(container.content_inset(), axis, rest);
                container.set_content_inset(inset);
            }
        }

        if let Some(installed) = self.exhausted.take() {
            if let Some(container) = &container {
                self.release_extent(&installed, &**container);
            }
            self.appearance = Appearance::default();
            debug!("RefreshController: exhausted view dropped on detach");
        }

        self.subscriptions.clear();
        self.cycle = None;
        self.programmatic = false;
        self.cancelled_release = false;
        self.action_pending = false;
        if self.phase.is_in_cycle() {
            trace!("RefreshController: abandoning {}", self.phase);
            self.phase = Phase::Idle;
        }

        if self.container.take().is_some() {
            debug!(edge = ?self.edge, "RefreshController: detached");
        }
    }

    fn layout_frame(&mut self, container: &dyn ScrollContainer) {
        let axis = self.axis();
        let cross = axis.cross();
        let height = self.height();
        let main = match self.edge {
            Edge::Leading => -height,
            Edge::Trailing => container.content_size().along(axis),
        };
        let origin = Point::ZERO
            .with_along(axis, main)
            .with_along(cross, -container.content_inset().leading(cross));
        let size = Size::ZERO
            .with_along(axis, height)
            .with_along(cross, container.viewport_size().along(cross));
        self.frame = Rect::new(origin, size);
    }

    // -------------------------------------------------------------------------
    // Signals
    // -------------------------------------------------------------------------

    fn on_offset_changed(&mut self) {
        if !self.enabled {
            return;
        }
        let Some(container) = self.container() else {
            return;
        };
        if !container.is_user_interaction_enabled() {
            return;
        }

        match self.phase.tag() {
            PhaseTag::Active => {
                if self.edge.is_leading() {
                    self.hold_active_overscroll(&*container);
                }
                return;
            }
            PhaseTag::Settling => return,
            _ => {}
        }

        self.original_inset = container.content_inset();
        let geometry = EdgeGeometry::read(&*container, self.axis(), self.original_inset);
        let excess = geometry.excess(self.edge);
        let height = self.height();
        trace!(edge = ?self.edge, offset = geometry.offset, excess, "RefreshController: offset");

        if self.phase.is(PhaseTag::Idle) && excess <= 0.0 {
            return;
        }

        if container.is_dragging() {
            if excess > height {
                if !self.phase.is(PhaseTag::Committed) {
                    self.set_phase(Phase::pulling(1.0));
                }
                self.set_phase(Phase::committed(excess - height));
            } else {
                self.set_phase(Phase::pulling(pull_fraction(excess, height)));
            }
            return;
        }

        match self.phase.tag() {
            PhaseTag::Committed => self.set_phase(Phase::Active),
            PhaseTag::Idle if self.edge.is_trailing() && self.tuning.trailing_auto_trigger => {
                self.set_phase(Phase::pulling(1.0));
                self.set_phase(Phase::Active);
            }
            _ => {}
        }
    }

    fn on_content_size_changed(&mut self) {
        let Some(container) = self.container() else {
            return;
        };
        if !container.is_user_interaction_enabled() {
            return;
        }
        self.layout_frame(&*container);
    }

    fn on_gesture_changed(&mut self, gesture: GestureState) {
        if !self.enabled || !gesture.is_finished() {
            return;
        }
        match self.phase.tag() {
            PhaseTag::Committed => {
                self.cancelled_release = gesture == GestureState::Cancelled;
                self.set_phase(Phase::Active);
            }
            PhaseTag::Pulling => self.set_phase(Phase::Idle),
            _ => {}
        }
    }

    /// While active, the leading inset follows the content down but never
    /// shrinks below rest or grows past `rest + height`
    fn hold_active_overscroll(&self, container: &dyn ScrollContainer) {
        if self.expand.is_some() {
            return;
        }
        let Some(cycle) = &self.cycle else {
            return;
        };
        let axis = self.axis();
        let rest = cycle.resting.leading(axis);
        let offset = container.content_offset().along(axis);
        let leading = (-offset).max(rest).min(rest + self.height());

        let inset = container.content_inset();
        if inset.leading(axis) != leading {
            trace!(leading, held = leading - rest, "RefreshController: holding overscroll");
            container.set_content_inset(inset.with_leading(axis, leading));
        }
    }

    // -------------------------------------------------------------------------
    // Active
    // -------------------------------------------------------------------------

    fn begin_programmatic(&mut self) {
        if !self.enabled || self.phase.is(PhaseTag::Active) {
            return;
        }
        if self.phase.is(PhaseTag::Settling) {
            self.finish_settle_now();
        }
        self.programmatic = true;
        self.set_phase(Phase::pulling(1.0));
        self.set_phase(Phase::Active);
    }

    fn enter_active(&mut self) {
        let programmatic = std::mem::take(&mut self.programmatic);
        let cancelled = std::mem::take(&mut self.cancelled_release);
        let Some(container) = self.container() else {
            debug!("RefreshController: active without a container");
            self.action_pending = true;
            return;
        };

        let axis = self.axis();
        let height = self.height();
        let resting = container.content_inset();
        self.original_inset = resting;
        self.cycle = Some(Cycle { resting });
        debug!(edge = ?self.edge, programmatic, "RefreshController: cycle started");

        if !programmatic && cancelled {
            self.action_pending = true;
            return;
        }

        let (inset_target, offset_target) = match self.edge {
            Edge::Leading => {
                let leading = resting.leading(axis) + height;
                (leading, -leading)
            }
            Edge::Trailing => {
                if programmatic && !self.tuning.compat.programmatic_trailing_choreography {
                    self.action_pending = true;
                    return;
                }
                let geometry = EdgeGeometry::read(&*container, axis, resting);
                (
                    geometry.active_trailing_inset(height),
                    geometry.appear_offset(Edge::Trailing) + height,
                )
            }
        };

        let expand = Expand {
            inset: Tween::new(
                self.edge.inset_of(&resting, axis),
                inset_target,
                self.tuning.expand_ms,
                self.tuning.easing,
            ),
            offset: Tween::new(
                container.content_offset().along(axis),
                offset_target,
                self.tuning.expand_ms,
                self.tuning.easing,
            ),
            frames: self.request_loop(ControllerState::step_expand),
        };
        self.expand = Some(expand);
    }

    fn step_expand(&mut self, dt_ms: f32) -> FrameControl {
        let Some(container) = self.container() else {
            self.expand = None;
            self.cycle = None;
            self.set_phase(Phase::Idle);
            return FrameControl::Stop;
        };
        let axis = self.axis();
        let edge = self.edge;
        let Some(expand) = self.expand.as_mut() else {
            return FrameControl::Stop;
        };

        expand.inset.tick(dt_ms);
        expand.offset.tick(dt_ms);
        container.set_content_inset(edge.with_inset(
            container.content_inset(),
            axis,
            expand.inset.value(),
        ));
        container.set_content_offset(
            container
                .content_offset()
                .with_along(axis, expand.offset.value()),
        );

        if !expand.inset.is_finished() {
            return FrameControl::Continue;
        }
        self.expand = None;
        if self.phase.is(PhaseTag::Active) {
            self.action_pending = true;
        }
        FrameControl::Stop
    }

    // -------------------------------------------------------------------------
    // Settle
    // -------------------------------------------------------------------------

    fn end_cycle(&mut self, exhausted: Option<ExhaustedView>) {
        self.programmatic = false;

        let mut replaced = None;
        if let Some(view) = exhausted {
            if self.edge.is_trailing() {
                if self.phase.is(PhaseTag::Settling) {
                    self.finish_settle_now();
                }
                replaced = Some(self.install_exhausted(view));
            }
        }

        if self.phase.is(PhaseTag::Active) {
            self.begin_settle(replaced);
            return;
        }

        // No cycle to settle: reserve the view's extent right away
        if let (Some(replaced), Some(container)) = (replaced, self.container()) {
            let axis = self.axis();
            let inset = container.content_inset();
            let reserved = self.reserve_extent(inset.trailing(axis), replaced.as_ref());
            container.set_content_inset(inset.with_trailing(axis, reserved));
        }
    }

    /// `replaced` is `Some` when an exhausted view was just installed; its
    /// inner value is the view it displaced
    fn begin_settle(&mut self, replaced: Option<Option<InstalledView>>) {
        if let Some(expand) = self.expand.take() {
            debug!("RefreshController: expand interrupted");
            self.ctx.cancel_frames(expand.frames);
        }

        let Some(container) = self.container() else {
            self.cycle = None;
            self.set_phase(Phase::Idle);
            return;
        };
        let axis = self.axis();
        let live = self.edge.inset_of(&container.content_inset(), axis);
        let rest = match &self.cycle {
            Some(cycle) => self.edge.inset_of(&cycle.resting, axis),
            None => live,
        };
        let target = match replaced {
            Some(replaced) => self.reserve_extent(rest, replaced.as_ref()),
            None => rest,
        };

        debug!(edge = ?self.edge, from = live, to = target, "RefreshController: settling");
        let settle = Settle {
            tween: Tween::new(live, target, self.tuning.settle_ms, self.tuning.easing),
            start: live,
            target,
            frames: self.request_loop(ControllerState::step_settle),
        };
        self.settle = Some(settle);
        self.set_phase(Phase::settling(0.0));
    }

    fn step_settle(&mut self, dt_ms: f32) -> FrameControl {
        let Some(container) = self.container() else {
            self.settle = None;
            self.cycle = None;
            self.set_phase(Phase::Idle);
            return FrameControl::Stop;
        };
        let axis = self.axis();
        let edge = self.edge;
        let Some(settle) = self.settle.as_mut() else {
            return FrameControl::Stop;
        };

        settle.tween.tick(dt_ms);
        let (start, target) = (settle.start, settle.target);
        let eased = settle.tween.eased_progress();
        let finished = settle.tween.is_finished();
        container.set_content_inset(edge.with_inset(
            container.content_inset(),
            axis,
            settle.tween.value(),
        ));
        keep_offset_in_bounds(&*container, axis);

        if finished {
            self.complete_settle();
            return FrameControl::Stop;
        }

        // Sample what the container actually shows, not the tween's target
        let live = edge.inset_of(&container.content_inset(), axis);
        let span = start - target;
        let progress = if span.abs() > f32::EPSILON {
            (start - live) / span
        } else {
            eased
        };
        trace!(live, progress, "RefreshController: settle sample");
        self.set_phase(Phase::settling(progress));
        FrameControl::Continue
    }

    /// Jump an in-flight settle to its end
    fn finish_settle_now(&mut self) {
        let Some(settle) = self.settle.take() else {
            return;
        };
        self.ctx.cancel_frames(settle.frames);
        if let Some(container) = self.container() {
            let axis = self.axis();
            let inset = self
                .edge
                .with_inset(container.content_inset(), axis, settle.target);
            container.set_content_inset(inset);
            keep_offset_in_bounds(&*container, axis);
        }
        self.complete_settle();
    }

    fn complete_settle(&mut self) {
        self.settle = None;
        self.cycle = None;
        self.set_phase(Phase::settling(1.0));
        self.set_phase(Phase::Idle);
        debug!(edge = ?self.edge, "RefreshController: cycle finished");
    }

    // -------------------------------------------------------------------------
    // Exhausted view
    // -------------------------------------------------------------------------

    /// Install `view`, returning the view it replaced
    fn install_exhausted(&mut self, mut view: ExhaustedView) -> Option<InstalledView> {
        let extent = view.resolved_extent(self.height());
        view.set_alpha(0.0);
        let replaced = self.exhausted.replace(InstalledView {
            view,
            extent,
            base: 0.0,
            reserved: 0.0,
        });

        self.enabled = false;
        if matches!(self.phase.tag(), PhaseTag::Pulling | PhaseTag::Committed) {
            self.set_phase(Phase::Idle);
        }
        self.start_fade();
        debug!(extent, "RefreshController: exhausted view installed");
        replaced
    }

    /// Trailing inset that reserves the installed view's extent on top of
    /// `current`
    fn reserve_extent(&mut self, current: f32, replaced: Option<&InstalledView>) -> f32 {
        let base = match replaced {
            Some(old) if current == old.reserved => old.base,
            Some(old) => current - old.extent,
            None => current,
        };
        let Some(installed) = self.exhausted.as_mut() else {
            return current;
        };
        installed.base = base;
        installed.reserved = base + installed.extent;
        installed.reserved
    }

    fn remove_exhausted(&mut self) {
        if !self.enabled || self.exhausted.is_none() {
            return;
        }
        if self.phase.is(PhaseTag::Settling) {
            self.finish_settle_now();
        }
        if let Some(fade) = self.fade.take() {
            self.ctx.cancel_frames(fade.frames);
        }
        let Some(installed) = self.exhausted.take() else {
            return;
        };
        self.appearance = Appearance::default();

        if let Some(container) = self.container() {
            self.release_extent(&installed, &*container);
            keep_offset_in_bounds(&*container, self.axis());
        }
        debug!("RefreshController: exhausted view removed");
    }

    /// Give the view's extent back to the trailing inset
    ///
    /// Restores the exact pre-install inset when nothing else changed it.
    fn release_extent(&self, installed: &InstalledView, container: &dyn ScrollContainer) {
        let axis = self.axis();
        let inset = container.content_inset();
        let trailing = inset.trailing(axis);
        let restored = if trailing == installed.reserved {
            installed.base
        } else {
            trailing - installed.extent
        };
        container.set_content_inset(inset.with_trailing(axis, restored));
    }

    fn start_fade(&mut self) {
        if let Some(fade) = self.fade.take() {
            self.ctx.cancel_frames(fade.frames);
        }
        self.appearance = Appearance::default();
        let fade = Fade {
            tween: Tween::new(0.0, 1.0, self.tuning.fade_ms, self.tuning.easing),
            frames: self.request_loop(ControllerState::step_fade),
        };
        self.fade = Some(fade);
    }

    fn step_fade(&mut self, dt_ms: f32) -> FrameControl {
        let Some(fade) = self.fade.as_mut() else {
            return FrameControl::Stop;
        };
        fade.tween.tick(dt_ms);
        let alpha = fade.tween.value();
        let finished = fade.tween.is_finished();

        if let Some(installed) = self.exhausted.as_mut() {
            installed.view.set_alpha(alpha);
        }
        if finished {
            self.fade = None;
            self.appearance = Appearance {
                renderer_alpha: 1.0,
                renderer_hidden: true,
            };
            return FrameControl::Stop;
        }
        self.appearance.renderer_alpha = 1.0 - alpha;
        FrameControl::Continue
    }
}

impl Drop for ControllerState {
    fn drop(&mut self) {
        self.teardown();
    }
}
