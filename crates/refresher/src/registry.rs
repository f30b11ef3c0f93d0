//! Attachment registry
//!
//! Associates refresh controllers with containers: at most one controller
//! per edge per container. Setting a slot that is already occupied detaches
//! the previous occupant before the new one attaches.

use std::rc::{Rc, Weak};

use refresher_core::MainContext;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::ControllerConfig;
use crate::container::{ContainerId, ScrollContainer};
use crate::controller::RefreshController;
use crate::edge::Edge;

struct EdgeSlots {
    container: Weak<dyn ScrollContainer>,
    leading: Option<RefreshController>,
    trailing: Option<RefreshController>,
}

impl EdgeSlots {
    fn slot(&mut self, edge: Edge) -> &mut Option<RefreshController> {
        match edge {
            Edge::Leading => &mut self.leading,
            Edge::Trailing => &mut self.trailing,
        }
    }

    fn is_empty(&self) -> bool {
        self.leading.is_none() && self.trailing.is_none()
    }
}

/// Container → edge → controller
pub struct RefresherRegistry {
    ctx: MainContext,
    slots: FxHashMap<ContainerId, EdgeSlots>,
}

impl RefresherRegistry {
    pub fn new(ctx: &MainContext) -> Self {
        Self {
            ctx: ctx.clone(),
            slots: FxHashMap::default(),
        }
    }

    /// Build a pull-to-refresh controller and attach it to `container`
    pub fn attach_leading<C>(&mut self, container: &Rc<C>, config: ControllerConfig) -> RefreshController
    where
        C: ScrollContainer + 'static,
    {
        let controller = RefreshController::new(&self.ctx, config.with_edge(Edge::Leading));
        self.set(container, Edge::Leading, Some(controller.clone()));
        controller
    }

    /// Build a load-more controller and attach it to `container`
    pub fn attach_trailing<C>(&mut self, container: &Rc<C>, config: ControllerConfig) -> RefreshController
    where
        C: ScrollContainer + 'static,
    {
        let controller = RefreshController::new(&self.ctx, config.with_edge(Edge::Trailing));
        self.set(container, Edge::Trailing, Some(controller.clone()));
        controller
    }

    /// Put `controller` in the `edge` slot of `container`, or clear the slot
    ///
    /// The previous occupant is detached first. Setting the current occupant
    /// again does nothing.
    pub fn set<C>(&mut self, container: &Rc<C>, edge: Edge, controller: Option<RefreshController>)
    where
        C: ScrollContainer + 'static,
    {
        let id = container.container_id();
        let dyn_container: Rc<dyn ScrollContainer> = container.clone();
        let slots = self.slots.entry(id).or_insert_with(|| EdgeSlots {
            container: Rc::downgrade(&dyn_container),
            leading: None,
            trailing: None,
        });
        let slot = slots.slot(edge);

        if let (Some(current), Some(next)) = (slot.as_ref(), controller.as_ref()) {
            if current.ptr_eq(next) {
                return;
            }
        }

        if let Some(previous) = slot.take() {
            debug!(container = id.raw(), ?edge, "RefresherRegistry: evicting controller");
            previous.detach();
        }

        if let Some(controller) = controller {
            controller.set_edge(edge);
            controller.attach_dyn(dyn_container);
            *slot = Some(controller);
        }

        if slots.is_empty() {
            self.slots.remove(&id);
        }
    }

    pub fn get<C>(&self, container: &C, edge: Edge) -> Option<RefreshController>
    where
        C: ScrollContainer + ?Sized,
    {
        let slots = self.slots.get(&container.container_id())?;
        match edge {
            Edge::Leading => slots.leading.clone(),
            Edge::Trailing => slots.trailing.clone(),
        }
    }

    pub fn leading<C: ScrollContainer + ?Sized>(&self, container: &C) -> Option<RefreshController> {
        self.get(container, Edge::Leading)
    }

    pub fn trailing<C: ScrollContainer + ?Sized>(&self, container: &C) -> Option<RefreshController> {
        self.get(container, Edge::Trailing)
    }

    /// Detach and remove the controller at `edge`
    pub fn detach<C>(&mut self, container: &C, edge: Edge) -> Option<RefreshController>
    where
        C: ScrollContainer + ?Sized,
    {
        let id = container.container_id();
        let slots = self.slots.get_mut(&id)?;
        let removed = slots.slot(edge).take();
        if slots.is_empty() {
            self.slots.remove(&id);
        }
        if let Some(controller) = &removed {
            controller.detach();
        }
        removed
    }

    /// Detach both edges of `container`
    pub fn detach_all<C>(&mut self, container: &C)
    where
        C: ScrollContainer + ?Sized,
    {
        if let Some(slots) = self.slots.remove(&container.container_id()) {
            for controller in [slots.leading, slots.trailing].into_iter().flatten() {
                controller.detach();
            }
        }
    }

    /// Drop entries whose container no longer exists. Returns how many
    /// controllers were released.
    pub fn prune(&mut self) -> usize {
        let mut released = 0;
        self.slots.retain(|_, slots| {
            if slots.container.strong_count() > 0 {
                return true;
            }
            for controller in [slots.leading.take(), slots.trailing.take()].into_iter().flatten() {
                controller.detach();
                released += 1;
            }
            false
        });
        if released > 0 {
            debug!(released, "RefresherRegistry: pruned");
        }
        released
    }

    /// Number of attached controllers
    pub fn len(&self) -> usize {
        self.slots
            .values()
            .map(|slots| usize::from(slots.leading.is_some()) + usize::from(slots.trailing.is_some()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
