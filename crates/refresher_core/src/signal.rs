//! Observable signals
//!
//! A typed publish/subscribe cell. Every observable field of a scroll
//! container (offset, content size, gesture state) is one `Observable`, and
//! subscribers receive the value before and after each change.
//!
//! Subscriptions are keyed by [`SubscriptionId`], a slotmap key, so an id that
//! has been unsubscribed can never alias a newer subscription.
//!
//! # Re-entrancy
//!
//! Handlers run on the UI context and are allowed to mutate the observable
//! they are subscribed to, or any other. Emission iterates over a snapshot of
//! the subscriber list, so handlers may subscribe and unsubscribe freely. A
//! handler that is currently running does not receive the nested change it
//! caused:
//!
//! ```rust
//! use refresher_core::Observable;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let offset = Rc::new(Observable::new(0.0f32));
//! let calls = Rc::new(Cell::new(0));
//!
//! let (offset_clone, calls_clone) = (offset.clone(), calls.clone());
//! offset.subscribe(move |change| {
//!     calls_clone.set(calls_clone.get() + 1);
//!     // Snapping the offset from inside the handler does not loop back here
//!     offset_clone.set(change.new.min(-10.0));
//! });
//!
//! offset.set(5.0);
//! assert_eq!(calls.get(), 1);
//! assert_eq!(offset.get(), -10.0);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifier of a single subscription on an [`Observable`]
    pub struct SubscriptionId;
}

/// An old/new value pair delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

type Handler<T> = Rc<RefCell<dyn FnMut(&Change<T>)>>;

/// A value cell that notifies subscribers when it changes
pub struct Observable<T> {
    value: RefCell<T>,
    handlers: RefCell<SlotMap<SubscriptionId, Handler<T>>>,
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            handlers: RefCell::new(SlotMap::with_key()),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store a new value and notify subscribers
    ///
    /// Returns `false` (and notifies nobody) if the value is unchanged.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut slot = self.value.borrow_mut();
            if *slot == value {
                return false;
            }
            std::mem::replace(&mut *slot, value.clone())
        };
        self.emit(&Change { old, new: value });
        true
    }

    /// Register a change handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Change<T>) + 'static,
    {
        let handler: Handler<T> = Rc::new(RefCell::new(handler));
        self.handlers.borrow_mut().insert(handler)
    }

    /// Remove a handler. Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers.borrow_mut().remove(id).is_some()
    }

    /// Check whether a subscription is still live
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.handlers.borrow().contains_key(id)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    fn emit(&self, change: &Change<T>) {
        let snapshot: Vec<(SubscriptionId, Handler<T>)> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, handler)| (id, handler.clone()))
            .collect();

        for (id, handler) in snapshot {
            // Unsubscribed by an earlier handler in this emission
            if !self.is_subscribed(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(change),
                Err(_) => tracing::trace!("Observable: dropping nested change for running handler"),
            }
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.value.borrow())
            .field("subscribers", &self.handlers.borrow().len())
            .finish()
    }
}
