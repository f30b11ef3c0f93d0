//! Refresher Core Runtime
//!
//! This crate provides the foundational primitives the refresh controller is
//! built on:
//!
//! - **Geometry**: points, sizes, rects and four-sided insets, projected onto
//!   a scroll [`Axis`]
//! - **Observable Signals**: typed value cells that publish old/new pairs to
//!   subscribers
//! - **Main Context**: the single cooperative UI execution context, with a
//!   deferred-task queue and a frame clock
//!
//! # Example
//!
//! ```rust
//! use refresher_core::{MainContext, Observable};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let ctx = MainContext::new();
//! let offset = Rc::new(Observable::new(0.0f32));
//! let seen = Rc::new(Cell::new(0.0f32));
//!
//! let seen_clone = seen.clone();
//! offset.subscribe(move |change| seen_clone.set(change.new));
//!
//! let offset_clone = offset.clone();
//! ctx.defer(move || { offset_clone.set(-40.0); });
//! assert_eq!(seen.get(), 0.0);
//!
//! ctx.run_until_idle();
//! assert_eq!(seen.get(), -40.0);
//! ```

pub mod geometry;
pub mod runtime;
pub mod signal;

pub use geometry::{Axis, EdgeInsets, Point, Rect, Size};
pub use runtime::{FrameControl, FrameId, FrameTick, MainContext};
pub use signal::{Change, Observable, SubscriptionId};
