//! Refresher
//!
//! Pull-to-refresh and load-more controllers for scrollable containers.
//!
//! A [`RefreshController`] watches one edge of a [`ScrollContainer`]. As the
//! user drags the edge into view it reports a continuous [`Phase`] to its
//! [`ProgressRenderer`]; once the pull passes the control height and the
//! finger lifts, it pins the control in place by growing the container's
//! inset and invokes the caller's action. When the caller reports completion
//! the inset animates back to rest, sampled frame by frame.
//!
//! - **Leading edge**: pull-to-refresh, commits on release past the threshold
//! - **Trailing edge**: load-more, also triggers as soon as it scrolls into
//!   view and can be marked exhausted with an [`ExhaustedView`]
//!
//! Everything runs on one [`MainContext`](refresher_core::MainContext): the
//! host forwards its vsync to [`MainContext::tick_frame`](refresher_core::MainContext::tick_frame),
//! and `begin_refreshing`/`end_refreshing` take effect on its next turn.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use refresher::prelude::*;
//! use refresher_core::{MainContext, Size};
//!
//! let ctx = MainContext::new();
//! let view = Rc::new(ScrollView::new(Size::new(320.0, 600.0), Size::new(320.0, 400.0)));
//! let mut registry = RefresherRegistry::new(&ctx);
//!
//! let more = registry.attach_trailing(
//!     &view,
//!     ControllerConfig::builder(|controller| controller.end_refreshing_exhausted())
//!         .height(60.0)
//!         .build()
//!         .unwrap(),
//! );
//!
//! more.begin_refreshing();
//! ctx.advance(Duration::from_secs(1));
//!
//! assert!(!more.is_enabled());
//! assert!(more.exhausted_view().is_some());
//! assert_eq!(view.content_inset().bottom, 60.0);
//! ```

pub mod config;
pub mod container;
pub mod controller;
pub mod edge;
pub mod error;
pub mod exhausted;
pub mod phase;
pub mod registry;
pub mod renderer;
pub mod scroll_view;

pub use config::{CompatFlags, ControllerConfig, ControllerConfigBuilder, RefreshAction, RefreshTuning};
pub use container::{ContainerId, GestureState, ScrollContainer, SignalKind, Subscription};
pub use controller::RefreshController;
pub use edge::{Edge, EdgeGeometry};
pub use error::ConfigError;
pub use exhausted::{Appearance, ExhaustedView};
pub use phase::{Phase, PhaseTag};
pub use registry::RefresherRegistry;
pub use renderer::{ActivityIndicator, ArcIndicator, NullRenderer, ProgressRenderer};
pub use scroll_view::ScrollView;

/// Common imports for embedding a controller
pub mod prelude {
    pub use crate::config::{ControllerConfig, RefreshTuning};
    pub use crate::container::{GestureState, ScrollContainer};
    pub use crate::controller::RefreshController;
    pub use crate::edge::Edge;
    pub use crate::exhausted::ExhaustedView;
    pub use crate::phase::Phase;
    pub use crate::registry::RefresherRegistry;
    pub use crate::renderer::{ActivityIndicator, ArcIndicator, ProgressRenderer};
    pub use crate::scroll_view::ScrollView;
}
