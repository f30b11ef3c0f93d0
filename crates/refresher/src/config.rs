//! Controller configuration
//!
//! [`RefreshTuning`] holds the plain-data knobs and can be loaded from TOML.
//! [`ControllerConfig`] adds what cannot be serialized (the action, the
//! renderer) and is assembled with a builder whose `build` validates
//! everything up front:
//!
//! ```rust
//! use refresher::{ArcIndicator, ControllerConfig, Edge};
//!
//! let config = ControllerConfig::builder(|controller| {
//!     // start the network request, call end_refreshing when it lands
//!     let _ = controller;
//! })
//! .height(60.0)
//! .edge(Edge::Trailing)
//! .renderer(ArcIndicator::default())
//! .build()
//! .unwrap();
//!
//! assert_eq!(config.tuning().height, 60.0);
//! ```

use std::fmt;
use std::rc::Rc;

use refresher_animation::Easing;
use refresher_core::Axis;
use serde::{Deserialize, Serialize};

use crate::controller::RefreshController;
use crate::edge::Edge;
use crate::error::ConfigError;
use crate::exhausted::ExhaustedView;
use crate::renderer::{ActivityIndicator, ProgressRenderer};

/// Callback invoked once a refresh cycle becomes active
pub type RefreshAction = Rc<dyn Fn(&RefreshController)>;

/// Opt-ins for behavior that differs from the long-standing default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatFlags {
    /// Run the expand animation for `begin_refreshing` on the trailing edge
    ///
    /// Off by default: a programmatic load-more invokes the action at once
    /// and leaves the inset alone.
    pub programmatic_trailing_choreography: bool,
}

/// Serializable tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshTuning {
    /// Control extent along the scroll axis; also the commit threshold
    pub height: f32,
    pub axis: Axis,
    /// Inset expansion when a cycle starts
    pub expand_ms: u32,
    /// Inset return when a cycle ends
    pub settle_ms: u32,
    /// Exhausted view cross-fade
    pub fade_ms: u32,
    pub easing: Easing,
    /// Trailing edge starts loading as soon as it is scrolled into view
    pub trailing_auto_trigger: bool,
    pub compat: CompatFlags,
}

impl RefreshTuning {
    pub const DEFAULT_HEIGHT: f32 = 52.0;

    /// Parse and validate tuning from a TOML document
    ///
    /// Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: RefreshTuning = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ConfigError::InvalidHeight(self.height));
        }
        Ok(())
    }
}

impl Default for RefreshTuning {
    fn default() -> Self {
        Self {
            height: Self::DEFAULT_HEIGHT,
            axis: Axis::Vertical,
            expand_ms: 250,
            settle_ms: 350,
            fade_ms: 100,
            easing: Easing::default(),
            trailing_auto_trigger: true,
            compat: CompatFlags::default(),
        }
    }
}

// ============================================================================
// Controller config
// ============================================================================

/// Everything a [`RefreshController`] is constructed from
pub struct ControllerConfig {
    pub(crate) tuning: RefreshTuning,
    pub(crate) edge: Edge,
    pub(crate) action: RefreshAction,
    pub(crate) renderer: Box<dyn ProgressRenderer>,
    pub(crate) exhausted_view: Option<ExhaustedView>,
}

impl ControllerConfig {
    pub fn builder<F>(action: F) -> ControllerConfigBuilder
    where
        F: Fn(&RefreshController) + 'static,
    {
        ControllerConfigBuilder {
            tuning: RefreshTuning::default(),
            edge: Edge::Leading,
            action: Rc::new(action),
            renderer: None,
            exhausted_view: None,
        }
    }

    pub fn tuning(&self) -> &RefreshTuning {
        &self.tuning
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Same config, attached at `edge`
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edge = edge;
        self
    }
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("tuning", &self.tuning)
            .field("edge", &self.edge)
            .field("exhausted_view", &self.exhausted_view)
            .finish_non_exhaustive()
    }
}

pub struct ControllerConfigBuilder {
    tuning: RefreshTuning,
    edge: Edge,
    action: RefreshAction,
    renderer: Option<Box<dyn ProgressRenderer>>,
    exhausted_view: Option<ExhaustedView>,
}

impl ControllerConfigBuilder {
    pub fn height(mut self, height: f32) -> Self {
        self.tuning.height = height;
        self
    }

    pub fn edge(mut self, edge: Edge) -> Self {
        self.edge = edge;
        self
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.tuning.axis = axis;
        self
    }

    /// Replace all tuning knobs at once
    pub fn tuning(mut self, tuning: RefreshTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn renderer<R: ProgressRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Default view installed by `end_refreshing_exhausted`
    pub fn exhausted_view(mut self, view: ExhaustedView) -> Self {
        self.exhausted_view = Some(view);
        self
    }

    pub fn build(self) -> Result<ControllerConfig, ConfigError> {
        self.tuning.validate()?;
        if let Some(view) = &self.exhausted_view {
            if view.extent().is_infinite() {
                return Err(ConfigError::InvalidExtent(view.extent()));
            }
        }

        Ok(ControllerConfig {
            tuning: self.tuning,
            edge: self.edge,
            action: self.action,
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(ActivityIndicator::new())),
            exhausted_view: self.exhausted_view,
        })
    }
}
