//! Exhausted ("no more data") view
//!
//! A trailing controller can be told that there is nothing left to load.
//! It then shows an [`ExhaustedView`] in place of its renderer, stops
//! responding to pulls, and keeps the view's extent reserved in the
//! container's trailing inset until it is re-enabled.

/// Placeholder shown below the content once loading is exhausted
#[derive(Debug, Clone, PartialEq)]
pub struct ExhaustedView {
    extent: f32,
    label: Option<String>,
    alpha: f32,
}

impl ExhaustedView {
    /// A view `extent` long along the scroll axis
    ///
    /// Zero or negative extents are replaced by the control height on
    /// install.
    pub fn new(extent: f32) -> Self {
        Self {
            extent,
            label: None,
            alpha: 1.0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(crate) fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Extent actually reserved when installed on a control of `height`
    pub fn resolved_extent(&self, height: f32) -> f32 {
        if self.extent > 0.0 {
            self.extent
        } else {
            height
        }
    }
}

impl Default for ExhaustedView {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Visibility of the controller's own chrome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub renderer_alpha: f32,
    pub renderer_hidden: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            renderer_alpha: 1.0,
            renderer_hidden: false,
        }
    }
}
