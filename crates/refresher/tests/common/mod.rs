//! Shared fixtures for the controller integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use refresher::{
    ControllerConfig, Edge, Phase, PhaseTag, ProgressRenderer, RefreshController, RefreshTuning,
    ScrollView,
};
use refresher_core::{EdgeInsets, MainContext, Size};
use tracing_subscriber::EnvFilter;

pub const VIEWPORT: Size = Size::new(320.0, 600.0);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Renderer that records every phase it is shown
#[derive(Clone, Default)]
pub struct PhaseLog(Rc<RefCell<Vec<Phase>>>);

impl PhaseLog {
    pub fn phases(&self) -> Vec<Phase> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Tags with consecutive repeats collapsed
    pub fn tags(&self) -> Vec<PhaseTag> {
        let mut tags: Vec<PhaseTag> = Vec::new();
        for phase in self.0.borrow().iter() {
            if tags.last() != Some(&phase.tag()) {
                tags.push(phase.tag());
            }
        }
        tags
    }

    pub fn settling_progress(&self) -> Vec<f32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|phase| match phase {
                Phase::Settling { progress } => Some(*progress),
                _ => None,
            })
            .collect()
    }
}

impl ProgressRenderer for PhaseLog {
    fn on_phase_changed(&mut self, phase: Phase) {
        self.0.borrow_mut().push(phase);
    }
}

/// A scroll view with one controller attached, driven by a synthetic clock
pub struct Harness {
    pub ctx: MainContext,
    pub view: Rc<ScrollView>,
    pub controller: RefreshController,
    pub log: PhaseLog,
    pub actions: Rc<Cell<u32>>,
}

impl Harness {
    pub fn new(edge: Edge, tuning: RefreshTuning, content: f32, inset: EdgeInsets) -> Self {
        init_tracing();

        let ctx = MainContext::new();
        let view = Rc::new(
            ScrollView::new(VIEWPORT, Size::new(VIEWPORT.width, content)).with_inset(inset),
        );
        let log = PhaseLog::default();
        let actions = Rc::new(Cell::new(0));

        let actions_clone = actions.clone();
        let config = ControllerConfig::builder(move |_| actions_clone.set(actions_clone.get() + 1))
            .tuning(tuning)
            .edge(edge)
            .renderer(log.clone())
            .build()
            .unwrap();
        let controller = RefreshController::new(&ctx, config);
        controller.attach(&view);

        Self {
            ctx,
            view,
            controller,
            log,
            actions,
        }
    }

    pub fn leading(height: f32) -> Self {
        Self::new(Edge::Leading, tuning(height), 2000.0, EdgeInsets::ZERO)
    }

    pub fn trailing(height: f32, content: f32) -> Self {
        Self::new(Edge::Trailing, tuning(height), content, EdgeInsets::ZERO)
    }

    /// Drag through `offsets` along the vertical axis, finger still down
    pub fn drag(&self, offsets: impl IntoIterator<Item = f32>) {
        self.view.begin_drag();
        for offset in offsets {
            self.view.drag_to_y(offset);
        }
    }

    /// Long enough for any expand or settle animation to finish
    pub fn run_animations(&self) {
        self.ctx.advance(Duration::from_secs(1));
    }

    pub fn run_for(&self, millis: u64) {
        self.ctx.advance(Duration::from_millis(millis));
    }
}

pub fn tuning(height: f32) -> RefreshTuning {
    RefreshTuning {
        height,
        ..RefreshTuning::default()
    }
}

/// `from` to `to` inclusive, in steps of `step`
pub fn steps(from: f32, to: f32, step: f32) -> Vec<f32> {
    let count = ((to - from) / step).abs().round() as usize;
    let sign = if to >= from { 1.0 } else { -1.0 };
    (0..=count).map(|i| from + sign * step * i as f32).collect()
}

pub fn assert_monotonic(values: &[f32]) {
    for pair in values.windows(2) {
        assert!(pair[1] + 1e-6 >= pair[0], "not monotonic: {:?}", values);
    }
}
