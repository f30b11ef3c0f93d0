//! Attachment, detachment and programmatic control

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{tuning, Harness, PhaseLog, VIEWPORT};
use pretty_assertions::assert_eq;
use refresher::{
    ControllerConfig, Edge, Phase, PhaseTag, RefreshController, RefreshTuning,
    RefresherRegistry, ScrollContainer, ScrollView,
};
use refresher_core::{Change, EdgeInsets, MainContext, Point, Size};

fn scroll_view() -> Rc<ScrollView> {
    Rc::new(ScrollView::new(VIEWPORT, Size::new(320.0, 2000.0)))
}

#[test]
fn test_begin_twice_runs_action_once() {
    let h = Harness::leading(60.0);
    h.controller.begin_refreshing();
    h.controller.begin_refreshing();
    h.ctx.run_until_idle();
    assert!(h.controller.is_refreshing());

    h.run_for(300);
    h.controller.begin_refreshing();
    h.run_for(300);

    assert!(h.controller.is_refreshing());
    assert_eq!(h.actions.get(), 1);
    assert_eq!(h.log.phases(), vec![Phase::pulling(1.0), Phase::Active]);
    assert_eq!(h.view.content_inset().top, 60.0);
}

#[test]
fn test_begin_while_disabled_is_noop() {
    let h = Harness::leading(60.0);
    h.controller.set_enabled(false);
    h.controller.begin_refreshing();
    h.run_animations();

    assert_eq!(h.controller.phase(), Phase::Idle);
    assert_eq!(h.actions.get(), 0);
}

#[test]
fn test_begin_while_settling_starts_fresh_cycle() {
    let h = Harness::leading(60.0);
    h.drag([-80.0]);
    h.view.end_drag();
    h.run_for(300);
    h.controller.end_refreshing();
    h.run_for(100);
    assert!(h.controller.phase().is(PhaseTag::Settling));

    h.log.clear();
    h.controller.begin_refreshing();
    h.ctx.run_until_idle();
    assert_eq!(
        h.log.tags(),
        vec![PhaseTag::Settling, PhaseTag::Idle, PhaseTag::Pulling, PhaseTag::Active]
    );

    h.run_for(300);
    assert_eq!(h.view.content_inset().top, 60.0);
    assert_eq!(h.actions.get(), 2);
}

#[test]
fn test_end_refreshing_from_inside_action() {
    let ctx = MainContext::new();
    let view = scroll_view();
    let log = PhaseLog::default();
    let config = ControllerConfig::builder(|controller: &RefreshController| {
        controller.end_refreshing()
    })
    .height(60.0)
    .renderer(log.clone())
    .build()
    .unwrap();
    let controller = RefreshController::new(&ctx, config);
    controller.attach(&view);

    view.begin_drag();
    view.drag_to_y(-80.0);
    view.end_drag();
    ctx.advance(std::time::Duration::from_secs(1));

    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(log.tags().last(), Some(&PhaseTag::Idle));
    assert_eq!(view.content_inset(), EdgeInsets::ZERO);
}

#[test]
fn test_host_observer_can_query_controller_during_animation() {
    let h = Harness::leading(60.0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let controller = h.controller.clone();
    let seen_clone = seen.clone();
    h.view.observe_offset(Box::new(move |change: &Change<Point>| {
        let _ = (controller.is_enabled(), controller.frame(), controller.exhausted_view());
        seen_clone
            .borrow_mut()
            .push((change.new.y, controller.phase().tag(), controller.is_refreshing()));
    }));

    h.drag([-80.0]);
    h.view.end_drag();
    h.run_for(300);
    assert_eq!(h.actions.get(), 1);
    assert_eq!(h.view.content_offset().y, -60.0);

    h.controller.end_refreshing();
    h.run_animations();
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert_eq!(h.view.content_offset().y, 0.0);

    let seen = seen.borrow();
    // Offset writes made by the expand animation itself
    assert!(seen
        .iter()
        .any(|&(y, tag, refreshing)| y > -80.0 && y < -60.0 && tag == PhaseTag::Active && refreshing));
    // Offset clamps made while the inset shrinks back
    assert!(seen
        .iter()
        .any(|&(_, tag, refreshing)| tag == PhaseTag::Settling && !refreshing));
}

#[test]
fn test_detach_mid_settle_stops_everything() {
    let h = Harness::leading(60.0);
    h.drag([-80.0]);
    h.view.end_drag();
    h.run_for(300);
    h.controller.end_refreshing();
    h.run_for(100);
    assert!(h.controller.phase().is(PhaseTag::Settling));

    let seen = h.log.len();
    h.controller.detach();

    assert_eq!(h.ctx.active_frame_callbacks(), 0);
    assert_eq!(h.view.observer_count(), 0);
    assert!(!h.controller.is_attached());
    assert_eq!(h.view.content_inset().top.to_bits(), 0.0f32.to_bits());

    h.run_animations();
    h.drag([-30.0, -90.0]);
    h.view.end_drag();
    h.view.set_content_size(Size::new(320.0, 100.0));
    h.run_animations();

    assert_eq!(h.log.len(), seen);
    assert_eq!(h.controller.phase(), Phase::Idle);
}

#[test]
fn test_detach_mid_expand_restores_inset() {
    let h = Harness::leading(60.0);
    h.drag([-80.0]);
    h.view.end_drag();
    h.run_for(100);
    assert!(h.view.content_inset().top > 0.0);

    h.controller.detach();
    h.run_animations();
    assert_eq!(h.view.content_inset(), EdgeInsets::ZERO);
    assert_eq!(h.actions.get(), 0);
}

#[test]
fn test_reattach_moves_subscriptions() {
    let h = Harness::leading(60.0);
    let other = scroll_view();
    h.controller.attach(&other);

    assert_eq!(h.view.observer_count(), 0);
    assert_eq!(other.observer_count(), 3);

    h.drag([-30.0]);
    assert!(h.log.phases().is_empty());

    other.begin_drag();
    other.drag_to_y(-30.0);
    assert_eq!(h.log.phases(), vec![Phase::pulling(0.5)]);
}

#[test]
fn test_attach_twice_does_not_leak_observers() {
    let h = Harness::leading(60.0);
    h.controller.attach(&h.view);
    h.controller.attach(&h.view);
    assert_eq!(h.view.observer_count(), 3);
}

#[test]
fn test_controller_does_not_keep_container_alive() {
    let h = Harness::leading(60.0);
    let Harness {
        view, controller, ..
    } = h;
    let weak = Rc::downgrade(&view);
    drop(view);

    assert!(weak.upgrade().is_none());
    assert!(!controller.is_attached());
    controller.begin_refreshing();
}

#[test]
fn test_registry_eviction_is_silent() {
    let ctx = MainContext::new();
    let view = scroll_view();
    let mut registry = RefresherRegistry::new(&ctx);

    let first_log = PhaseLog::default();
    let first = registry.attach_leading(
        &view,
        ControllerConfig::builder(|_| {})
            .height(60.0)
            .renderer(first_log.clone())
            .build()
            .unwrap(),
    );

    view.begin_drag();
    view.drag_to_y(-30.0);
    assert_eq!(first_log.phases(), vec![Phase::pulling(0.5)]);

    let second_log = PhaseLog::default();
    let second = registry.attach_leading(
        &view,
        ControllerConfig::builder(|_| {})
            .height(60.0)
            .renderer(second_log.clone())
            .build()
            .unwrap(),
    );

    // The evicted controller hears nothing more, not even Idle
    assert_eq!(first_log.phases(), vec![Phase::pulling(0.5)]);
    assert!(!first.is_attached());
    assert_eq!(first.phase(), Phase::Idle);

    view.drag_to_y(-45.0);
    assert_eq!(second_log.phases(), vec![Phase::pulling(0.75)]);
    assert_eq!(first_log.len(), 1);

    assert!(registry.leading(&*view).unwrap().ptr_eq(&second));
    assert_eq!(view.observer_count(), 3);
}

#[test]
fn test_registry_edges_are_independent() {
    let ctx = MainContext::new();
    let view = scroll_view();
    let mut registry = RefresherRegistry::new(&ctx);

    let leading = registry.attach_leading(&view, ControllerConfig::builder(|_| {}).build().unwrap());
    // The builder's edge is overridden by the slot
    let trailing = registry.attach_trailing(
        &view,
        ControllerConfig::builder(|_| {})
            .edge(Edge::Leading)
            .build()
            .unwrap(),
    );

    assert_eq!(leading.edge(), Edge::Leading);
    assert_eq!(trailing.edge(), Edge::Trailing);
    assert_eq!(registry.len(), 2);
    assert_eq!(view.observer_count(), 6);

    let removed = registry.detach(&*view, Edge::Leading).unwrap();
    assert!(removed.ptr_eq(&leading));
    assert!(!leading.is_attached());
    assert!(trailing.is_attached());

    registry.detach_all(&*view);
    assert!(registry.is_empty());
    assert_eq!(view.observer_count(), 0);
}

#[test]
fn test_tuning_from_toml() {
    let tuning = RefreshTuning::from_toml_str(
        r#"
        height = 40.0
        expand_ms = 0
        settle_ms = 0
        easing = "linear"
        "#,
    )
    .unwrap();
    let h = Harness::new(Edge::Leading, tuning, 2000.0, EdgeInsets::ZERO);

    h.drag([-50.0]);
    assert_eq!(h.controller.phase(), Phase::committed(10.0));
    h.view.end_drag();
    h.ctx.tick_frame(16.0);
    assert_eq!(h.actions.get(), 1);
    assert_eq!(h.view.content_inset().top, 40.0);

    h.log.clear();
    h.controller.end_refreshing();
    h.ctx.tick_frame(16.0);
    assert_eq!(
        h.log.phases(),
        vec![Phase::settling(0.0), Phase::settling(1.0), Phase::Idle]
    );
    assert_eq!(h.view.content_inset(), EdgeInsets::ZERO);
}

#[test]
fn test_default_tuning_height() {
    let h = Harness::new(Edge::Leading, RefreshTuning::default(), 2000.0, EdgeInsets::ZERO);
    assert_eq!(h.controller.height(), 52.0);
    assert_eq!(tuning(60.0).height, 60.0);
}
