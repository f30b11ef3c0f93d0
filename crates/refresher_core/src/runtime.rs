//! Main execution context
//!
//! Everything the refresh controller does happens on one cooperative UI
//! context: signal handlers, deferred state changes and per-frame animation
//! callbacks. `MainContext` models that context explicitly:
//!
//! - a FIFO of deferred tasks, drained one *turn* at a time, so work queued
//!   from inside a call stack runs only after that stack has unwound
//! - a frame clock with per-frame subscriptions (the display-link bridge used
//!   to sample in-flight animations)
//!
//! The host drives it: a platform integration calls [`MainContext::tick_frame`]
//! from its vsync callback, tests call [`MainContext::advance`] with a
//! synthetic clock.
//!
//! `MainContext` is a cheap `Rc` handle and is intentionally `!Send`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifier of a per-frame subscription
    pub struct FrameId;
}

/// Upper bound on turns drained by a single `run_until_idle` call
const MAX_TURNS: usize = 10_000;

/// Timing information passed to frame callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Time since the previous frame in milliseconds
    pub dt_ms: f32,
    /// Time since the context was created in milliseconds
    pub elapsed_ms: f64,
    /// Monotonic frame counter
    pub frame: u64,
}

/// Returned by frame callbacks to keep or drop their subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

type Task = Box<dyn FnOnce()>;
type FrameCallback = Rc<RefCell<dyn FnMut(FrameTick) -> FrameControl>>;

struct ContextState {
    tasks: VecDeque<Task>,
    frames: SlotMap<FrameId, FrameCallback>,
    elapsed_ms: f64,
    frame_count: u64,
    target_fps: u32,
}

/// Handle to the single UI execution context
#[derive(Clone)]
pub struct MainContext {
    state: Rc<RefCell<ContextState>>,
}

impl MainContext {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ContextState {
                tasks: VecDeque::new(),
                frames: SlotMap::with_key(),
                elapsed_ms: 0.0,
                frame_count: 0,
                target_fps: 60,
            })),
        }
    }

    pub fn set_target_fps(&self, fps: u32) {
        self.state.borrow_mut().target_fps = fps.max(1);
    }

    /// Frame interval used by [`advance`](Self::advance), in milliseconds
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.state.borrow().target_fps as f64
    }

    /// Milliseconds of frame time driven so far
    pub fn elapsed_ms(&self) -> f64 {
        self.state.borrow().elapsed_ms
    }

    // =========================================================================
    // Deferred tasks
    // =========================================================================

    /// Queue a task for the next turn of the context
    pub fn defer<F: FnOnce() + 'static>(&self, task: F) {
        self.state.borrow_mut().tasks.push_back(Box::new(task));
    }

    /// Number of queued tasks
    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Run one turn: the tasks that were queued when the turn started
    ///
    /// Tasks deferred while the turn runs are left for the next turn.
    pub fn run_turn(&self) -> usize {
        let queued = self.state.borrow().tasks.len();
        let mut ran = 0;
        for _ in 0..queued {
            let task = self.state.borrow_mut().tasks.pop_front();
            let Some(task) = task else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    /// Run turns until no tasks remain
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        for _ in 0..MAX_TURNS {
            let ran = self.run_turn();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
        tracing::warn!(
            "MainContext: still {} tasks queued after {} turns",
            self.pending_tasks(),
            MAX_TURNS
        );
        total
    }

    // =========================================================================
    // Frame clock
    // =========================================================================

    /// Subscribe a callback to every frame until it returns `Stop` or is cancelled
    pub fn request_frames<F>(&self, callback: F) -> FrameId
    where
        F: FnMut(FrameTick) -> FrameControl + 'static,
    {
        let callback: FrameCallback = Rc::new(RefCell::new(callback));
        self.state.borrow_mut().frames.insert(callback)
    }

    /// Cancel a frame subscription. Returns `false` if it was not live.
    pub fn cancel_frames(&self, id: FrameId) -> bool {
        self.state.borrow_mut().frames.remove(id).is_some()
    }

    pub fn is_frame_active(&self, id: FrameId) -> bool {
        self.state.borrow().frames.contains_key(id)
    }

    /// Number of live frame subscriptions
    pub fn active_frame_callbacks(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// Drive a single frame of `dt_ms` milliseconds
    ///
    /// Pending tasks are drained before and after the frame callbacks run.
    pub fn tick_frame(&self, dt_ms: f32) {
        self.run_until_idle();

        let (tick, snapshot) = {
            let mut state = self.state.borrow_mut();
            state.elapsed_ms += dt_ms as f64;
            state.frame_count += 1;
            let tick = FrameTick {
                dt_ms,
                elapsed_ms: state.elapsed_ms,
                frame: state.frame_count,
            };
            let snapshot: Vec<(FrameId, FrameCallback)> = state
                .frames
                .iter()
                .map(|(id, callback)| (id, callback.clone()))
                .collect();
            (tick, snapshot)
        };

        for (id, callback) in snapshot {
            // Cancelled by an earlier callback this frame
            if !self.is_frame_active(id) {
                continue;
            }
            let control = match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(tick),
                Err(_) => FrameControl::Continue,
            };
            if control == FrameControl::Stop {
                self.cancel_frames(id);
            }
        }

        self.run_until_idle();
    }

    /// Drive frames at the target frame rate until `duration` has elapsed
    pub fn advance(&self, duration: Duration) {
        let interval = self.frame_interval_ms();
        let mut remaining = duration.as_secs_f64() * 1000.0;
        while remaining > 1e-6 {
            let dt = remaining.min(interval);
            self.tick_frame(dt as f32);
            remaining -= dt;
        }
    }
}

impl Default for MainContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MainContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MainContext")
            .field("pending_tasks", &state.tasks.len())
            .field("frame_callbacks", &state.frames.len())
            .field("elapsed_ms", &state.elapsed_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_deferred_task_runs_on_next_turn() {
        let ctx = MainContext::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let (ctx_clone, order_clone) = (ctx.clone(), order.clone());
        ctx.defer(move || {
            order_clone.borrow_mut().push("first");
            let order_inner = order_clone.clone();
            ctx_clone.defer(move || order_inner.borrow_mut().push("nested"));
        });
        let order_clone = order.clone();
        ctx.defer(move || order_clone.borrow_mut().push("second"));

        assert_eq!(ctx.run_turn(), 2);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(ctx.pending_tasks(), 1);

        assert_eq!(ctx.run_until_idle(), 1);
        assert_eq!(*order.borrow(), vec!["first", "second", "nested"]);
    }

    #[test]
    fn test_frame_callback_stops() {
        let ctx = MainContext::new();
        let frames = Rc::new(Cell::new(0));

        let frames_clone = frames.clone();
        let id = ctx.request_frames(move |_| {
            frames_clone.set(frames_clone.get() + 1);
            if frames_clone.get() == 3 {
                FrameControl::Stop
            } else {
                FrameControl::Continue
            }
        });

        for _ in 0..5 {
            ctx.tick_frame(16.0);
        }
        assert_eq!(frames.get(), 3);
        assert!(!ctx.is_frame_active(id));
        assert_eq!(ctx.active_frame_callbacks(), 0);
    }

    #[test]
    fn test_cancel_takes_effect_within_same_frame() {
        let ctx = MainContext::new();
        let victim_calls = Rc::new(Cell::new(0));
        let victim_id = Rc::new(Cell::new(None));

        let (ctx_clone, victim_id_clone) = (ctx.clone(), victim_id.clone());
        ctx.request_frames(move |_| {
            if let Some(id) = victim_id_clone.get() {
                ctx_clone.cancel_frames(id);
            }
            FrameControl::Continue
        });
        let victim_clone = victim_calls.clone();
        let id = ctx.request_frames(move |_| {
            victim_clone.set(victim_clone.get() + 1);
            FrameControl::Continue
        });
        victim_id.set(Some(id));

        ctx.tick_frame(16.0);
        assert_eq!(victim_calls.get(), 0);
        assert_eq!(ctx.active_frame_callbacks(), 1);
    }

    #[test]
    fn test_advance_uses_frame_interval() {
        let ctx = MainContext::new();
        let ticks = Rc::new(RefCell::new(Vec::new()));

        let ticks_clone = ticks.clone();
        ctx.request_frames(move |tick| {
            ticks_clone.borrow_mut().push(tick);
            FrameControl::Continue
        });

        ctx.advance(Duration::from_millis(100));

        let ticks = ticks.borrow();
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0].frame, 1);
        assert!((ctx.elapsed_ms() - 100.0).abs() < 1e-3);
    }
}
