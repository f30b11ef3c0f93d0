//! Refresh phases
//!
//! The controller's state is a [`Phase`]. Guards in the transition logic
//! compare only the [`PhaseTag`] (two `Pulling` values are the same phase),
//! while the renderer is told about every payload change. Derived
//! `PartialEq` on `Phase` compares payloads too and is what suppresses
//! duplicate notifications.
//!
//! ```text
//!  Idle ──drag──▶ Pulling(p) ──excess > height──▶ Committed(d)
//!   ▲               │  ▲                              │
//!   │           release └──────excess ≤ height───────┘
//!   │               ▼                                  │ release
//!   └──────────── Idle                                 ▼
//!   └─── Settling(p) ◀──────end_refreshing────────── Active
//! ```

use std::fmt;

/// Controller state, with the payload the renderer draws from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// The control is partially exposed; `progress` is in `[0, 1]`
    Pulling { progress: f32 },
    /// Dragged past the commit threshold by `over_pull`; releasing triggers
    Committed { over_pull: f32 },
    /// The caller's action is running
    Active,
    /// Inset is animating back to rest; `progress` is in `[0, 1]`
    Settling { progress: f32 },
}

/// Payload-free discriminant of a [`Phase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTag {
    Idle,
    Pulling,
    Committed,
    Active,
    Settling,
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Phase {
    pub fn pulling(progress: f32) -> Self {
        Phase::Pulling {
            progress: clamp_unit(progress),
        }
    }

    pub fn committed(over_pull: f32) -> Self {
        let over_pull = if over_pull.is_nan() { 0.0 } else { over_pull.max(0.0) };
        Phase::Committed { over_pull }
    }

    pub fn settling(progress: f32) -> Self {
        Phase::Settling {
            progress: clamp_unit(progress),
        }
    }

    pub fn tag(&self) -> PhaseTag {
        match self {
            Phase::Idle => PhaseTag::Idle,
            Phase::Pulling { .. } => PhaseTag::Pulling,
            Phase::Committed { .. } => PhaseTag::Committed,
            Phase::Active => PhaseTag::Active,
            Phase::Settling { .. } => PhaseTag::Settling,
        }
    }

    /// Guard equality: same phase regardless of payload
    pub fn same_tag(&self, other: &Phase) -> bool {
        self.tag() == other.tag()
    }

    /// Same tag and same payload
    pub fn is_identical(&self, other: &Phase) -> bool {
        self == other
    }

    pub fn is(&self, tag: PhaseTag) -> bool {
        self.tag() == tag
    }

    /// A drag or refresh cycle is in progress
    pub fn is_in_cycle(&self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Pulling { progress } => write!(f, "pulling({:.3})", progress),
            Phase::Committed { over_pull } => write!(f, "committed({:.1})", over_pull),
            Phase::Active => write!(f, "active"),
            Phase::Settling { progress } => write!(f, "settling({:.3})", progress),
        }
    }
}
