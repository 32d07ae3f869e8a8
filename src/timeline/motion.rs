//! Continuous micro-motion for scene actors.
//!
//! The figure and companion drift on slow sinusoidal paths driven by
//! wall-clock time. Each actor gets at most one frame task: starting an
//! already-active actor is a no-op, and every task carries a generation
//! stamp so that a restart invalidates any straggler from before.
//! Frame tasks self-terminate when the scene pauses; resume restarts
//! the tasks for every actor still flagged active.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::render::{Actor, RenderOp, Renderer};
use crate::scene::{PauseClock, SceneState};

/// Frame cadence for motion updates.
const FRAME_TICK: Duration = Duration::from_millis(16);

/// An actor that carries continuous micro-motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionActor {
    /// The seated figure.
    Figure,
    /// The companion.
    Companion,
}

impl MotionActor {
    const ALL: [Self; 2] = [Self::Figure, Self::Companion];

    const fn render_actor(self) -> Actor {
        match self {
            Self::Figure => Actor::Figure,
            Self::Companion => Actor::Companion,
        }
    }

    const fn profile(self) -> MotionProfile {
        match self {
            Self::Figure => MotionProfile::FIGURE,
            Self::Companion => MotionProfile::COMPANION,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Figure => 0,
            Self::Companion => 1,
        }
    }
}

impl std::fmt::Display for MotionActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Figure => "figure",
            Self::Companion => "companion",
        })
    }
}

/// Sinusoidal drift parameters for one actor.
///
/// Offsets are computed from elapsed milliseconds `t` as
/// `sin(t / x_period + shift) * x_amp` on the horizontal axis and
/// `cos(t / y_period + shift) * y_amp` on the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    /// Horizontal period divisor, in milliseconds.
    pub x_period: f64,
    /// Vertical period divisor, in milliseconds.
    pub y_period: f64,
    /// Horizontal amplitude, in scene pixels.
    pub x_amp: f64,
    /// Vertical amplitude, in scene pixels.
    pub y_amp: f64,
    /// Phase shift, in radians.
    pub shift: f64,
}

impl MotionProfile {
    /// The figure's drift.
    pub const FIGURE: Self = Self {
        x_period: 5000.0,
        y_period: 7000.0,
        x_amp: 3.0,
        y_amp: 2.0,
        shift: 0.0,
    };

    /// The companion's drift, phase-shifted so the pair never moves in
    /// lockstep.
    pub const COMPANION: Self = Self {
        x_period: 6000.0,
        y_period: 8000.0,
        x_amp: 2.0,
        y_amp: 1.5,
        shift: 1.0,
    };

    /// Drift offsets at elapsed time `t_ms`.
    #[must_use]
    pub fn offsets(&self, t_ms: f64) -> (f64, f64) {
        let dx = (t_ms / self.x_period + self.shift).sin() * self.x_amp;
        let dy = (t_ms / self.y_period + self.shift).cos() * self.y_amp;
        (dx, dy)
    }
}

struct MotionSlot {
    active: AtomicBool,
    generation: AtomicU64,
}

impl MotionSlot {
    const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }
}

/// Starts, restarts, and supersedes the per-actor frame tasks.
pub struct MotionDirector {
    scene: Arc<SceneState>,
    clock: Arc<PauseClock>,
    renderer: Arc<dyn Renderer>,
    slots: [MotionSlot; 2],
    cancel: CancellationToken,
}

impl MotionDirector {
    #[must_use]
    pub fn new(
        scene: Arc<SceneState>,
        clock: Arc<PauseClock>,
        renderer: Arc<dyn Renderer>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            scene,
            clock,
            renderer,
            slots: [MotionSlot::new(), MotionSlot::new()],
            cancel,
        }
    }

    /// Whether the actor is flagged for motion.
    #[must_use]
    pub fn is_active(&self, actor: MotionActor) -> bool {
        self.slots[actor.index()].active.load(Ordering::SeqCst)
    }

    /// Flags the actor active and spawns its frame task.
    ///
    /// No-op when the actor is already active; the loop reset leaves
    /// motion flags set, so repeated phase entries never stack tasks.
    pub fn start(self: &Arc<Self>, actor: MotionActor) {
        if self.slots[actor.index()].active.swap(true, Ordering::SeqCst) {
            trace!(%actor, "motion already active");
            return;
        }
        debug!(%actor, "motion started");
        self.spawn_frame_task(actor);
    }

    /// Respawns frame tasks for every actor still flagged active.
    ///
    /// Called on resume, after pause made the old tasks exit.
    pub fn restart_active(self: &Arc<Self>) {
        for actor in MotionActor::ALL {
            if self.is_active(actor) {
                debug!(%actor, "motion restarted");
                self.spawn_frame_task(actor);
            }
        }
    }

    fn spawn_frame_task(self: &Arc<Self>, actor: MotionActor) {
        let slot = &self.slots[actor.index()];
        let generation = slot.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let director = Arc::clone(self);
        let profile = actor.profile();

        tokio::spawn(async move {
            let slot = &director.slots[actor.index()];
            let mut ticker = time::interval(FRAME_TICK);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = director.cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                // A newer task for this actor owns the slot now.
                if slot.generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                if director.scene.is_paused() {
                    trace!(%actor, "motion task exiting on pause");
                    return;
                }
                let t_ms = director.clock.wall_elapsed().as_secs_f64() * 1000.0;
                let (dx, dy) = profile.offsets(t_ms);
                director.renderer.apply(RenderOp::Nudge {
                    actor: actor.render_actor(),
                    dx,
                    dy,
                });
            }
        });
    }
}

impl std::fmt::Debug for MotionDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionDirector")
            .field("figure_active", &self.is_active(MotionActor::Figure))
            .field("companion_active", &self.is_active(MotionActor::Companion))
            .finish_non_exhaustive()
    }
}
