//! Pause, resume, visibility handling, and the breath guide.
//!
//! Pausing is a visual and temporal freeze: the pause clock stops
//! accruing narrative time, motion tasks self-terminate, and every
//! guarded callback that comes due is skipped. Resuming thaws the
//! clock (crediting the pause against future deadlines) and restarts
//! motion for actors still flagged active.
//!
//! Visibility loss pauses the scene but remembers whether the user had
//! already paused manually, so becoming visible again only resumes a
//! scene the user wanted running.

use std::sync::Arc;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::schema::BreathConfig;
use crate::observability::metrics;
use crate::render::{Actor, Animation, RenderOp, Renderer};
use crate::scene::{PauseClock, SceneState};
use crate::timeline::MotionDirector;

/// A started breath-guide session.
#[derive(Debug, Clone, Copy)]
pub struct BreathSession {
    /// When the session began.
    pub started_at: Instant,
    /// Length of one inhale/exhale cycle.
    pub cycle: std::time::Duration,
    /// Number of cycles in the session.
    pub cycles: u32,
}

impl BreathSession {
    /// Total session length.
    #[must_use]
    pub fn total(&self) -> std::time::Duration {
        self.cycle * self.cycles
    }
}

/// Owns the pause state transitions.
pub struct PauseController {
    scene: Arc<SceneState>,
    clock: Arc<PauseClock>,
    motion: Arc<MotionDirector>,
    renderer: Arc<dyn Renderer>,
    breath: BreathConfig,
    cancel: CancellationToken,
}

impl PauseController {
    #[must_use]
    pub fn new(
        scene: Arc<SceneState>,
        clock: Arc<PauseClock>,
        motion: Arc<MotionDirector>,
        renderer: Arc<dyn Renderer>,
        breath: BreathConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            scene,
            clock,
            motion,
            renderer,
            breath,
            cancel,
        }
    }

    /// Pauses the scene. Idempotent.
    pub fn pause(&self) {
        if self.scene.swap_paused(true) {
            return;
        }
        self.clock.freeze();
        self.renderer
            .apply(RenderOp::SetPausedVisuals { paused: true });
        info!("scene paused");
    }

    /// Resumes the scene. Idempotent.
    pub fn resume(&self) {
        if !self.scene.swap_paused(false) {
            return;
        }
        self.clock.thaw();
        self.renderer
            .apply(RenderOp::SetPausedVisuals { paused: false });
        self.motion.restart_active();
        info!("scene resumed");
    }

    /// Toggles between paused and running.
    pub fn toggle(&self) {
        if self.scene.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Reacts to the host's visibility changing.
    ///
    /// Hiding always pauses but records whether the pause predated the
    /// visibility loss; showing resumes only when it did not.
    pub fn visibility_changed(&self, hidden: bool) {
        if hidden {
            self.scene
                .set_was_paused_by_visibility(self.scene.is_paused());
            debug!("host hidden, pausing");
            self.pause();
        } else if self.scene.was_paused_by_visibility() {
            debug!("host visible, user pause preserved");
        } else {
            debug!("host visible, resuming");
            self.resume();
        }
    }

    /// Starts a breath-guide session if none is running.
    ///
    /// The session runs to its full length on wall time, unaffected by
    /// pauses, then tears itself down.
    pub fn start_breath_guide(&self) -> Option<BreathSession> {
        if !self.scene.try_activate_breath_guide() {
            debug!("breath guide already active");
            return None;
        }

        let session = BreathSession {
            started_at: Instant::now(),
            cycle: self.breath.cycle,
            cycles: self.breath.cycles,
        };
        info!(
            cycles = session.cycles,
            total_ms = session.total().as_millis() as u64,
            "breath guide started"
        );
        metrics::record_breath_session();
        self.renderer.apply(RenderOp::ShowBreathOverlay);
        self.renderer.apply(RenderOp::PlayAnimation {
            actor: Actor::Figure,
            animation: Animation::FigureBreath,
        });

        let scene = Arc::clone(&self.scene);
        let renderer = Arc::clone(&self.renderer);
        let cancel = self.cancel.clone();
        let total = session.total();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => return,
                () = time::sleep(total) => {}
            }
            scene.deactivate_breath_guide();
            renderer.apply(RenderOp::HideBreathOverlay);
            renderer.apply(RenderOp::PlayAnimation {
                actor: Actor::Figure,
                animation: Animation::Stop,
            });
            info!("breath guide complete");
        });

        Some(session)
    }
}

impl std::fmt::Debug for PauseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PauseController")
            .field("paused", &self.scene.is_paused())
            .finish_non_exhaustive()
    }
}
