//! Interaction-driven acceleration.
//!
//! A pointer interaction can pull the narrative forward: before the
//! companion arrives it summons the companion early, and once the
//! companion is present it calms the wave early. Both paths reuse the
//! same phase entry actions the scheduler runs, so the scheduled
//! firings later in the loop degrade to no-ops via the one-shot guards.
//!
//! Interactions are debounced against the last accepted interaction;
//! rejected ones produce nothing at all, not even the ripple.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::debug;

use crate::config::schema::InteractionConfig;
use crate::observability::metrics;
use crate::render::{Actor, Animation, RenderOp, Renderer};
use crate::scene::SceneState;
use crate::timeline::actions::WAVE_PULSE_ACK_MS;
use crate::timeline::{PhaseActions, PhaseId, spawn_guarded};

/// What an interaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Rejected by the debounce window; no effect.
    Debounced,
    /// Summoned the companion ahead of schedule.
    AcceleratedArrival,
    /// Calmed the wave ahead of schedule.
    AcceleratedDissolve,
    /// Accepted, but only the ripple feedback applied.
    FeedbackOnly,
}

impl InteractionOutcome {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debounced => "debounced",
            Self::AcceleratedArrival => "accelerated_arrival",
            Self::AcceleratedDissolve => "accelerated_dissolve",
            Self::FeedbackOnly => "feedback_only",
        }
    }
}

/// Applies interactions to the scene.
pub struct InteractionAccelerator {
    scene: Arc<SceneState>,
    actions: Arc<PhaseActions>,
    renderer: Arc<dyn Renderer>,
    config: InteractionConfig,
}

impl InteractionAccelerator {
    #[must_use]
    pub fn new(
        scene: Arc<SceneState>,
        actions: Arc<PhaseActions>,
        renderer: Arc<dyn Renderer>,
        config: InteractionConfig,
    ) -> Self {
        Self {
            scene,
            actions,
            renderer,
            config,
        }
    }

    /// Handles an interaction at scene coordinates, stamped now.
    pub fn handle(&self, x: f64, y: f64) -> InteractionOutcome {
        self.handle_at(x, y, Instant::now())
    }

    /// Handles an interaction with an explicit timestamp.
    pub fn handle_at(&self, x: f64, y: f64, now: Instant) -> InteractionOutcome {
        if !self.scene.try_accept_interaction(now, self.config.debounce) {
            debug!("interaction debounced");
            metrics::record_interaction(InteractionOutcome::Debounced.label());
            return InteractionOutcome::Debounced;
        }

        self.renderer.apply(RenderOp::ShowRipple { x, y });

        let outcome = if !self.scene.companion_arrived()
            && self.scene.phase_index() >= PhaseId::Approaching.ordinal()
            && !self.scene.is_paused()
        {
            self.accelerate_arrival();
            InteractionOutcome::AcceleratedArrival
        } else if self.scene.companion_arrived()
            && !self.scene.wave_dissolved()
            && !self.scene.is_paused()
        {
            self.accelerate_dissolve();
            InteractionOutcome::AcceleratedDissolve
        } else {
            InteractionOutcome::FeedbackOnly
        };

        debug!(outcome = outcome.label(), "interaction accepted");
        metrics::record_interaction(outcome.label());
        outcome
    }

    /// Summons the companion now; the wave acknowledges shortly after
    /// with a slower pulse.
    fn accelerate_arrival(&self) {
        self.actions.enter(PhaseId::Arriving);
        let renderer = Arc::clone(&self.renderer);
        spawn_guarded(
            Arc::clone(&self.scene),
            self.config.wave_ack_delay,
            move || {
                renderer.apply(RenderOp::PlayAnimation {
                    actor: Actor::Wave,
                    animation: Animation::WavePulse {
                        period_ms: WAVE_PULSE_ACK_MS,
                    },
                });
            },
        );
    }

    /// Calms the wave now; the comfort message follows shortly after.
    fn accelerate_dissolve(&self) {
        self.actions.enter(PhaseId::Dissolving);
        let actions = Arc::clone(&self.actions);
        spawn_guarded(
            Arc::clone(&self.scene),
            self.config.comfort_delay,
            move || {
                actions.enter(PhaseId::Comforting);
            },
        );
    }
}

impl std::fmt::Debug for InteractionAccelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionAccelerator")
            .field("debounce", &self.config.debounce)
            .finish_non_exhaustive()
    }
}
