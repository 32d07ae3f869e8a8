//! Phase entry actions.
//!
//! Each phase maps to one idempotent entry action. Actions are invoked
//! by the scheduler at their offsets and, for arrival and dissolve, by
//! the interaction path ahead of schedule. One-shot guards on the scene
//! state make the later scheduled invocation a no-op when interaction
//! already ran the action.

use std::sync::Arc;

use tokio::time;
use tracing::{debug, info};

use super::motion::{MotionActor, MotionDirector};
use super::{PhaseId, spawn_guarded};
use crate::config::EngineConfig;
use crate::observability::metrics;
use crate::particle::ParticleField;
use crate::render::{Actor, Animation, RenderOp, Renderer};
use crate::scene::SceneState;

/// Wave pulse period while approaching.
pub(crate) const WAVE_PULSE_APPROACH_MS: u64 = 8_000;
/// Wave pulse period acknowledging an accelerated arrival.
pub(crate) const WAVE_PULSE_ACK_MS: u64 = 10_000;
/// Wave pulse period once the wave calms and dissolves.
pub(crate) const WAVE_PULSE_CALM_MS: u64 = 12_000;

/// Figure scale under the approaching wave's pressure.
const PRESSURE_SCALE: f64 = 0.95;
/// Figure nudge toward the newly arrived companion.
const REACTION_NUDGE: (f64, f64) = (5.0, -2.0);

/// Executes phase entry actions against the scene.
pub struct PhaseActions {
    scene: Arc<SceneState>,
    renderer: Arc<dyn Renderer>,
    particles: Arc<ParticleField>,
    motion: Arc<MotionDirector>,
    config: Arc<EngineConfig>,
}

impl PhaseActions {
    #[must_use]
    pub fn new(
        scene: Arc<SceneState>,
        renderer: Arc<dyn Renderer>,
        particles: Arc<ParticleField>,
        motion: Arc<MotionDirector>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            scene,
            renderer,
            particles,
            motion,
            config,
        }
    }

    /// Runs the entry action for `phase`.
    pub fn enter(self: &Arc<Self>, phase: PhaseId) {
        match phase {
            PhaseId::Appearing => self.appearing(),
            PhaseId::Approaching => self.approaching(),
            PhaseId::Recognizing => self.recognizing(),
            PhaseId::Arriving => self.arriving(),
            PhaseId::Dissolving => self.dissolving(),
            PhaseId::Comforting => self.comforting(),
            PhaseId::Looping => self.looping(),
        }
    }

    fn appearing(self: &Arc<Self>) {
        self.renderer.apply(RenderOp::PlayAnimation {
            actor: Actor::Figure,
            animation: Animation::FigureAppear,
        });
        self.motion.start(MotionActor::Figure);
    }

    fn approaching(self: &Arc<Self>) {
        self.renderer.apply(RenderOp::PlayAnimation {
            actor: Actor::Wave,
            animation: Animation::WaveApproach,
        });
        self.renderer.apply(RenderOp::PlayAnimation {
            actor: Actor::Wave,
            animation: Animation::WavePulse {
                period_ms: WAVE_PULSE_APPROACH_MS,
            },
        });

        // The figure compresses slightly under the wave's pressure.
        let renderer = Arc::clone(&self.renderer);
        spawn_guarded(
            Arc::clone(&self.scene),
            self.config.timing.pressure_nudge_delay,
            move || {
                renderer.apply(RenderOp::SetScale {
                    actor: Actor::Figure,
                    scale: PRESSURE_SCALE,
                });
            },
        );
    }

    fn recognizing(self: &Arc<Self>) {
        self.renderer.apply(RenderOp::SetOpacity {
            actor: Actor::Recognition,
            opacity: 1.0,
        });
        self.spawn_char_reveal();
    }

    /// Reveals the recognition message one character per tick.
    ///
    /// Pausing mid-reveal abandons the task; the next loop iteration
    /// starts the reveal over from a cleared slot.
    fn spawn_char_reveal(self: &Arc<Self>) {
        let actions = Arc::clone(self);
        let text = self.config.messages.recognition.clone();
        let tick = self.config.messages.char_tick;

        tokio::spawn(async move {
            actions.renderer.apply(RenderOp::ClearText {
                actor: Actor::Recognition,
            });
            for (i, ch) in text.chars().enumerate() {
                if actions.scene.is_paused() {
                    debug!(revealed = i, "character reveal abandoned on pause");
                    return;
                }
                actions.renderer.apply(RenderOp::AppendChar {
                    actor: Actor::Recognition,
                    ch,
                });
                time::sleep(tick).await;
            }
        });
    }

    fn arriving(self: &Arc<Self>) {
        if !self.scene.try_mark_companion_arrived() {
            debug!("companion already arrived");
            return;
        }
        self.renderer.apply(RenderOp::SetOpacity {
            actor: Actor::Companion,
            opacity: 1.0,
        });
        self.motion.start(MotionActor::Companion);

        // The figure notices and leans toward the companion.
        let renderer = Arc::clone(&self.renderer);
        spawn_guarded(
            Arc::clone(&self.scene),
            self.config.timing.reaction_delay,
            move || {
                renderer.apply(RenderOp::Nudge {
                    actor: Actor::Figure,
                    dx: REACTION_NUDGE.0,
                    dy: REACTION_NUDGE.1,
                });
            },
        );
    }

    fn dissolving(self: &Arc<Self>) {
        // The wave only dissolves once the companion is present.
        if !self.scene.companion_arrived() {
            debug!("dissolve skipped, companion not yet arrived");
            return;
        }
        if !self.scene.try_mark_wave_dissolved() {
            debug!("wave already dissolved");
            return;
        }
        self.renderer.apply(RenderOp::PlayAnimation {
            actor: Actor::Wave,
            animation: Animation::WavePulse {
                period_ms: WAVE_PULSE_CALM_MS,
            },
        });
        self.particles.spawn_batch();

        let renderer = Arc::clone(&self.renderer);
        spawn_guarded(
            Arc::clone(&self.scene),
            self.config.timing.wave_fade_delay,
            move || {
                renderer.apply(RenderOp::SetOpacity {
                    actor: Actor::Wave,
                    opacity: 0.0,
                });
            },
        );
    }

    fn comforting(self: &Arc<Self>) {
        if !self.scene.try_mark_comfort_shown() {
            debug!("comfort message already shown");
            return;
        }
        self.renderer.apply(RenderOp::SetOpacity {
            actor: Actor::Comfort,
            opacity: 1.0,
        });
        let stagger = self.config.messages.line_stagger;
        for line in 0..self.config.messages.comfort_lines.len() {
            let renderer = Arc::clone(&self.renderer);
            spawn_guarded(
                Arc::clone(&self.scene),
                stagger * u32::try_from(line).unwrap_or(u32::MAX),
                move || {
                    renderer.apply(RenderOp::RevealLine {
                        actor: Actor::Comfort,
                        line,
                    });
                },
            );
        }
    }

    /// Returns the scene to idle for the next iteration.
    ///
    /// Pause state and motion flags survive the reset; active motion
    /// keeps running across loop boundaries.
    fn looping(self: &Arc<Self>) {
        self.scene.reset_narrative();
        self.particles.clear_all();
        for actor in Actor::ALL {
            self.renderer.apply(RenderOp::ResetActor { actor });
        }
        self.renderer.apply(RenderOp::SetText {
            actor: Actor::Recognition,
            text: self.config.messages.recognition.clone(),
        });
        metrics::record_loop_completed();
        info!("loop iteration complete");
    }
}

impl std::fmt::Debug for PhaseActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseActions").finish_non_exhaustive()
    }
}
