//! The engine facade.
//!
//! Wires the scene state, pause clock, scheduler, phase actions,
//! motion, particles, interaction, and pause handling into one object
//! the host drives. The host feeds it interactions, key commands, and
//! visibility changes; the engine feeds render operations to the
//! injected [`Renderer`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::EngineConfig;
use crate::interact::{InteractionAccelerator, InteractionOutcome};
use crate::particle::ParticleField;
use crate::pause::{BreathSession, PauseController};
use crate::render::{Actor, RenderOp, Renderer};
use crate::scene::{PauseClock, SceneState};
use crate::timeline::{MotionDirector, PhaseActions, PhaseId, Timeline, spawn_guarded};

/// A key the host translated into an engine command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Space: toggle pause.
    TogglePause,
    /// R: reset the loop.
    Reset,
    /// B: start the breath guide.
    BreathGuide,
    /// Escape: unconditionally resume.
    ForceResume,
}

impl KeyCommand {
    /// Maps a host key name to a command, if bound.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " => Some(Self::TogglePause),
            "r" | "R" => Some(Self::Reset),
            "b" | "B" => Some(Self::BreathGuide),
            "Escape" => Some(Self::ForceResume),
            _ => None,
        }
    }
}

/// The assembled animation engine.
pub struct Engine {
    config: Arc<EngineConfig>,
    scene: Arc<SceneState>,
    renderer: Arc<dyn Renderer>,
    particles: Arc<ParticleField>,
    actions: Arc<PhaseActions>,
    timeline: Arc<Timeline>,
    pause: PauseController,
    interact: InteractionAccelerator,
    cancel: CancellationToken,
}

impl Engine {
    /// Builds an engine around a renderer. Nothing runs until
    /// [`Engine::start`].
    #[must_use]
    pub fn new(config: Arc<EngineConfig>, renderer: Arc<dyn Renderer>) -> Self {
        let scene = Arc::new(SceneState::new());
        let clock = Arc::new(PauseClock::new());
        let cancel = CancellationToken::new();

        let motion = Arc::new(MotionDirector::new(
            Arc::clone(&scene),
            Arc::clone(&clock),
            Arc::clone(&renderer),
            cancel.clone(),
        ));
        let particles = Arc::new(ParticleField::new(
            Arc::clone(&scene),
            Arc::clone(&renderer),
            config.particles.clone(),
        ));
        let actions = Arc::new(PhaseActions::new(
            Arc::clone(&scene),
            Arc::clone(&renderer),
            Arc::clone(&particles),
            Arc::clone(&motion),
            Arc::clone(&config),
        ));
        let timeline = Arc::new(Timeline::new(
            Arc::clone(&scene),
            Arc::clone(&clock),
            Arc::clone(&actions),
            &config,
            cancel.clone(),
        ));
        let pause = PauseController::new(
            Arc::clone(&scene),
            Arc::clone(&clock),
            motion,
            Arc::clone(&renderer),
            config.breath.clone(),
            cancel.clone(),
        );
        let interact = InteractionAccelerator::new(
            Arc::clone(&scene),
            Arc::clone(&actions),
            Arc::clone(&renderer),
            config.interaction.clone(),
        );

        Self {
            config,
            scene,
            renderer,
            particles,
            actions,
            timeline,
            pause,
            interact,
            cancel,
        }
    }

    /// Starts the narrative loop and the one-time interaction hint.
    pub fn start(&self) {
        info!("engine started");
        self.timeline.start();
        self.spawn_hint();
    }

    /// Shows the interaction hint once, early in the first loop, and
    /// hides it again before the dissolve.
    fn spawn_hint(&self) {
        let renderer = Arc::clone(&self.renderer);
        spawn_guarded(
            Arc::clone(&self.scene),
            self.config.timing.hint_show,
            move || {
                renderer.apply(RenderOp::SetOpacity {
                    actor: Actor::Hint,
                    opacity: 1.0,
                });
            },
        );
        let renderer = Arc::clone(&self.renderer);
        spawn_guarded(
            Arc::clone(&self.scene),
            self.config.timing.hint_hide,
            move || {
                renderer.apply(RenderOp::SetOpacity {
                    actor: Actor::Hint,
                    opacity: 0.0,
                });
            },
        );
    }

    /// Pauses the scene.
    pub fn pause(&self) {
        self.pause.pause();
    }

    /// Resumes the scene.
    pub fn resume(&self) {
        self.pause.resume();
    }

    /// Toggles pause.
    pub fn toggle_pause(&self) {
        self.pause.toggle();
    }

    /// Resets to loop start: unpauses, discards the in-flight run,
    /// clears the scene, and begins a fresh iteration after the settle
    /// delay.
    pub fn reset(&self) {
        info!("engine reset");
        self.pause.resume();
        self.scene.bump_epoch();
        self.actions.enter(PhaseId::Looping);
        self.timeline.schedule_restart();
    }

    /// Starts a breath-guide session if none is active.
    pub fn start_breath_guide(&self) -> Option<BreathSession> {
        self.pause.start_breath_guide()
    }

    /// Feeds one pointer interaction at scene coordinates.
    pub fn handle_interaction(&self, x: f64, y: f64) -> InteractionOutcome {
        self.interact.handle(x, y)
    }

    /// Executes a key command.
    pub fn handle_key(&self, command: KeyCommand) {
        match command {
            KeyCommand::TogglePause => self.pause.toggle(),
            KeyCommand::Reset => self.reset(),
            KeyCommand::BreathGuide => {
                self.pause.start_breath_guide();
            }
            KeyCommand::ForceResume => self.pause.resume(),
        }
    }

    /// Feeds a host visibility change.
    pub fn visibility_changed(&self, hidden: bool) {
        self.pause.visibility_changed(hidden);
    }

    /// Stops every engine task. The engine cannot be restarted.
    pub fn shutdown(&self) {
        info!("engine shutting down");
        self.cancel.cancel();
    }

    /// Scene state, for hosts that surface it.
    #[must_use]
    pub fn scene(&self) -> &Arc<SceneState> {
        &self.scene
    }

    /// Particle field, for hosts that surface it.
    #[must_use]
    pub fn particles(&self) -> &Arc<ParticleField> {
        &self.particles
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<EngineConfig> {
        &self.config
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("paused", &self.scene.is_paused())
            .field("phase_index", &self.scene.phase_index())
            .finish_non_exhaustive()
    }
}
