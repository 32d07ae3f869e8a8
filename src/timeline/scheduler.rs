//! The pause-aware phase scheduler.
//!
//! Each loop iteration walks the seven-phase schedule in order. Phase
//! deadlines are anchored at the loop start and pushed back by
//! completed pauses via [`PauseClock`]; the firing decision is made at
//! the deadline, where a paused scene means the phase is skipped for
//! this iteration rather than deferred.
//!
//! Nothing is ever cancelled mid-flight. A restart bumps the scene
//! epoch, and the superseded run notices at its next deadline and
//! exits. This keeps restart race-free without tracking task handles.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::actions::PhaseActions;
use super::{PhaseId, PhaseSpec, schedule_from};
use crate::config::EngineConfig;
use crate::observability::metrics;
use crate::scene::{PauseClock, SceneState};

/// Drives one phase schedule per loop iteration and chains iterations
/// through the settle delay.
pub struct Timeline {
    scene: Arc<SceneState>,
    clock: Arc<PauseClock>,
    actions: Arc<PhaseActions>,
    schedule: Vec<PhaseSpec>,
    settle: Duration,
    cancel: CancellationToken,
}

impl Timeline {
    #[must_use]
    pub fn new(
        scene: Arc<SceneState>,
        clock: Arc<PauseClock>,
        actions: Arc<PhaseActions>,
        config: &EngineConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            scene,
            clock,
            actions,
            schedule: schedule_from(&config.timeline),
            settle: config.timing.loop_settle,
            cancel,
        }
    }

    /// Starts the first loop iteration.
    pub fn start(self: &Arc<Self>) {
        self.restart();
    }

    /// Re-anchors the clock, supersedes any in-flight run, and spawns a
    /// fresh one.
    pub fn restart(self: &Arc<Self>) {
        self.clock.restart();
        let epoch = self.scene.bump_epoch();
        info!(epoch, "timeline started");
        let timeline = Arc::clone(self);
        tokio::spawn(async move {
            timeline.run(epoch).await;
        });
    }

    /// Schedules a restart after the settle delay.
    ///
    /// The restart is dropped if the scene is paused at fire time or if
    /// another restart superseded this one in the meantime.
    pub fn schedule_restart(self: &Arc<Self>) {
        let timeline = Arc::clone(self);
        let epoch = self.scene.epoch();
        tokio::spawn(async move {
            time::sleep(timeline.settle).await;
            if timeline.scene.is_paused() {
                debug!("settled restart skipped while paused");
                return;
            }
            if timeline.scene.epoch() != epoch {
                debug!(epoch, "settled restart superseded");
                return;
            }
            timeline.restart();
        });
    }

    async fn run(self: Arc<Self>, epoch: u64) {
        for spec in &self.schedule {
            // Sleep to the deadline, re-reading it each pass: a pause
            // completed while sleeping pushes the deadline back.
            loop {
                let deadline = self.clock.deadline(spec.offset);
                if Instant::now() >= deadline {
                    break;
                }
                tokio::select! {
                    () = self.cancel.cancelled() => return,
                    () = time::sleep_until(deadline) => {}
                }
            }

            if self.scene.epoch() != epoch {
                debug!(epoch, phase = %spec.id, "run superseded, exiting");
                return;
            }

            // The phase counts as processed either way.
            self.scene.set_phase_index(spec.id.ordinal());

            if self.scene.is_paused() {
                debug!(phase = %spec.id, "phase due while paused, skipped");
                metrics::record_phase_skipped(spec.id.name());
                continue;
            }

            info!(
                phase = %spec.id,
                offset_ms = spec.offset.as_millis() as u64,
                "phase fired"
            );
            metrics::record_phase_fired(spec.id.name());
            self.actions.enter(spec.id);

            if spec.id == PhaseId::Looping {
                self.schedule_restart();
            }
        }
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("phases", &self.schedule.len())
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleField;
    use crate::render::{Animation, RecordingRenderer, RenderOp, Renderer};
    use crate::timeline::MotionDirector;

    struct Harness {
        timeline: Arc<Timeline>,
        scene: Arc<SceneState>,
        clock: Arc<PauseClock>,
        renderer: Arc<RecordingRenderer>,
    }

    fn harness() -> Harness {
        let config = Arc::new(EngineConfig::default());
        let scene = Arc::new(SceneState::new());
        let clock = Arc::new(PauseClock::new());
        let renderer = Arc::new(RecordingRenderer::new());
        let dyn_renderer = renderer.clone() as Arc<dyn Renderer>;
        let cancel = CancellationToken::new();
        let motion = Arc::new(MotionDirector::new(
            Arc::clone(&scene),
            Arc::clone(&clock),
            Arc::clone(&dyn_renderer),
            cancel.clone(),
        ));
        let particles = Arc::new(ParticleField::new(
            Arc::clone(&scene),
            Arc::clone(&dyn_renderer),
            config.particles.clone(),
        ));
        let actions = Arc::new(PhaseActions::new(
            Arc::clone(&scene),
            Arc::clone(&dyn_renderer),
            particles,
            motion,
            Arc::clone(&config),
        ));
        let timeline = Arc::new(Timeline::new(
            Arc::clone(&scene),
            Arc::clone(&clock),
            actions,
            &config,
            cancel,
        ));
        Harness {
            timeline,
            scene,
            clock,
            renderer,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn phases_fire_in_order_at_offsets() {
        let h = harness();
        h.timeline.start();

        time::sleep(Duration::from_millis(900)).await;
        assert_eq!(h.scene.phase_index(), 0);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.scene.phase_index(), PhaseId::Appearing.ordinal());
        assert!(h.renderer.saw(|op| matches!(
            op,
            RenderOp::PlayAnimation {
                animation: Animation::FigureAppear,
                ..
            }
        )));

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(h.scene.phase_index(), PhaseId::Approaching.ordinal());

        time::sleep(Duration::from_secs(7)).await;
        assert!(h.scene.companion_arrived());

        time::sleep(Duration::from_secs(3)).await;
        assert!(h.scene.wave_dissolved());
    }

    #[tokio::test(start_paused = true)]
    async fn completed_pause_pushes_future_deadlines_back() {
        let h = harness();
        h.timeline.start();

        // Pause 2s..2.5s; the 4s phase picks up the half-second credit
        // and fires at 4.5s wall time.
        time::sleep(Duration::from_secs(2)).await;
        h.scene.swap_paused(true);
        h.clock.freeze();
        time::sleep(Duration::from_millis(500)).await;
        h.scene.swap_paused(false);
        h.clock.thaw();

        time::sleep(Duration::from_millis(1800)).await;
        assert_eq!(h.scene.phase_index(), PhaseId::Appearing.ordinal());
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(h.scene.phase_index(), PhaseId::Approaching.ordinal());
    }

    #[tokio::test(start_paused = true)]
    async fn phase_due_while_paused_is_skipped() {
        let h = harness();
        h.timeline.start();

        // Pause over the 4s deadline; credit lands at thaw, so the
        // deadline elapses mid-pause and the firing is skipped.
        time::sleep(Duration::from_secs(2)).await;
        h.scene.swap_paused(true);
        h.clock.freeze();
        time::sleep(Duration::from_secs(3)).await;

        // The phase was processed (index advanced) but its action never ran.
        assert_eq!(h.scene.phase_index(), PhaseId::Approaching.ordinal());
        assert!(!h.renderer.saw(|op| matches!(
            op,
            RenderOp::PlayAnimation {
                animation: Animation::WaveApproach,
                ..
            }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_in_flight_run() {
        let h = harness();
        h.timeline.start();
        time::sleep(Duration::from_millis(1500)).await;

        h.timeline.restart();
        h.renderer.clear();

        // The old run's 4s deadline passes; only the new run may act,
        // and its own appearing fires 1s after the restart.
        time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(
            h.renderer
                .count(|op| matches!(
                    op,
                    RenderOp::PlayAnimation {
                        animation: Animation::FigureAppear,
                        ..
                    }
                )),
            1
        );
        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(h.scene.phase_index(), PhaseId::Approaching.ordinal());
    }

    #[tokio::test(start_paused = true)]
    async fn full_loop_chains_into_next_iteration() {
        let h = harness();
        h.timeline.start();

        // Past the 22s reset and the 1s settle, into the next loop's
        // appearing phase at 24s.
        time::sleep(Duration::from_millis(23_500)).await;
        assert_eq!(h.scene.phase_index(), 0);

        time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(h.scene.phase_index(), PhaseId::Appearing.ordinal());
    }

    #[tokio::test(start_paused = true)]
    async fn settled_restart_skipped_when_paused() {
        let h = harness();
        h.timeline.start();

        time::sleep(Duration::from_millis(22_100)).await;
        h.scene.swap_paused(true);
        h.clock.freeze();
        time::sleep(Duration::from_secs(10)).await;

        // Settle elapsed while paused; no new iteration began.
        assert_eq!(h.scene.phase_index(), 0);
        h.scene.swap_paused(false);
        h.clock.thaw();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.scene.phase_index(), 0, "dropped restart never revives");
    }
}
