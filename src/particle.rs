//! Particle lifecycle management.
//!
//! The dissolve phase spawns a staggered batch of short-lived
//! decorative particles. Each spawn attempt is skipped (not deferred)
//! if the scene is paused at its fire time, the same policy the
//! scheduler applies to phases. A particle's sole expiry condition is
//! `birth + lifespan`; expiry is enforced by a per-particle timer plus
//! opportunistic [`ParticleField::cleanup`] sweeps around batches.
//! [`ParticleField::clear_all`] removes every tracked particle
//! unconditionally and is used by the loop reset.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::config::schema::ParticleSettings;
use crate::observability::metrics;
use crate::render::{RenderOp, Renderer};
use crate::scene::SceneState;

/// Identity of a tracked particle, unique within one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParticleId(pub u64);

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A live decorative particle.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// Identity.
    pub id: ParticleId,
    /// Creation instant.
    pub birth: Instant,
    /// Lifespan; the particle expires at `birth + lifespan`.
    pub lifespan: Duration,
    /// Spawn point in scene pixels.
    pub origin: (f64, f64),
    /// Travel direction in radians, in `[0, 2π)`.
    pub angle: f64,
    /// Travel distance in scene pixels.
    pub distance: f64,
}

impl Particle {
    /// Whether the particle is past its expiry at `now`.
    #[must_use]
    pub fn expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.birth) >= self.lifespan
    }
}

/// Owns every live particle and drives their lifecycle.
pub struct ParticleField {
    scene: Arc<SceneState>,
    renderer: Arc<dyn Renderer>,
    settings: ParticleSettings,
    particles: DashMap<u64, Particle>,
    next_id: AtomicU64,
    rng: Mutex<StdRng>,
}

impl ParticleField {
    /// Creates an empty field.
    ///
    /// A configured seed makes batches reproducible; otherwise the RNG
    /// is seeded from the OS.
    #[must_use]
    pub fn new(
        scene: Arc<SceneState>,
        renderer: Arc<dyn Renderer>,
        settings: ParticleSettings,
    ) -> Self {
        let rng = settings
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            scene,
            renderer,
            settings,
            particles: DashMap::new(),
            next_id: AtomicU64::new(0),
            rng: Mutex::new(rng),
        }
    }

    /// Number of currently tracked particles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Whether a particle is still tracked.
    #[must_use]
    pub fn contains(&self, id: ParticleId) -> bool {
        self.particles.contains_key(&id.0)
    }

    /// Enqueues one batch of spawn attempts at the configured batch
    /// origin, one attempt per stagger interval.
    ///
    /// Attempts that come due while the scene is paused are skipped,
    /// not deferred. Expired leftovers from earlier batches are swept
    /// before the batch starts.
    pub fn spawn_batch(self: &Arc<Self>) {
        let field = Arc::clone(self);
        let count = self.settings.count;
        let stagger = self.settings.stagger;
        debug!(count, stagger_ms = stagger.as_millis() as u64, "particle batch start");

        tokio::spawn(async move {
            field.cleanup();
            for i in 0..count {
                if i > 0 {
                    time::sleep(stagger).await;
                }
                if field.scene.is_paused() {
                    trace!(attempt = i, "spawn attempt skipped while paused");
                    continue;
                }
                field.spawn_one();
            }
        });
    }

    /// Creates one particle with randomized trajectory and schedules
    /// its expiry.
    fn spawn_one(self: &Arc<Self>) {
        let particle = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            let [ox, oy] = self.settings.origin;
            let [jx, jy] = self.settings.jitter;
            let x = ox + rng.random_range(-jx / 2.0..=jx / 2.0);
            let y = oy + rng.random_range(-jy / 2.0..=jy / 2.0);
            let angle = rng.random_range(0.0..TAU);
            let distance = rng.random_range(self.settings.min_distance..=self.settings.max_distance);
            let lifespan_ms = rng.random_range(
                self.settings.min_duration.as_millis() as u64
                    ..=self.settings.max_duration.as_millis() as u64,
            );
            Particle {
                id: ParticleId(self.next_id.fetch_add(1, Ordering::SeqCst)),
                birth: Instant::now(),
                lifespan: Duration::from_millis(lifespan_ms),
                origin: (x, y),
                angle,
                distance,
            }
        };

        self.particles.insert(particle.id.0, particle);
        self.renderer.apply(RenderOp::SpawnParticle {
            id: particle.id,
            x: particle.origin.0,
            y: particle.origin.1,
            angle: particle.angle,
            distance: particle.distance,
            duration_ms: particle.lifespan.as_millis() as u64,
        });
        metrics::record_particles_spawned(1);
        metrics::set_particles_live(self.live_count());

        // Expiry is not pause-guarded: a particle is never observable
        // past its lifespan plus scheduling slop.
        let field = Arc::clone(self);
        tokio::spawn(async move {
            time::sleep(particle.lifespan).await;
            field.expire(particle.id);
        });
    }

    /// Removes one particle if it is still tracked (it may already be
    /// gone via `clear_all` or a cleanup sweep).
    fn expire(&self, id: ParticleId) {
        if self.particles.remove(&id.0).is_some() {
            self.renderer.apply(RenderOp::RemoveParticle { id });
            metrics::set_particles_live(self.live_count());
        }
    }

    /// Sweeps out every particle past its expiry.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let expired: Vec<ParticleId> = self
            .particles
            .iter()
            .filter(|entry| entry.value().expired_at(now))
            .map(|entry| entry.value().id)
            .collect();
        for id in expired {
            self.expire(id);
        }
    }

    /// Removes every tracked particle unconditionally, regardless of
    /// remaining lifespan.
    pub fn clear_all(&self) {
        let removed = self.particles.len();
        self.particles.clear();
        self.renderer.apply(RenderOp::ClearParticles);
        metrics::set_particles_live(0);
        if removed > 0 {
            debug!(removed, "cleared all particles");
        }
    }
}

impl std::fmt::Debug for ParticleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleField")
            .field("live", &self.live_count())
            .field("count", &self.settings.count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;

    fn small_settings() -> ParticleSettings {
        ParticleSettings {
            count: 5,
            stagger: Duration::from_millis(30),
            min_duration: Duration::from_secs(2),
            max_duration: Duration::from_secs(5),
            seed: Some(7),
            ..ParticleSettings::default()
        }
    }

    fn field_with(
        settings: ParticleSettings,
    ) -> (Arc<ParticleField>, Arc<SceneState>, Arc<RecordingRenderer>) {
        let scene = Arc::new(SceneState::new());
        let renderer = Arc::new(RecordingRenderer::new());
        let field = Arc::new(ParticleField::new(
            Arc::clone(&scene),
            renderer.clone() as Arc<dyn Renderer>,
            settings,
        ));
        (field, scene, renderer)
    }

    #[tokio::test(start_paused = true)]
    async fn batch_spawns_count_particles() {
        let (field, _scene, renderer) = field_with(small_settings());
        field.spawn_batch();

        // Past the last stagger slot, before any expiry.
        time::sleep(Duration::from_millis(4 * 30 + 10)).await;
        assert_eq!(field.live_count(), 5);
        assert_eq!(
            renderer.count(|op| matches!(op, RenderOp::SpawnParticle { .. })),
            5
        );
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_while_paused_are_skipped_not_deferred() {
        let settings = ParticleSettings {
            // Long lifespans keep expiry out of this test's window.
            min_duration: Duration::from_secs(30),
            max_duration: Duration::from_secs(30),
            ..small_settings()
        };
        let (field, scene, _renderer) = field_with(settings);
        field.spawn_batch();

        // First two attempts land; pause swallows the rest.
        time::sleep(Duration::from_millis(40)).await;
        scene.swap_paused(true);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(field.live_count(), 2);

        // Resuming does not replay skipped attempts.
        scene.swap_paused(false);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(field.live_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn particles_expire_at_birth_plus_lifespan() {
        let (field, _scene, renderer) = field_with(small_settings());
        field.spawn_batch();

        // Max lifespan is 5s; add the batch tail and slop.
        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(field.live_count(), 0);
        assert_eq!(
            renderer.count(|op| matches!(op, RenderOp::RemoveParticle { .. })),
            5
        );
    }

    #[tokio::test(start_paused = true)]
    async fn clear_all_removes_regardless_of_lifespan() {
        let (field, _scene, renderer) = field_with(small_settings());
        field.spawn_batch();
        time::sleep(Duration::from_millis(200)).await;
        assert!(field.live_count() > 0);

        field.clear_all();
        assert_eq!(field.live_count(), 0);
        assert!(renderer.saw(|op| matches!(op, RenderOp::ClearParticles)));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_after_clear_is_a_noop() {
        let (field, _scene, renderer) = field_with(small_settings());
        field.spawn_batch();
        time::sleep(Duration::from_millis(200)).await;
        field.clear_all();
        renderer.clear();

        // Let every stale expiry timer fire against the empty field.
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(
            renderer.count(|op| matches!(op, RenderOp::RemoveParticle { .. })),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_batches_are_reproducible() {
        let (field_a, _sa, renderer_a) = field_with(small_settings());
        let (field_b, _sb, renderer_b) = field_with(small_settings());
        field_a.spawn_batch();
        field_b.spawn_batch();
        time::sleep(Duration::from_millis(200)).await;

        let spawns = |r: &RecordingRenderer| {
            r.ops()
                .into_iter()
                .filter(|op| matches!(op, RenderOp::SpawnParticle { .. }))
                .collect::<Vec<_>>()
        };
        assert_eq!(spawns(&renderer_a), spawns(&renderer_b));
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_sweeps_only_expired() {
        let settings = ParticleSettings {
            count: 1,
            min_duration: Duration::from_secs(2),
            max_duration: Duration::from_secs(2),
            ..small_settings()
        };
        let (field, _scene, _renderer) = field_with(settings);
        field.spawn_batch();
        time::sleep(Duration::from_millis(10)).await;

        field.cleanup();
        assert_eq!(field.live_count(), 1, "unexpired particle survives sweep");
    }
}
