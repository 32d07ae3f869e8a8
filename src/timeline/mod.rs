//! Phase scheduling: identities, entry actions, micro-motion, and the
//! pause-aware scheduler.

pub mod actions;
pub mod motion;
pub mod scheduler;

pub use actions::PhaseActions;
pub use motion::{MotionActor, MotionDirector, MotionProfile};
pub use scheduler::Timeline;

use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::TimelineConfig;
use crate::scene::SceneState;

// ============================================================================
// Phase identities
// ============================================================================

/// The seven ordered narrative phases.
///
/// Each loop iteration runs them forward-only; the loop reset returns
/// the scene to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseId {
    /// The figure appears and starts its micro-motion.
    Appearing,
    /// The wave begins its approach.
    Approaching,
    /// The recognition message is revealed character by character.
    Recognizing,
    /// The companion arrives.
    Arriving,
    /// The wave dissolves into particles.
    Dissolving,
    /// The comfort message is revealed line by line.
    Comforting,
    /// The scene resets for the next loop iteration.
    Looping,
}

impl PhaseId {
    /// All phases in schedule order.
    pub const ALL: [Self; 7] = [
        Self::Appearing,
        Self::Approaching,
        Self::Recognizing,
        Self::Arriving,
        Self::Dissolving,
        Self::Comforting,
        Self::Looping,
    ];

    /// One-based position in the schedule (0 is reserved for idle).
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Self::Appearing => 1,
            Self::Approaching => 2,
            Self::Recognizing => 3,
            Self::Arriving => 4,
            Self::Dissolving => 5,
            Self::Comforting => 6,
            Self::Looping => 7,
        }
    }

    /// Stable name for logs and metric labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Appearing => "appearing",
            Self::Approaching => "approaching",
            Self::Recognizing => "recognizing",
            Self::Arriving => "arriving",
            Self::Dissolving => "dissolving",
            Self::Comforting => "comforting",
            Self::Looping => "looping",
        }
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One schedule entry: a phase and its offset from loop start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSpec {
    /// Which phase fires.
    pub id: PhaseId,
    /// Offset from the start of the loop iteration.
    pub offset: Duration,
}

/// Builds the ordered schedule from a validated timeline config.
#[must_use]
pub fn schedule_from(timeline: &TimelineConfig) -> Vec<PhaseSpec> {
    PhaseId::ALL
        .iter()
        .zip(timeline.offsets_in_order())
        .map(|(&id, offset)| PhaseSpec { id, offset })
        .collect()
}

// ============================================================================
// Guard-checked delays
// ============================================================================

/// Schedules `f` to run after `delay` unless the scene is paused at
/// fire time.
///
/// This is the only deferral primitive the engine uses: scheduled
/// callbacks are never cancelled, only rendered inert by the guard.
pub(crate) fn spawn_guarded(
    scene: Arc<SceneState>,
    delay: Duration,
    f: impl FnOnce() + Send + 'static,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if !scene.is_paused() {
            f();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_one_based_and_sequential() {
        for (i, phase) in PhaseId::ALL.iter().enumerate() {
            assert_eq!(phase.ordinal(), i + 1);
        }
    }

    #[test]
    fn schedule_follows_config_order() {
        let schedule = schedule_from(&TimelineConfig::default());
        assert_eq!(schedule.len(), 7);
        assert_eq!(schedule[0].id, PhaseId::Appearing);
        assert_eq!(schedule[0].offset, Duration::from_secs(1));
        assert_eq!(schedule[6].id, PhaseId::Looping);
        assert_eq!(schedule[6].offset, Duration::from_secs(22));
    }

    #[tokio::test(start_paused = true)]
    async fn guarded_delay_fires_when_unpaused() {
        let scene = Arc::new(SceneState::new());
        let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        spawn_guarded(scene, Duration::from_millis(100), move || {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(fired.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn guarded_delay_skips_when_paused_at_fire_time() {
        let scene = Arc::new(SceneState::new());
        let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        spawn_guarded(Arc::clone(&scene), Duration::from_millis(100), move || {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        scene.swap_paused(true);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!fired.load(std::sync::atomic::Ordering::SeqCst));

        // Resume does not revive the skipped callback.
        scene.swap_paused(false);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!fired.load(std::sync::atomic::Ordering::SeqCst));
    }
}
