//! Shared scene state.
//!
//! One mutable [`SceneState`] instance is owned by the engine and
//! shared by every component. All activity is cooperatively scheduled
//! on a single runtime, but the state is kept lock-free atomic so that
//! timed tasks, per-frame continuations, and input handlers can read
//! and update flags without coordination. Narrative flags only move
//! `false → true` within one loop iteration; a loop reset (or a full
//! reset) returns them to defaults.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::Instant;

/// Shared mutable state for the narrative scene.
///
/// Pending timed callbacks are never cancelled; they consult this
/// state at fire time and become no-ops when their guard fails. The
/// `epoch` counter is the guard that renders superseded timeline runs
/// inert after a restart.
pub struct SceneState {
    /// Whether the engine is paused.
    paused: AtomicBool,
    /// Pause flag value captured when the page became hidden.
    was_paused_by_visibility: AtomicBool,
    /// Ordinal of the last phase whose due time was processed
    /// (0 = idle, 1..=7 = Appearing..Looping).
    phase_index: AtomicUsize,
    /// Whether the companion has arrived this loop.
    companion_arrived: AtomicBool,
    /// Whether the wave has dissolved this loop.
    wave_dissolved: AtomicBool,
    /// Whether the comfort message has been revealed this loop.
    comfort_shown: AtomicBool,
    /// Whether a breath-guide session is live.
    breath_guide_active: AtomicBool,
    /// Timestamp of the last *accepted* interaction.
    last_interaction: Mutex<Option<Instant>>,
    /// Timeline generation; bumped by restarts and resets.
    epoch: AtomicU64,
}

impl SceneState {
    /// Creates a fresh scene at defaults: unpaused, idle, no narrative
    /// progress.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            was_paused_by_visibility: AtomicBool::new(false),
            phase_index: AtomicUsize::new(0),
            companion_arrived: AtomicBool::new(false),
            wave_dissolved: AtomicBool::new(false),
            comfort_shown: AtomicBool::new(false),
            breath_guide_active: AtomicBool::new(false),
            last_interaction: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    // ------------------------------------------------------------------
    // Pause
    // ------------------------------------------------------------------

    /// Whether the engine is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Sets the pause flag, returning the previous value.
    pub fn swap_paused(&self, paused: bool) -> bool {
        self.paused.swap(paused, Ordering::SeqCst)
    }

    /// Whether the scene was already paused when it became hidden.
    #[must_use]
    pub fn was_paused_by_visibility(&self) -> bool {
        self.was_paused_by_visibility.load(Ordering::SeqCst)
    }

    /// Records the pause flag value observed just before a forced
    /// visibility pause.
    pub fn set_was_paused_by_visibility(&self, value: bool) {
        self.was_paused_by_visibility.store(value, Ordering::SeqCst);
    }

    // ------------------------------------------------------------------
    // Narrative progress
    // ------------------------------------------------------------------

    /// Ordinal of the last phase whose due time was processed.
    #[must_use]
    pub fn phase_index(&self) -> usize {
        self.phase_index.load(Ordering::SeqCst)
    }

    /// Records schedule progress.
    pub fn set_phase_index(&self, index: usize) {
        self.phase_index.store(index, Ordering::SeqCst);
    }

    /// Whether the companion has arrived this loop.
    #[must_use]
    pub fn companion_arrived(&self) -> bool {
        self.companion_arrived.load(Ordering::SeqCst)
    }

    /// Marks the companion as arrived.
    ///
    /// Returns `true` if this call made the transition, `false` if the
    /// flag was already set; the caller must treat `false` as "entry
    /// action already ran" and do nothing.
    pub fn try_mark_companion_arrived(&self) -> bool {
        !self.companion_arrived.swap(true, Ordering::SeqCst)
    }

    /// Whether the wave has dissolved this loop.
    #[must_use]
    pub fn wave_dissolved(&self) -> bool {
        self.wave_dissolved.load(Ordering::SeqCst)
    }

    /// Marks the wave as dissolved. Same exactly-once contract as
    /// [`Self::try_mark_companion_arrived`].
    pub fn try_mark_wave_dissolved(&self) -> bool {
        !self.wave_dissolved.swap(true, Ordering::SeqCst)
    }

    /// Marks the comfort message as shown. Same exactly-once contract
    /// as [`Self::try_mark_companion_arrived`].
    pub fn try_mark_comfort_shown(&self) -> bool {
        !self.comfort_shown.swap(true, Ordering::SeqCst)
    }

    /// Restores the narrative flags to their defaults.
    ///
    /// The pause flag is deliberately left untouched; a loop reset in a
    /// paused scene stays paused.
    pub fn reset_narrative(&self) {
        self.phase_index.store(0, Ordering::SeqCst);
        self.companion_arrived.store(false, Ordering::SeqCst);
        self.wave_dissolved.store(false, Ordering::SeqCst);
        self.comfort_shown.store(false, Ordering::SeqCst);
    }

    // ------------------------------------------------------------------
    // Breath guide
    // ------------------------------------------------------------------

    /// Whether a breath-guide session is live.
    #[must_use]
    pub fn breath_guide_active(&self) -> bool {
        self.breath_guide_active.load(Ordering::SeqCst)
    }

    /// Activates the breath guide. Returns `true` if this call made the
    /// transition, `false` if a session was already live.
    pub fn try_activate_breath_guide(&self) -> bool {
        !self.breath_guide_active.swap(true, Ordering::SeqCst)
    }

    /// Deactivates the breath guide.
    pub fn deactivate_breath_guide(&self) {
        self.breath_guide_active.store(false, Ordering::SeqCst);
    }

    // ------------------------------------------------------------------
    // Interaction debounce
    // ------------------------------------------------------------------

    /// Applies the interaction debounce window.
    ///
    /// Accepts the interaction and records `now` as the new reference
    /// point when at least `window` has elapsed since the last accepted
    /// interaction. Rejected calls do not move the window.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn try_accept_interaction(&self, now: Instant, window: Duration) -> bool {
        let mut last = self
            .last_interaction
            .lock()
            .expect("last_interaction lock poisoned");
        if let Some(prev) = *last {
            if now.duration_since(prev) < window {
                return false;
            }
        }
        *last = Some(now);
        true
    }

    // ------------------------------------------------------------------
    // Timeline epoch
    // ------------------------------------------------------------------

    /// Current timeline generation.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Starts a new timeline generation, rendering callbacks from older
    /// generations inert at their fire time. Returns the new value.
    pub fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneState")
            .field("paused", &self.is_paused())
            .field("phase_index", &self.phase_index())
            .field("companion_arrived", &self.companion_arrived())
            .field("wave_dissolved", &self.wave_dissolved())
            .field("breath_guide_active", &self.breath_guide_active())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle() {
        let state = SceneState::new();
        assert!(!state.is_paused());
        assert_eq!(state.phase_index(), 0);
        assert!(!state.companion_arrived());
        assert!(!state.wave_dissolved());
        assert!(!state.breath_guide_active());
        assert_eq!(state.epoch(), 0);
    }

    #[test]
    fn companion_transition_happens_once() {
        let state = SceneState::new();
        assert!(state.try_mark_companion_arrived());
        assert!(!state.try_mark_companion_arrived());
        assert!(state.companion_arrived());
    }

    #[test]
    fn wave_transition_happens_once() {
        let state = SceneState::new();
        assert!(state.try_mark_wave_dissolved());
        assert!(!state.try_mark_wave_dissolved());
    }

    #[test]
    fn reset_restores_narrative_but_not_pause() {
        let state = SceneState::new();
        state.swap_paused(true);
        state.set_phase_index(5);
        state.try_mark_companion_arrived();
        state.try_mark_wave_dissolved();
        state.try_mark_comfort_shown();

        state.reset_narrative();

        assert_eq!(state.phase_index(), 0);
        assert!(!state.companion_arrived());
        assert!(!state.wave_dissolved());
        assert!(state.try_mark_comfort_shown());
        assert!(state.is_paused(), "pause flag must survive a reset");
    }

    #[test]
    fn breath_guide_exclusive() {
        let state = SceneState::new();
        assert!(state.try_activate_breath_guide());
        assert!(!state.try_activate_breath_guide());
        state.deactivate_breath_guide();
        assert!(state.try_activate_breath_guide());
    }

    #[test]
    fn epoch_bumps_monotonically() {
        let state = SceneState::new();
        assert_eq!(state.bump_epoch(), 1);
        assert_eq!(state.bump_epoch(), 2);
        assert_eq!(state.epoch(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_rejects_within_window() {
        let state = SceneState::new();
        let window = Duration::from_millis(500);
        let t0 = Instant::now();

        assert!(state.try_accept_interaction(t0, window));
        assert!(!state.try_accept_interaction(t0 + Duration::from_millis(499), window));
        assert!(state.try_accept_interaction(t0 + Duration::from_millis(500), window));
    }

    proptest::proptest! {
        // Whatever the arrival pattern, two accepted interactions are
        // never closer together than the debounce window.
        #[test]
        fn accepted_interactions_respect_window(
            mut offsets in proptest::collection::vec(0u64..10_000, 1..50),
            window_ms in 1u64..2_000,
        ) {
            offsets.sort_unstable();
            let state = SceneState::new();
            let window = Duration::from_millis(window_ms);
            let base = Instant::now();

            let accepted: Vec<u64> = offsets
                .into_iter()
                .filter(|&off| {
                    state.try_accept_interaction(base + Duration::from_millis(off), window)
                })
                .collect();

            proptest::prop_assert!(!accepted.is_empty(), "first interaction always lands");
            for pair in accepted.windows(2) {
                proptest::prop_assert!(pair[1] - pair[0] >= window_ms);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_window_measured_from_accepted_event_only() {
        let state = SceneState::new();
        let window = Duration::from_millis(500);
        let t0 = Instant::now();

        assert!(state.try_accept_interaction(t0, window));
        // A rejected call must not slide the window forward.
        assert!(!state.try_accept_interaction(t0 + Duration::from_millis(400), window));
        assert!(state.try_accept_interaction(t0 + Duration::from_millis(600), window));
    }
}
