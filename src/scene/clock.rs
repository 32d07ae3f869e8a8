//! Pause-aware timeline clock.
//!
//! Maps a phase's schedule offset to an absolute deadline, excluding
//! time the scene spent paused. Pausing freezes the clock; resuming
//! credits the full paused span, pushing every later deadline out by
//! exactly that amount. A deadline that passes while the clock is
//! frozen is *not* pushed out: the scheduler observes it as due,
//! finds the scene paused, and skips the phase for the loop iteration.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct ClockInner {
    /// When the current timeline generation started counting.
    started_at: Instant,
    /// Start of the in-progress pause, if frozen.
    paused_at: Option<Instant>,
    /// Total paused time credited by completed pauses.
    pause_credit: Duration,
}

/// Clock for one timeline generation.
///
/// `restart` begins counting from t=0 again; `freeze`/`thaw` bracket a
/// pause. Both are idempotent so the pause controller can call them
/// without tracking clock state of its own.
#[derive(Debug)]
pub struct PauseClock {
    inner: Mutex<ClockInner>,
}

impl PauseClock {
    /// Creates a clock counting from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ClockInner {
                started_at: Instant::now(),
                paused_at: None,
                pause_credit: Duration::ZERO,
            }),
        }
    }

    /// Begins counting from t=0, discarding any pause credit.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn restart(&self) {
        let mut inner = self.inner.lock().expect("clock lock poisoned");
        inner.started_at = Instant::now();
        inner.paused_at = None;
        inner.pause_credit = Duration::ZERO;
    }

    /// Freezes the clock at the current instant. No-op if already
    /// frozen.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn freeze(&self) {
        let mut inner = self.inner.lock().expect("clock lock poisoned");
        if inner.paused_at.is_none() {
            inner.paused_at = Some(Instant::now());
        }
    }

    /// Unfreezes the clock, crediting the completed pause span. No-op
    /// if not frozen.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn thaw(&self) {
        let mut inner = self.inner.lock().expect("clock lock poisoned");
        if let Some(paused_at) = inner.paused_at.take() {
            inner.pause_credit += paused_at.elapsed();
        }
    }

    /// Absolute deadline for a schedule offset.
    ///
    /// Only completed pauses are credited: while frozen, deadlines keep
    /// their pre-pause values and may pass, which the scheduler turns
    /// into a skip.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn deadline(&self, offset: Duration) -> Instant {
        let inner = self.inner.lock().expect("clock lock poisoned");
        inner.started_at + offset + inner.pause_credit
    }

    /// Wall time elapsed since the timeline started, including paused
    /// spans. Used for time-based oscillation, which deliberately keeps
    /// running on wall time.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn wall_elapsed(&self) -> Duration {
        let inner = self.inner.lock().expect("clock lock poisoned");
        inner.started_at.elapsed()
    }
}

impl Default for PauseClock {
    fn default() -> Self {
        Self::new()
    }
}
