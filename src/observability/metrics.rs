//! Metrics collection.
//!
//! Typed convenience functions over the `metrics` facade. No exporter
//! is installed here; the macros no-op unless the embedding process
//! installs a recorder. Phase labels come from the fixed [`PhaseId`]
//! set, so there is no cardinality concern.
//!
//! [`PhaseId`]: crate::timeline::PhaseId

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Registers metric descriptions with the global recorder.
pub fn describe_metrics() {
    describe_counter!(
        "tideloop_phases_fired_total",
        "Phase entry actions executed, by phase"
    );
    describe_counter!(
        "tideloop_phases_skipped_total",
        "Phase firings skipped because the scene was paused, by phase"
    );
    describe_counter!(
        "tideloop_interactions_total",
        "Interactions received, by outcome"
    );
    describe_counter!(
        "tideloop_particles_spawned_total",
        "Particles created across all batches"
    );
    describe_counter!(
        "tideloop_loops_completed_total",
        "Narrative loop iterations completed"
    );
    describe_counter!(
        "tideloop_breath_sessions_total",
        "Breath-guide sessions started"
    );
    describe_gauge!("tideloop_particles_live", "Currently tracked particles");
}

/// Records an executed phase entry action.
pub fn record_phase_fired(phase: &str) {
    counter!("tideloop_phases_fired_total", "phase" => phase.to_owned()).increment(1);
}

/// Records a phase firing skipped due to pause.
pub fn record_phase_skipped(phase: &str) {
    counter!("tideloop_phases_skipped_total", "phase" => phase.to_owned()).increment(1);
}

/// Records an interaction by outcome label.
pub fn record_interaction(outcome: &'static str) {
    counter!("tideloop_interactions_total", "outcome" => outcome).increment(1);
}

/// Records created particles.
pub fn record_particles_spawned(count: u64) {
    counter!("tideloop_particles_spawned_total").increment(count);
}

/// Sets the live particle gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_particles_live(count: usize) {
    gauge!("tideloop_particles_live").set(count as f64);
}

/// Records a completed loop iteration.
pub fn record_loop_completed() {
    counter!("tideloop_loops_completed_total").increment(1);
}

/// Records a started breath-guide session.
pub fn record_breath_session() {
    counter!("tideloop_breath_sessions_total").increment(1);
}
