//! Typed configuration schema.
//!
//! Duration fields are written as humantime strings in YAML
//! (`"50ms"`, `"4s"`, `"1m 30s"`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde adapter rendering `Duration` as a humantime string.
pub mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Serializes a duration as e.g. `"1s 500ms"`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    /// Deserializes a humantime duration string.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a valid humantime duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw)
            .map_err(|e| D::Error::custom(format!("invalid duration '{raw}': {e}")))
    }
}

// ============================================================================
// Root config
// ============================================================================

/// Root configuration for the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Phase schedule offsets.
    pub timeline: TimelineConfig,
    /// Message text and reveal pacing.
    pub messages: MessageConfig,
    /// Particle batch settings.
    pub particles: ParticleSettings,
    /// Interaction debounce and acceleration delays.
    pub interaction: InteractionConfig,
    /// Breath-guide session shape.
    pub breath: BreathConfig,
    /// Auxiliary delays inside phase actions.
    pub timing: TimingConfig,
}

// ============================================================================
// Timeline
// ============================================================================

/// Schedule offsets for the seven narrative phases, measured from the
/// start of a loop iteration. Offsets must be strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineConfig {
    /// The figure appears.
    #[serde(with = "duration_str")]
    pub figure_appear: Duration,
    /// The wave begins its approach.
    #[serde(with = "duration_str")]
    pub wave_approach: Duration,
    /// The recognition message reveal starts.
    #[serde(with = "duration_str")]
    pub recognition: Duration,
    /// The companion arrives.
    #[serde(with = "duration_str")]
    pub companion_enter: Duration,
    /// The wave starts dissolving.
    #[serde(with = "duration_str")]
    pub wave_dissolve: Duration,
    /// The comfort message appears.
    #[serde(with = "duration_str")]
    pub comfort: Duration,
    /// The loop resets.
    #[serde(with = "duration_str")]
    pub loop_reset: Duration,
}

impl TimelineConfig {
    /// The seven offsets in schedule order.
    #[must_use]
    pub const fn offsets_in_order(&self) -> [Duration; 7] {
        [
            self.figure_appear,
            self.wave_approach,
            self.recognition,
            self.companion_enter,
            self.wave_dissolve,
            self.comfort,
            self.loop_reset,
        ]
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            figure_appear: Duration::from_secs(1),
            wave_approach: Duration::from_secs(4),
            recognition: Duration::from_secs(7),
            companion_enter: Duration::from_secs(10),
            wave_dissolve: Duration::from_secs(13),
            comfort: Duration::from_secs(16),
            loop_reset: Duration::from_secs(22),
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Message content and reveal pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageConfig {
    /// The recognition message, revealed one character per tick.
    pub recognition: String,
    /// The comfort message lines, revealed one by one.
    pub comfort_lines: Vec<String>,
    /// Interval between revealed characters.
    #[serde(with = "duration_str")]
    pub char_tick: Duration,
    /// Stagger between comfort line reveals.
    #[serde(with = "duration_str")]
    pub line_stagger: Duration,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            recognition: "Some days, the weight doesn't need to be carried alone.".to_string(),
            comfort_lines: vec![
                "You don't have to be strong right now.".to_string(),
                "The wave always recedes.".to_string(),
                "Presence is enough.".to_string(),
            ],
            char_tick: Duration::from_millis(50),
            line_stagger: Duration::from_millis(800),
        }
    }
}

// ============================================================================
// Particles
// ============================================================================

/// Settings for the dissolve particle batch.
///
/// Distances are scene pixels; the origin is the batch anchor and
/// `jitter` spreads individual spawn points around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleSettings {
    /// Particles per batch.
    pub count: usize,
    /// Delay between consecutive spawn attempts.
    #[serde(with = "duration_str")]
    pub stagger: Duration,
    /// Batch anchor point `[x, y]` in scene pixels.
    pub origin: [f64; 2],
    /// Per-particle spawn spread `[x, y]` in scene pixels.
    pub jitter: [f64; 2],
    /// Minimum travel distance.
    pub min_distance: f64,
    /// Maximum travel distance.
    pub max_distance: f64,
    /// Minimum float duration.
    #[serde(with = "duration_str")]
    pub min_duration: Duration,
    /// Maximum float duration.
    #[serde(with = "duration_str")]
    pub max_duration: Duration,
    /// RNG seed for reproducible batches. Random when unset.
    pub seed: Option<u64>,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: 80,
            stagger: Duration::from_millis(30),
            origin: [480.0, 300.0],
            jitter: [320.0, 50.0],
            min_distance: 50.0,
            max_distance: 150.0,
            min_duration: Duration::from_secs(2),
            max_duration: Duration::from_secs(5),
            seed: None,
        }
    }
}

// ============================================================================
// Interaction
// ============================================================================

/// Interaction debounce and acceleration follow-up delays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionConfig {
    /// Minimum gap between accepted interactions.
    #[serde(with = "duration_str")]
    pub debounce: Duration,
    /// Delay before the wave pulse acknowledges an accelerated arrival.
    #[serde(with = "duration_str")]
    pub wave_ack_delay: Duration,
    /// Delay before the comfort message follows an accelerated
    /// dissolution.
    #[serde(with = "duration_str")]
    pub comfort_delay: Duration,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            wave_ack_delay: Duration::from_millis(500),
            comfort_delay: Duration::from_secs(1),
        }
    }
}

// ============================================================================
// Breath guide
// ============================================================================

/// Breath-guide session shape: `cycles` breaths of `cycle` each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreathConfig {
    /// Length of one breath cycle.
    #[serde(with = "duration_str")]
    pub cycle: Duration,
    /// Number of cycles per session.
    pub cycles: u32,
}

impl BreathConfig {
    /// Total session length.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.cycle * self.cycles
    }
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            cycle: Duration::from_secs(4),
            cycles: 5,
        }
    }
}

// ============================================================================
// Auxiliary timing
// ============================================================================

/// Delays used inside phase actions and the loop lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Delay after the wave approach before the figure's pose signals
    /// pressure.
    #[serde(with = "duration_str")]
    pub pressure_nudge_delay: Duration,
    /// Delay after the companion arrives before the figure reacts.
    #[serde(with = "duration_str")]
    pub reaction_delay: Duration,
    /// Delay after dissolution starts before the wave fades out.
    #[serde(with = "duration_str")]
    pub wave_fade_delay: Duration,
    /// Settle delay between a loop reset and the timeline restart.
    #[serde(with = "duration_str")]
    pub loop_settle: Duration,
    /// When the interaction hint appears after start.
    #[serde(with = "duration_str")]
    pub hint_show: Duration,
    /// When the interaction hint is hidden again after start.
    #[serde(with = "duration_str")]
    pub hint_hide: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pressure_nudge_delay: Duration::from_secs(2),
            reaction_delay: Duration::from_secs(1),
            wave_fade_delay: Duration::from_secs(1),
            loop_settle: Duration::from_secs(1),
            hint_show: Duration::from_secs(2),
            hint_hide: Duration::from_secs(8),
        }
    }
}
