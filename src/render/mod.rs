//! Rendering instruction surface.
//!
//! The engine never touches a real display. Every visual effect is
//! expressed as a [`RenderOp`] value handed to a [`Renderer`]
//! collaborator, which is free to drive a DOM, a terminal, a test
//! recorder, or nothing at all. Keeping the operations as plain data
//! makes them trivially serializable for capture output and cheap to
//! assert on in tests.

pub mod recording;

pub use recording::RecordingRenderer;

use serde::Serialize;

use crate::particle::ParticleId;

// ============================================================================
// Actors
// ============================================================================

/// Handles for the visual actors the narrative manipulates.
///
/// The engine assumes all actors exist on the rendering side; a missing
/// actor is a precondition violation outside the core's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// The central figure the narrative revolves around.
    Figure,
    /// The approaching pressure wave.
    Wave,
    /// The supportive companion.
    Companion,
    /// The short recognition message revealed character by character.
    Recognition,
    /// The multi-line comfort message.
    Comfort,
    /// The one-shot interaction hint.
    Hint,
}

impl Actor {
    /// All scene actors, in reset order.
    pub const ALL: [Self; 6] = [
        Self::Figure,
        Self::Wave,
        Self::Companion,
        Self::Recognition,
        Self::Comfort,
        Self::Hint,
    ];
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Figure => "figure",
            Self::Wave => "wave",
            Self::Companion => "companion",
            Self::Recognition => "recognition",
            Self::Comfort => "comfort",
            Self::Hint => "hint",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Animations
// ============================================================================

/// Named animation states an actor can be put into.
///
/// The renderer owns the actual keyframes; the engine only selects
/// which animation runs and, for the wave pulse, its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "animation")]
pub enum Animation {
    /// Fade-in entrance for the figure.
    FigureAppear,
    /// The wave's forward approach motion.
    WaveApproach,
    /// The wave's continuous pulse with a configurable period.
    WavePulse {
        /// Pulse period in milliseconds.
        period_ms: u64,
    },
    /// Synchronized breathing cue on the figure.
    FigureBreath,
    /// Clears any running animation on the actor.
    Stop,
}

// ============================================================================
// Render operations
// ============================================================================

/// A single instruction to the rendering collaborator.
///
/// Coordinates and offsets are in scene pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum RenderOp {
    /// Set an actor's opacity (`0.0` = hidden, `1.0` = fully shown).
    SetOpacity {
        /// Target actor.
        actor: Actor,
        /// New opacity.
        opacity: f64,
    },
    /// Offset an actor from its resting position (micro-motion).
    Nudge {
        /// Target actor.
        actor: Actor,
        /// Horizontal offset in pixels.
        dx: f64,
        /// Vertical offset in pixels.
        dy: f64,
    },
    /// Scale an actor relative to its resting size (pose pressure).
    SetScale {
        /// Target actor.
        actor: Actor,
        /// Scale factor.
        scale: f64,
    },
    /// Put an actor into a named animation state.
    PlayAnimation {
        /// Target actor.
        actor: Actor,
        /// Animation selection.
        #[serde(flatten)]
        animation: Animation,
    },
    /// Clear a text actor's content before a character reveal.
    ClearText {
        /// Target text actor.
        actor: Actor,
    },
    /// Append one revealed character to a text actor.
    AppendChar {
        /// Target text actor.
        actor: Actor,
        /// The character.
        ch: char,
    },
    /// Replace a text actor's full content (loop reset restore).
    SetText {
        /// Target text actor.
        actor: Actor,
        /// Replacement text.
        text: String,
    },
    /// Reveal one line of a multi-line text actor.
    RevealLine {
        /// Target text actor.
        actor: Actor,
        /// Zero-based line index.
        line: usize,
    },
    /// Create a transient particle node.
    SpawnParticle {
        /// Particle identity.
        id: ParticleId,
        /// Spawn point.
        x: f64,
        /// Spawn point.
        y: f64,
        /// Travel direction in radians.
        angle: f64,
        /// Travel distance in pixels.
        distance: f64,
        /// Float animation duration in milliseconds.
        duration_ms: u64,
    },
    /// Destroy a particle node.
    RemoveParticle {
        /// Particle identity.
        id: ParticleId,
    },
    /// Destroy every particle node unconditionally.
    ClearParticles,
    /// Show a transient ripple at the interaction point.
    ShowRipple {
        /// Interaction point.
        x: f64,
        /// Interaction point.
        y: f64,
    },
    /// Show the breath-guide overlay.
    ShowBreathOverlay,
    /// Remove the breath-guide overlay.
    HideBreathOverlay,
    /// Freeze or unfreeze ambient animations on pause changes.
    SetPausedVisuals {
        /// Whether the scene is paused.
        paused: bool,
    },
    /// Return an actor to its initial hidden/resting state.
    ResetActor {
        /// Target actor.
        actor: Actor,
    },
}

// ============================================================================
// Renderer trait
// ============================================================================

/// The rendering collaborator.
///
/// Implementations must be cheap and non-blocking: the engine issues
/// operations from timed tasks and per-frame continuations and assumes
/// `apply` returns promptly. There is no error channel; a renderer
/// that cannot honor an instruction drops it.
pub trait Renderer: Send + Sync {
    /// Applies one rendering instruction.
    fn apply(&self, op: RenderOp);
}

/// Renderer that discards every instruction.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn apply(&self, _op: RenderOp) {}
}

/// Renderer that logs every instruction via `tracing` at debug level.
///
/// Used by the headless CLI demo.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceRenderer;

impl Renderer for TraceRenderer {
    fn apply(&self, op: RenderOp) {
        tracing::debug!(op = ?op, "render");
    }
}
