//! Recording renderer for tests.
//!
//! Stores every [`RenderOp`] in arrival order so tests can assert on
//! exactly what the engine instructed the rendering layer to do.

use std::sync::Mutex;

use super::{Actor, RenderOp, Renderer};

/// Renderer that appends every instruction to an in-memory log.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    ops: Mutex<Vec<RenderOp>>,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded operations.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn ops(&self) -> Vec<RenderOp> {
        self.ops.lock().expect("ops lock poisoned").clone()
    }

    /// Counts recorded operations matching a predicate.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn count(&self, pred: impl Fn(&RenderOp) -> bool) -> usize {
        self.ops
            .lock()
            .expect("ops lock poisoned")
            .iter()
            .filter(|op| pred(op))
            .count()
    }

    /// Whether any recorded operation matches a predicate.
    pub fn saw(&self, pred: impl Fn(&RenderOp) -> bool) -> bool {
        self.count(pred) > 0
    }

    /// Returns the text revealed so far on a text actor, combining
    /// `ClearText`, `AppendChar`, and `SetText` instructions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn revealed_text(&self, target: Actor) -> String {
        let mut text = String::new();
        for op in self.ops.lock().expect("ops lock poisoned").iter() {
            match op {
                RenderOp::ClearText { actor } if *actor == target => text.clear(),
                RenderOp::AppendChar { actor, ch } if *actor == target => text.push(*ch),
                RenderOp::SetText {
                    actor,
                    text: replacement,
                } if *actor == target => {
                    text.clear();
                    text.push_str(replacement);
                }
                _ => {}
            }
        }
        text
    }

    /// Discards all recorded operations.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.ops.lock().expect("ops lock poisoned").clear();
    }
}

impl Renderer for RecordingRenderer {
    fn apply(&self, op: RenderOp) {
        self.ops.lock().expect("ops lock poisoned").push(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let r = RecordingRenderer::new();
        r.apply(RenderOp::SetOpacity {
            actor: Actor::Figure,
            opacity: 1.0,
        });
        r.apply(RenderOp::ClearParticles);

        let ops = r.ops();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1], RenderOp::ClearParticles);
    }

    #[test]
    fn count_filters_by_predicate() {
        let r = RecordingRenderer::new();
        r.apply(RenderOp::ShowRipple { x: 0.1, y: 0.2 });
        r.apply(RenderOp::ShowRipple { x: 0.3, y: 0.4 });
        r.apply(RenderOp::ClearParticles);

        assert_eq!(
            r.count(|op| matches!(op, RenderOp::ShowRipple { .. })),
            2
        );
        assert!(r.saw(|op| matches!(op, RenderOp::ClearParticles)));
    }

    #[test]
    fn revealed_text_replays_character_reveal() {
        let r = RecordingRenderer::new();
        r.apply(RenderOp::ClearText {
            actor: Actor::Recognition,
        });
        for ch in "hi".chars() {
            r.apply(RenderOp::AppendChar {
                actor: Actor::Recognition,
                ch,
            });
        }
        assert_eq!(r.revealed_text(Actor::Recognition), "hi");

        r.apply(RenderOp::SetText {
            actor: Actor::Recognition,
            text: "restored".to_string(),
        });
        assert_eq!(r.revealed_text(Actor::Recognition), "restored");
    }

    #[test]
    fn clear_discards_history() {
        let r = RecordingRenderer::new();
        r.apply(RenderOp::ClearParticles);
        r.clear();
        assert!(r.ops().is_empty());
    }
}
