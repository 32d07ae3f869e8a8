//! Shared test harness: an engine wired to a recording renderer under
//! simulated time.

use std::sync::Arc;

use tideloop::config::EngineConfig;
use tideloop::engine::Engine;
use tideloop::render::{RecordingRenderer, Renderer};

/// An engine instance whose entire render output is recorded.
pub struct TestEngine {
    pub engine: Engine,
    pub renderer: Arc<RecordingRenderer>,
}

impl TestEngine {
    /// Builds an engine on the default scene with a fixed particle
    /// seed. Must be called inside a tokio runtime; nothing runs until
    /// `engine.start()`.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(mut config: EngineConfig) -> Self {
        config.particles.seed.get_or_insert(42);
        let renderer = Arc::new(RecordingRenderer::new());
        let engine = Engine::new(
            Arc::new(config),
            renderer.clone() as Arc<dyn Renderer>,
        );
        Self { engine, renderer }
    }
}
