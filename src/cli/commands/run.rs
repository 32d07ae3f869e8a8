//! Headless engine run.
//!
//! Assembles a renderer, builds the engine, starts the loop, and waits
//! for either the requested duration or an interrupt. With `--capture`
//! every render operation is also written to an NDJSON trace.

use std::sync::Arc;

use tracing::info;

use crate::capture::{CaptureWriter, CapturingRenderer};
use crate::cli::args::RunArgs;
use crate::config::{EngineConfig, load_config};
use crate::engine::Engine;
use crate::error::TideloopError;
use crate::observability::metrics::describe_metrics;
use crate::render::{Renderer, TraceRenderer};

/// Run the engine until the duration elapses or the process is
/// interrupted.
///
/// # Errors
///
/// Returns an error when the configuration fails to load or the
/// capture file cannot be created.
pub async fn run(args: &RunArgs) -> Result<(), TideloopError> {
    let mut config = match &args.config {
        Some(path) => (*load_config(path)?).clone(),
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.particles.seed = Some(seed);
    }
    let config = Arc::new(config);

    describe_metrics();

    let renderer: Arc<dyn Renderer> = match &args.capture {
        Some(path) => {
            let writer = Arc::new(CaptureWriter::create(path)?);
            info!(path = %path.display(), "capturing render operations");
            Arc::new(CapturingRenderer::new(Arc::new(TraceRenderer), writer))
        }
        None => Arc::new(TraceRenderer),
    };

    let engine = Engine::new(config, renderer);
    engine.start();

    match args.duration {
        Some(duration) => {
            info!(duration_ms = duration.as_millis() as u64, "timed run");
            tokio::time::sleep(duration).await;
        }
        None => {
            info!("running until interrupted");
            tokio::signal::ctrl_c().await?;
        }
    }

    engine.shutdown();
    info!(
        phase_index = engine.scene().phase_index(),
        live_particles = engine.particles().live_count(),
        "run finished"
    );
    Ok(())
}
