//! Shared scene state and the pause-aware clock.

pub mod clock;
pub mod state;

pub use clock::PauseClock;
pub use state::SceneState;
