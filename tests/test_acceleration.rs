mod common;

use std::time::Duration;

use common::TestEngine;
use tideloop::interact::InteractionOutcome;
use tideloop::render::{Actor, Animation, RenderOp};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn interaction_during_approach_summons_companion_early() {
    let t = TestEngine::new();
    t.engine.start();

    // 5s: the wave is approaching, the companion is not due until 10s.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(
        t.engine.handle_interaction(0.5, 0.5),
        InteractionOutcome::AcceleratedArrival
    );
    assert!(t.engine.scene().companion_arrived());
    assert!(t.renderer.saw(|op| matches!(op, RenderOp::ShowRipple { .. })));

    // Half a second later the wave acknowledges with a slower pulse.
    sleep(Duration::from_millis(600)).await;
    assert!(t.renderer.saw(|op| matches!(
        op,
        RenderOp::PlayAnimation {
            animation: Animation::WavePulse { period_ms: 10_000 },
            ..
        }
    )));
}

#[tokio::test(start_paused = true)]
async fn scheduled_arrival_degrades_to_noop_after_acceleration() {
    let t = TestEngine::new();
    t.engine.start();

    sleep(Duration::from_secs(5)).await;
    t.engine.handle_interaction(0.5, 0.5);

    // Past the scheduled 10s arrival: the entry action must not repeat.
    sleep(Duration::from_secs(7)).await;
    assert_eq!(
        t.renderer.count(|op| matches!(
            op,
            RenderOp::SetOpacity {
                actor: Actor::Companion,
                ..
            }
        )),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn second_interaction_calms_wave_and_brings_comfort_early() {
    let t = TestEngine::new();
    t.engine.start();

    sleep(Duration::from_secs(5)).await;
    t.engine.handle_interaction(0.5, 0.5);

    // Outside the debounce window, with the companion now present.
    sleep(Duration::from_secs(1)).await;
    assert_eq!(
        t.engine.handle_interaction(0.5, 0.5),
        InteractionOutcome::AcceleratedDissolve
    );
    assert!(t.engine.scene().wave_dissolved());

    // Comfort follows one second later, nine seconds early.
    sleep(Duration::from_millis(1_100)).await;
    assert!(t.renderer.saw(|op| matches!(
        op,
        RenderOp::SetOpacity {
            actor: Actor::Comfort,
            ..
        }
    )));

    // The scheduled 16s comfort entry must not replay line reveals.
    sleep(Duration::from_secs(12)).await;
    assert_eq!(
        t.renderer.count(|op| matches!(op, RenderOp::RevealLine { line: 0, .. })),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn one_interaction_never_takes_both_branches() {
    let t = TestEngine::new();
    t.engine.start();

    sleep(Duration::from_secs(5)).await;
    t.engine.handle_interaction(0.5, 0.5);
    assert!(t.engine.scene().companion_arrived());
    assert!(!t.engine.scene().wave_dissolved());
}

#[tokio::test(start_paused = true)]
async fn rapid_interactions_are_debounced() {
    let t = TestEngine::new();
    t.engine.start();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(
        t.engine.handle_interaction(0.2, 0.2),
        InteractionOutcome::AcceleratedArrival
    );
    assert_eq!(
        t.engine.handle_interaction(0.8, 0.8),
        InteractionOutcome::Debounced
    );
    assert_eq!(
        t.renderer.count(|op| matches!(op, RenderOp::ShowRipple { .. })),
        1,
        "debounced interaction emits no feedback"
    );
}

#[tokio::test(start_paused = true)]
async fn interaction_before_approach_is_feedback_only() {
    let t = TestEngine::new();
    t.engine.start();

    // 2s: only the figure has appeared.
    sleep(Duration::from_secs(2)).await;
    assert_eq!(
        t.engine.handle_interaction(0.5, 0.5),
        InteractionOutcome::FeedbackOnly
    );
    assert!(!t.engine.scene().companion_arrived());
    assert!(t.renderer.saw(|op| matches!(op, RenderOp::ShowRipple { .. })));
}

#[tokio::test(start_paused = true)]
async fn interaction_while_paused_gives_feedback_only() {
    let t = TestEngine::new();
    t.engine.start();

    sleep(Duration::from_secs(5)).await;
    t.engine.pause();
    assert_eq!(
        t.engine.handle_interaction(0.5, 0.5),
        InteractionOutcome::FeedbackOnly
    );
    assert!(!t.engine.scene().companion_arrived());
}
