//! Shared test fixtures: a presentation layer that acknowledges every
//! animation request immediately.

use tokio::sync::broadcast;

use roshambo_core::Side;
use roshambo_runtime::{
    Event, MatchEvent, PresentationSignal, RoundEvent, RuntimeHandle, Topic,
};

/// Spawn a task that answers reveal/hit/death/activation requests with their
/// completion signals, standing in for a real presentation layer.
pub fn spawn_presentation(handle: &RuntimeHandle) {
    init_tracing();
    let mut round_rx = handle.subscribe(Topic::Round);
    let mut match_rx = handle.subscribe(Topic::Match);
    let handle = handle.clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = round_rx.recv() => match event {
                    Ok(Event::Round(RoundEvent::RevealRequested { .. })) => {
                        let _ = handle
                            .signal(PresentationSignal::RevealComplete(Side::Player))
                            .await;
                        let _ = handle
                            .signal(PresentationSignal::RevealComplete(Side::Opponent))
                            .await;
                    }
                    Ok(Event::Round(RoundEvent::HitRequested { side, .. })) => {
                        let _ = handle.signal(PresentationSignal::HitComplete(side)).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                event = match_rx.recv() => match event {
                    Ok(Event::Match(MatchEvent::DeathRequested { side })) => {
                        let _ = handle.signal(PresentationSignal::DeathComplete(side)).await;
                    }
                    Ok(Event::Match(MatchEvent::ActivationRequested)) => {
                        let _ = handle.signal(PresentationSignal::ActivationComplete).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
