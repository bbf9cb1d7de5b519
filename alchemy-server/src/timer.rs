use std::sync::Arc;
use std::time::Duration;

use alchemy_core::{Broadcast, Countdown, Tick};
use alchemy_types::EventTag;
use async_trait::async_trait;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info};

use crate::events::EventBus;

const TICK: Duration = Duration::from_secs(1);

/// Told when a countdown runs out.
#[async_trait]
pub trait TimerListener: Send + Sync + 'static {
    async fn on_expired(&self, lobby_code: &str);
}

/// Handle to a running countdown task. Dropping it stops the countdown.
pub struct GameTimer {
    token: CancellationToken,
    _guard: DropGuard,
}

impl GameTimer {
    pub fn start(
        lobby_code: &str,
        countdown: Countdown,
        bus: Arc<EventBus>,
        listener: Arc<dyn TimerListener>,
    ) -> Self {
        let token = CancellationToken::new();
        info!(
            lobby_code,
            seconds = countdown.total_seconds(),
            "Starting game timer"
        );
        tokio::spawn(run_countdown(
            lobby_code.to_string(),
            countdown,
            bus,
            listener,
            token.clone(),
        ));
        Self {
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

async fn run_countdown(
    lobby_code: String,
    mut countdown: Countdown,
    bus: Arc<EventBus>,
    listener: Arc<dyn TimerListener>,
    token: CancellationToken,
) {
    let total = countdown.total_seconds();
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    let mut elapsed = 0;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                bus.publish(Broadcast::lobby(&lobby_code, EventTag::TimerStopped));
                info!(lobby_code = %lobby_code, "Game timer stopped");
                return;
            }
            _ = ticker.tick() => {
                elapsed += 1;
                match countdown.tick(total - elapsed) {
                    Tick::Silent => {}
                    Tick::Announce(seconds_left) => {
                        debug!(lobby_code = %lobby_code, seconds_left, "Countdown");
                        bus.publish(Broadcast::countdown(&lobby_code, seconds_left));
                    }
                    Tick::Expired => {
                        info!(lobby_code = %lobby_code, "Game timer expired");
                        listener.on_expired(&lobby_code).await;
                        return;
                    }
                }
            }
        }
    }
}
