use std::convert::Infallible;
use std::sync::Arc;

use alchemy_types::EventEnvelope;
use futures_util::{Stream, StreamExt, future};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};
use warp::sse::Event;

use crate::auth::AuthService;
use crate::registry::PlayerKey;

pub mod bus;

pub use bus::{CHANNEL_CAPACITY, ChannelId, EventBus, SubscriptionKind};

pub const SSE_EVENT_NAME: &str = "msg";

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
}

/// Player tokens join the lobby group; anything else listens to global events only.
pub fn subscription_kind(auth: &AuthService, token: Option<&str>) -> SubscriptionKind {
    match token.map(|token| auth.validate_player_token(token)) {
        Some(Ok(claims)) => {
            SubscriptionKind::Player(PlayerKey::new(&claims.lobby_code, &claims.player_name))
        }
        Some(Err(e)) => {
            debug!("Event subscriber token rejected, listening anonymously: {}", e);
            SubscriptionKind::Anonymous
        }
        None => SubscriptionKind::Anonymous,
    }
}

/// Unsubscribes when the SSE stream is dropped, i.e. when the client goes away.
struct SubscriptionGuard {
    bus: Arc<EventBus>,
    id: ChannelId,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

pub fn event_stream(
    bus: Arc<EventBus>,
    kind: SubscriptionKind,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let (id, receiver) = bus.subscribe(kind);
    let guard = SubscriptionGuard { bus, id };

    ReceiverStream::new(receiver).filter_map(move |payload| {
        // Borrowing the whole guard ties its lifetime to the stream.
        let guard = &guard;
        let channel = guard.id;
        let event = match Event::default()
            .event(SSE_EVENT_NAME)
            .json_data(EventEnvelope { data: payload })
        {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!(%channel, "Failed to encode event: {}", e);
                None
            }
        };
        future::ready(event)
    })
}

pub async fn handle_event_stream(
    query: EventsQuery,
    auth_header: Option<String>,
    bus: Arc<EventBus>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let token = auth_header.or(query.token);
    let kind = subscription_kind(&auth_service, token.as_deref());
    let stream = event_stream(bus, kind);
    Ok(warp::sse::reply(warp::sse::keep_alive().stream(stream)))
}
