//! Server-Sent Events Handler
//!
//! 把 EventPublisher 的广播转发为 SSE 流

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::infrastructure::events::FundingEvent;
use crate::infrastructure::http::state::AppState;

/// 订阅资金与解锁事件
pub async fn event_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_publisher.subscribe();
    tracing::info!(
        subscribers = state.event_publisher.subscriber_count(),
        "SSE subscriber connected"
    );

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match to_sse(&event) {
                    Some(sse) => return Some((Ok(sse), rx)),
                    None => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keep_alive))
}

fn to_sse(event: &FundingEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "Failed to serialize event");
            None
        }
    }
}
