use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use storage::changes::ChangeEvent;
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use crate::state::AppState;

fn to_event(item: Result<ChangeEvent, BroadcastStreamRecvError>) -> Option<Event> {
    match item {
        Ok(change) => match Event::default().event("change").json_data(&change) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode change event");
                None
            }
        },
        // Viewers refetch everything on `resync`.
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Change feed subscriber lagged");
            Some(Event::default().event("resync").data(skipped.to_string()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/changes",
    responses(
        (status = 200, description = "Server-sent `change` events for every committed mutation; `resync` when events were dropped", body = String, content_type = "text/event-stream")
    ),
    tag = "changes"
)]
pub async fn stream_changes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.store().changes().subscribe();
    tracing::debug!("Change feed subscriber connected");

    let stream = BroadcastStream::new(receiver)
        .filter_map(to_event)
        .map(Ok);

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use storage::changes::{ChangeKind, ChangeTable};

    use super::*;

    #[test]
    fn test_changes_become_named_events() {
        let change = ChangeEvent::new(ChangeTable::Teams, ChangeKind::Update, None);
        assert!(to_event(Ok(change)).is_some());
    }

    #[test]
    fn test_lag_becomes_resync() {
        assert!(to_event(Err(BroadcastStreamRecvError::Lagged(3))).is_some());
    }
}
