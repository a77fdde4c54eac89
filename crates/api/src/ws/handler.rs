//! Stream handlers for guest and staff observers.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::error::TrySendError;
use realtime::{Scope, SnapshotSource, Subscription, SubscriptionEvent};
use telemetry::metrics;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::extractors::GuestSession;
use crate::state::AppState;
use crate::ws::manager::WsSender;
use crate::ws::message::ServerMessage;

/// GET /guest/realtime - the session's own requests.
pub async fn guest_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    GuestSession(session): GuestSession,
) -> impl IntoResponse {
    let scope = Scope::guest(session.tenant_id, session.guest_session_id);
    ws.on_upgrade(move |socket| serve_stream(socket, state, scope))
}

/// GET /staff/tenants/:tenant_id/realtime - every request of the tenant.
pub async fn staff_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_stream(socket, state, Scope::staff(tenant_id)))
}

/// Drives one stream: snapshot, then changes, resyncing after lag.
///
/// The socket is split; a writer task drains the connection's bounded
/// outbound queue while this task multiplexes bus events and inbound frames.
async fn serve_stream(socket: WebSocket, state: AppState, scope: Scope) {
    let (conn_id, tx, mut rx) = state.connections.add(scope);
    info!(conn_id = %conn_id, scope = ?scope, "Stream connected");

    let (mut sink, mut stream) = socket.split();

    let writer_conn_id = conn_id;
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                debug!(conn_id = %writer_conn_id, "Stream writer finished");
                break;
            }
        }
    });

    match state.bus().subscribe(scope) {
        Ok(mut sub) => {
            let first = send_listing(&state, &tx, &mut sub, Listing::Snapshot).await;
            if first != Pushed::Closed {
                pump(&state, &tx, &mut sub, &mut stream, conn_id, first == Pushed::Full).await;
            }
        }
        Err(e) => {
            warn!(conn_id = %conn_id, error = %e, "Stream refused");
            push(
                &tx,
                &ServerMessage::Error {
                    code: e.code().to_string(),
                    message: e.to_string(),
                },
            );
        }
    }

    state.connections.remove(conn_id);
    if tx.try_send(Message::Close(None)).is_err() {
        // The client stopped reading; do not wait for it to drain.
        writer.abort();
    }
    drop(tx);
    let _ = writer.await;
    info!(conn_id = %conn_id, "Stream disconnected");
}

/// Forwards bus events until either side goes away.
///
/// When the outbound queue is full the stream is `behind`: changes are
/// skipped until the writer frees a slot, then a full resync replaces them.
async fn pump<S>(
    state: &AppState,
    tx: &WsSender,
    sub: &mut Subscription,
    stream: &mut S,
    conn_id: Uuid,
    mut behind: bool,
) where
    S: futures::Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        tokio::select! {
            event = sub.next() => match event {
                SubscriptionEvent::Change(change) => {
                    if behind {
                        continue;
                    }
                    match push(tx, &ServerMessage::Change { change }) {
                        Pushed::Sent => {}
                        Pushed::Full => {
                            debug!(conn_id = %conn_id, "Outbound queue full, holding changes");
                            behind = true;
                        }
                        Pushed::Closed => break,
                    }
                }
                SubscriptionEvent::Lagged(missed) => {
                    metrics().resyncs.inc();
                    debug!(conn_id = %conn_id, missed, "Stream lagged, resyncing");
                    match send_listing(state, tx, sub, Listing::Resync).await {
                        Pushed::Sent => behind = false,
                        Pushed::Full => behind = true,
                        Pushed::Closed => break,
                    }
                }
                SubscriptionEvent::Closed => break,
            },
            slot = tx.reserve(), if behind => {
                if slot.is_err() {
                    break;
                }
                drop(slot);
                metrics().resyncs.inc();
                debug!(conn_id = %conn_id, "Outbound queue drained, resyncing");
                match send_listing(state, tx, sub, Listing::Resync).await {
                    Pushed::Sent => behind = false,
                    Pushed::Full => {}
                    Pushed::Closed => break,
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => trace!(conn_id = %conn_id, "Pong received"),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "Stream receive error");
                    break;
                }
            },
        }
    }
}

enum Listing {
    Snapshot,
    Resync,
}

/// Outcome of queueing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pushed {
    Sent,
    /// The client is not keeping up; the frame was dropped.
    Full,
    /// The stream should end.
    Closed,
}

/// Sends the full listing for the subscription's scope.
async fn send_listing(state: &AppState, tx: &WsSender, sub: &mut Subscription, kind: Listing) -> Pushed {
    match state.store().snapshot(sub.scope()).await {
        Ok(requests) => {
            sub.prime(&requests);
            let message = match kind {
                Listing::Snapshot => ServerMessage::Snapshot { requests },
                Listing::Resync => ServerMessage::Resync { requests },
            };
            push(tx, &message)
        }
        Err(e) => {
            warn!(scope = ?sub.scope(), error = %e, "Listing for stream failed");
            push(
                tx,
                &ServerMessage::Error {
                    code: e.code().to_string(),
                    message: e.to_string(),
                },
            );
            Pushed::Closed
        }
    }
}

fn push(tx: &WsSender, message: &ServerMessage) -> Pushed {
    let Some(frame) = message.to_message() else {
        return Pushed::Closed;
    };
    match tx.try_send(frame) {
        Ok(()) => Pushed::Sent,
        Err(TrySendError::Full(_)) => Pushed::Full,
        Err(TrySendError::Closed(_)) => Pushed::Closed,
    }
}
