//! One persistent WebSocket connection to the chat backend.
//!
//! The socket is driven by a single tokio task. Outbound envelopes are queued
//! on an unbounded channel, inbound frames are decoded into envelopes, and
//! everything that happens is reported to the [`EventSink`] tagged with the
//! connection id. Decode failures are reported as `Malformed` and never end
//! the task.
use std::sync::Arc;
use std::time::Duration;

use chat_core::{decode_inbound, encode_outbound, ConnectionId, OutboundEnvelope};
use chat_logging::{chat_debug, chat_error, chat_warn};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{ConnectionEvent, EngineEvent, EventSink};

pub struct ConnectionHandle {
    conn: ConnectionId,
    outbound: mpsc::UnboundedSender<OutboundEnvelope>,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    /// Spawns the connection task on `runtime` and returns immediately.
    pub fn open(
        conn: ConnectionId,
        url: Url,
        connect_timeout: Duration,
        sink: Arc<dyn EventSink>,
        runtime: &tokio::runtime::Handle,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        runtime.spawn(run_connection(
            conn,
            url,
            connect_timeout,
            outbound_rx,
            cancel.clone(),
            sink,
        ));
        Self {
            conn,
            outbound,
            cancel,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.conn
    }

    /// Queues an envelope. Returns `false` once the connection task has ended.
    pub fn send(&self, envelope: OutboundEnvelope) -> bool {
        self.outbound.send(envelope).is_ok()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.outbound.is_closed()
    }
}

async fn run_connection(
    conn: ConnectionId,
    url: Url,
    connect_timeout: Duration,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundEnvelope>,
    cancel: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let emit = |event: ConnectionEvent| sink.emit(EngineEvent::Connection { conn, event });

    let connect = tokio::time::timeout(
        connect_timeout,
        tokio_tungstenite::connect_async(url.as_str()),
    );
    let stream = tokio::select! {
        _ = cancel.cancelled() => {
            chat_debug!("connection {} cancelled before open", conn);
            return;
        }
        result = connect => match result {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(err)) => {
                emit(ConnectionEvent::Failed(err.to_string()));
                return;
            }
            Err(_) => {
                emit(ConnectionEvent::Failed(format!(
                    "connect timed out after {connect_timeout:?}"
                )));
                return;
            }
        },
    };

    chat_debug!("connection {} open to {}", conn, url);
    emit(ConnectionEvent::Opened);
    let (mut writer, mut reader) = stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                // Local close: the session has already forgotten this id.
                let _ = writer.send(Message::Close(None)).await;
                chat_debug!("connection {} closed locally", conn);
                break;
            }
            outbound = outbound_rx.recv() => {
                let Some(envelope) = outbound else {
                    let _ = writer.send(Message::Close(None)).await;
                    break;
                };
                let text = match encode_outbound(&envelope) {
                    Ok(text) => text,
                    Err(err) => {
                        chat_error!("dropping {} envelope: {}", envelope.kind(), err);
                        continue;
                    }
                };
                if let Err(err) = writer.send(Message::Text(text.into())).await {
                    emit(ConnectionEvent::Failed(err.to_string()));
                    break;
                }
            }
            inbound = reader.next() => match inbound {
                Some(Ok(Message::Text(text))) => emit(decode(text.as_str())),
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => emit(decode(text)),
                    Err(err) => emit(ConnectionEvent::Malformed(err.to_string())),
                },
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|frame| u16::from(frame.code));
                    emit(ConnectionEvent::Closed { code });
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    chat_warn!("connection {} errored: {}", conn, err);
                    emit(ConnectionEvent::Failed(err.to_string()));
                    break;
                }
                None => {
                    emit(ConnectionEvent::Closed { code: None });
                    break;
                }
            },
        }
    }
}

fn decode(text: &str) -> ConnectionEvent {
    match decode_inbound(text) {
        Ok(envelope) => ConnectionEvent::Envelope(envelope),
        Err(err) => ConnectionEvent::Malformed(err.to_string()),
    }
}
