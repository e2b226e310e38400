use std::sync::Arc;
use std::time::Duration;

use chat_core::{Credential, InboundEnvelope, Language, OutboundEnvelope};
use chat_engine::{ConnectionEvent, ConnectionHandle, EngineEvent, EventSink};
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

struct TestSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

fn sink() -> (Arc<dyn EventSink>, mpsc::UnboundedReceiver<EngineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(TestSink { tx }), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> ConnectionEvent {
    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event in time")
        .expect("sink open");
    match event {
        EngineEvent::Connection { conn, event } => {
            assert_eq!(conn, 7);
            event
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn connection_reports_traffic_and_server_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake");
        let first = ws.next().await.expect("frame").expect("frame ok");
        let text = first.into_text().expect("text frame").as_str().to_string();
        ws.send(Message::Text("not json".into())).await.expect("send");
        ws.send(Message::Text(r#"{"type":"message","content":"hi"}"#.into()))
            .await
            .expect("send");
        ws.close(None).await.expect("close");
        text
    });

    let (sink, mut rx) = sink();
    let url = Url::parse(&format!("ws://{addr}/chat")).expect("url");
    let handle = ConnectionHandle::open(
        7,
        url,
        Duration::from_secs(5),
        sink,
        &tokio::runtime::Handle::current(),
    );

    assert_eq!(next_event(&mut rx).await, ConnectionEvent::Opened);
    assert!(handle.send(OutboundEnvelope::Auth {
        token: Credential::new("secret"),
        language: Language::default(),
    }));

    assert!(matches!(next_event(&mut rx).await, ConnectionEvent::Malformed(_)));
    assert_eq!(
        next_event(&mut rx).await,
        ConnectionEvent::Envelope(InboundEnvelope::Message {
            content: "hi".to_string()
        })
    );
    assert!(matches!(
        next_event(&mut rx).await,
        ConnectionEvent::Closed { .. }
    ));

    let auth = server.await.expect("server task");
    assert!(auth.contains(r#""type":"auth""#));
    assert!(auth.contains(r#""token":"secret""#));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn refused_connection_reports_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let (sink, mut rx) = sink();
    let url = Url::parse(&format!("ws://{addr}/chat")).expect("url");
    let _handle = ConnectionHandle::open(
        7,
        url,
        Duration::from_secs(5),
        sink,
        &tokio::runtime::Handle::current(),
    );

    assert!(matches!(next_event(&mut rx).await, ConnectionEvent::Failed(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn local_close_emits_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake");
        while let Some(Ok(_)) = ws.next().await {}
    });

    let (sink, mut rx) = sink();
    let url = Url::parse(&format!("ws://{addr}/chat")).expect("url");
    let handle = ConnectionHandle::open(
        7,
        url,
        Duration::from_secs(5),
        sink,
        &tokio::runtime::Handle::current(),
    );
    assert_eq!(next_event(&mut rx).await, ConnectionEvent::Opened);

    handle.close();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
    assert!(handle.is_finished());
    assert!(!handle.send(OutboundEnvelope::NewConversation));
}
