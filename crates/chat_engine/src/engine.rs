use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chat_core::{ConnectionId, OutboundEnvelope};
use chat_logging::{chat_debug, chat_info, chat_warn};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use url::Url;

use crate::connection::ConnectionHandle;
use crate::fetch::{CandidateFetcher, FetchSettings};
use crate::token::TokenProvider;
use crate::{EngineError, EngineEvent, EventSink, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub ws_url: Url,
    pub connect_timeout: Duration,
    pub fetch: FetchSettings,
}

/// Side effects the engine knows how to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Open {
        conn: ConnectionId,
    },
    Send {
        conn: ConnectionId,
        envelope: OutboundEnvelope,
    },
    Close {
        conn: ConnectionId,
    },
    RequestCredential {
        epoch: u64,
    },
    FetchCandidateData {
        epoch: u64,
    },
    StartHandshakeTimer {
        conn: ConnectionId,
        after: Duration,
    },
    CancelHandshakeTimer {
        conn: ConnectionId,
    },
    ScheduleReconnect {
        epoch: u64,
        after: Duration,
    },
    CancelReconnect,
    SignOut,
    Shutdown,
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        settings: EngineSettings,
        tokens: Arc<dyn TokenProvider>,
        fetcher: Arc<dyn CandidateFetcher>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("chat-engine-io")
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("chat-engine".to_string())
            .spawn(move || {
                let mut worker = Worker::new(runtime, settings, tokens, fetcher, sink);
                worker.watch_identity();
                while let Ok(command) = cmd_rx.recv() {
                    if command == EngineCommand::Shutdown {
                        break;
                    }
                    worker.handle(command);
                }
                worker.shutdown();
            })
            .map_err(EngineError::Thread)?;

        Ok(Self {
            cmd_tx,
            worker: Some(worker),
        })
    }

    pub fn dispatch(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            chat_warn!("engine worker is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

struct Worker {
    runtime: Runtime,
    settings: EngineSettings,
    tokens: Arc<dyn TokenProvider>,
    fetcher: Arc<dyn CandidateFetcher>,
    sink: Arc<dyn EventSink>,
    connections: HashMap<ConnectionId, ConnectionHandle>,
    handshake_timers: HashMap<ConnectionId, JoinHandle<()>>,
    reconnect_timer: Option<JoinHandle<()>>,
}

impl Worker {
    fn new(
        runtime: Runtime,
        settings: EngineSettings,
        tokens: Arc<dyn TokenProvider>,
        fetcher: Arc<dyn CandidateFetcher>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            runtime,
            settings,
            tokens,
            fetcher,
            sink,
            connections: HashMap::new(),
            handshake_timers: HashMap::new(),
            reconnect_timer: None,
        }
    }

    /// Forwards identity-provider presence. The initial value is reported
    /// only when already signed in.
    fn watch_identity(&self) {
        let mut presence = self.tokens.subscribe();
        let sink = self.sink.clone();
        self.runtime.spawn(async move {
            if *presence.borrow_and_update() {
                sink.emit(EngineEvent::IdentityChanged { signed_in: true });
            }
            while presence.changed().await.is_ok() {
                let signed_in = *presence.borrow_and_update();
                sink.emit(EngineEvent::IdentityChanged { signed_in });
            }
        });
    }

    fn handle(&mut self, command: EngineCommand) {
        self.connections.retain(|_, handle| !handle.is_finished());
        self.handshake_timers.retain(|_, timer| !timer.is_finished());

        match command {
            EngineCommand::Open { conn } => {
                let handle = ConnectionHandle::open(
                    conn,
                    self.settings.ws_url.clone(),
                    self.settings.connect_timeout,
                    self.sink.clone(),
                    self.runtime.handle(),
                );
                if let Some(previous) = self.connections.insert(conn, handle) {
                    previous.close();
                }
            }
            EngineCommand::Send { conn, envelope } => match self.connections.get(&conn) {
                Some(handle) if handle.send(envelope) => {}
                _ => chat_warn!("connection {} is not open; envelope dropped", conn),
            },
            EngineCommand::Close { conn } => {
                if let Some(handle) = self.connections.remove(&conn) {
                    handle.close();
                }
                self.cancel_handshake_timer(conn);
            }
            EngineCommand::RequestCredential { epoch } => {
                let tokens = self.tokens.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    let result = tokens.credential().await;
                    sink.emit(EngineEvent::CredentialResolved { epoch, result });
                });
            }
            EngineCommand::FetchCandidateData { epoch } => {
                let tokens = self.tokens.clone();
                let fetcher = self.fetcher.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    let result = match tokens.credential().await {
                        Ok(Some(credential)) => fetcher.fetch(&credential).await,
                        Ok(None) => Err(FetchError::new(
                            FailureKind::NoCredential,
                            "no credential available",
                        )),
                        Err(err) => Err(FetchError::new(FailureKind::NoCredential, err.to_string())),
                    };
                    sink.emit(EngineEvent::CandidateFetched { epoch, result });
                });
            }
            EngineCommand::StartHandshakeTimer { conn, after } => {
                let sink = self.sink.clone();
                let timer = self.runtime.spawn(async move {
                    tokio::time::sleep(after).await;
                    sink.emit(EngineEvent::HandshakeTimerFired { conn });
                });
                if let Some(previous) = self.handshake_timers.insert(conn, timer) {
                    previous.abort();
                }
            }
            EngineCommand::CancelHandshakeTimer { conn } => self.cancel_handshake_timer(conn),
            EngineCommand::ScheduleReconnect { epoch, after } => {
                let sink = self.sink.clone();
                let timer = self.runtime.spawn(async move {
                    tokio::time::sleep(after).await;
                    sink.emit(EngineEvent::ReconnectTimerFired { epoch });
                });
                if let Some(previous) = self.reconnect_timer.replace(timer) {
                    previous.abort();
                }
                chat_debug!("reconnect scheduled in {:?} for epoch {}", after, epoch);
            }
            EngineCommand::CancelReconnect => {
                if let Some(timer) = self.reconnect_timer.take() {
                    timer.abort();
                }
            }
            EngineCommand::SignOut => {
                let tokens = self.tokens.clone();
                self.runtime.spawn(async move {
                    match tokens.sign_out().await {
                        Ok(()) => chat_info!("identity provider session terminated"),
                        Err(err) => chat_warn!("sign-out failed: {}", err),
                    }
                });
            }
            EngineCommand::Shutdown => {}
        }
    }

    fn cancel_handshake_timer(&mut self, conn: ConnectionId) {
        if let Some(timer) = self.handshake_timers.remove(&conn) {
            timer.abort();
        }
    }

    fn shutdown(mut self) {
        for (_, handle) in self.connections.drain() {
            handle.close();
        }
        for (_, timer) in self.handshake_timers.drain() {
            timer.abort();
        }
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }
        self.runtime.shutdown_timeout(Duration::from_millis(500));
    }
}
