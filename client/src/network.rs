//! WebSocket transport to the game server
//!
//! The socket lives on a tokio task. It never touches game state: everything it
//! hears is forwarded as a [`GameEvent`] into the session's queue, tagged with
//! the generation of the connection that produced it.

use crate::error::ClientError;
use crate::input::KeyEvent;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{error, info, warn};
use shared::{encode_client_message, ClientMessage};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The (serverId, gameId) pair a lobby hands out for one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTarget {
    pub server_id: String,
    pub game_id: String,
}

impl GameTarget {
    pub fn new(server_id: impl Into<String>, game_id: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            game_id: game_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Connected,
    Disconnected(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }

    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Idle => "idle".to_string(),
            ConnectionStatus::Connecting => "connecting".to_string(),
            ConnectionStatus::Connected => "connected".to_string(),
            ConnectionStatus::Disconnected(reason) => format!("disconnected: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    /// Socket is open and the join handshake has been written.
    Opened,
    Frame(String),
    Closed(Option<String>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Net { generation: u64, event: NetEvent },
    Key(KeyEvent),
}

pub type EventSender = mpsc::UnboundedSender<GameEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<GameEvent>;

/// Everything a connector needs to open one game connection.
pub struct ConnectRequest<'a> {
    pub target: &'a GameTarget,
    pub token: &'a str,
    pub player_name: &'a str,
    pub generation: u64,
    pub events: EventSender,
}

/// Outbound half of a live connection.
pub trait Transport {
    fn send(&mut self, message: &ClientMessage) -> Result<(), ClientError>;

    /// Closes the connection. Calling it again is a no-op.
    fn close(&mut self);
}

pub trait Connector {
    type Transport: Transport;

    fn connect(&mut self, request: ConnectRequest<'_>) -> Result<Self::Transport, ClientError>;
}

pub fn connection_uri(endpoint: &str, target: &GameTarget, token: &str) -> String {
    format!(
        "{}/server/{}/connect/{}?token={}",
        endpoint.trim_end_matches('/'),
        target.server_id,
        target.game_id,
        token
    )
}

/// Opens real WebSocket connections on a tokio runtime.
pub struct WsConnector {
    runtime: Handle,
    endpoint: String,
}

impl WsConnector {
    pub fn new(runtime: Handle, endpoint: impl Into<String>) -> Self {
        Self {
            runtime,
            endpoint: endpoint.into(),
        }
    }
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    fn connect(&mut self, request: ConnectRequest<'_>) -> Result<WsTransport, ClientError> {
        let uri = connection_uri(&self.endpoint, request.target, request.token);
        let join = encode_client_message(&ClientMessage::Join {
            player_name: request.player_name.to_string(),
        })?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!(
            "Connecting to game {} on server {}",
            request.target.game_id, request.target.server_id
        );

        self.runtime.spawn(run_socket(
            uri,
            join,
            request.generation,
            request.events,
            outbound_rx,
            shutdown_rx,
        ));

        Ok(WsTransport {
            outbound: Some(outbound_tx),
            shutdown: Some(shutdown_tx),
        })
    }
}

pub struct WsTransport {
    outbound: Option<mpsc::UnboundedSender<String>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Transport for WsTransport {
    fn send(&mut self, message: &ClientMessage) -> Result<(), ClientError> {
        let outbound = self.outbound.as_ref().ok_or(ClientError::ChannelClosed)?;
        let text = encode_client_message(message)?;
        outbound.send(text).map_err(|_| ClientError::ChannelClosed)
    }

    fn close(&mut self) {
        self.outbound = None;
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already be gone after a remote close
            let _ = shutdown.send(());
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_socket(
    uri: String,
    join: String,
    generation: u64,
    events: EventSender,
    mut outbound: mpsc::UnboundedReceiver<String>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let notify = |event: NetEvent| {
        // The session is gone once the receiver drops; nothing left to tell
        let _ = events.send(GameEvent::Net { generation, event });
    };

    let (mut sink, mut stream) = tokio::select! {
        result = open_socket(&uri, join) => match result {
            Ok(halves) => halves,
            Err(e) => {
                error!("Failed to connect: {}", e);
                notify(NetEvent::Failed(e.to_string()));
                return;
            }
        },
        _ = &mut shutdown => return,
    };

    info!("Connected, join sent");
    notify(NetEvent::Opened);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                let _ = sink.close().await;
                info!("Connection closed");
                break;
            }

            Some(text) = outbound.recv() => {
                if let Err(e) = sink.send(Message::text(text)).await {
                    error!("Error sending message: {}", e);
                    notify(NetEvent::Failed(e.to_string()));
                    break;
                }
            }

            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => notify(NetEvent::Frame(text.as_str().to_owned())),
                Some(Ok(Message::Close(close))) => {
                    let reason = close.map(|c| c.reason.as_str().to_owned());
                    warn!("Server closed the connection: {:?}", reason);
                    notify(NetEvent::Closed(reason));
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("Error receiving frame: {}", e);
                    notify(NetEvent::Failed(e.to_string()));
                    break;
                }
                None => {
                    warn!("Connection dropped");
                    notify(NetEvent::Closed(None));
                    break;
                }
            },
        }
    }
}

/// Opens the socket and sends `join` before anything else goes out.
async fn open_socket(
    uri: &str,
    join: String,
) -> Result<(SplitSink<Socket, Message>, SplitStream<Socket>), ClientError> {
    let (socket, _) = connect_async(uri).await?;
    let (mut sink, stream) = socket.split();
    sink.send(Message::text(join)).await?;
    Ok((sink, stream))
}
