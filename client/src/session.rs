//! One mounted game view: the connection, the reconciled world, the held keys
//! and the render loop state, driven from a single event queue.
//!
//! Socket events and key events land in the same unbounded channel and are
//! applied strictly in arrival order on the render thread. The session is the
//! only writer of [`WorldState`]; the renderer gets a shared borrow per frame.

use crate::camera::Camera;
use crate::error::ClientError;
use crate::game::WorldState;
use crate::input::InputManager;
use crate::network::{
    ConnectRequest, ConnectionStatus, Connector, EventReceiver, EventSender, GameEvent,
    GameTarget, NetEvent, Transport,
};
use crate::rendering::FrameView;
use log::{debug, info, warn};
use shared::decode_server_message;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Mounted, but nothing worth drawing has arrived yet
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub player_name: String,
    pub token: String,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
}

struct Connection<T> {
    target: GameTarget,
    generation: u64,
    transport: T,
}

pub struct Session<C: Connector> {
    connector: C,
    token: String,
    events_tx: EventSender,
    events_rx: EventReceiver,

    world: WorldState,
    input: InputManager,
    camera: Camera,

    status: ConnectionStatus,
    loop_state: LoopState,
    connection: Option<Connection<C::Transport>>,
    last_target: Option<GameTarget>,
    generation: u64,
}

impl<C: Connector> Session<C> {
    pub fn new(connector: C, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Session {
            connector,
            token: config.token,
            events_tx,
            events_rx,
            world: WorldState::new(config.player_name),
            input: InputManager::new(),
            camera: Camera::new(config.width, config.height, config.zoom),
            status: ConnectionStatus::Idle,
            loop_state: LoopState::Idle,
            connection: None,
            last_target: None,
            generation: 0,
        }
    }

    /// Handle for feeding key events into the session queue.
    pub fn event_sender(&self) -> EventSender {
        self.events_tx.clone()
    }

    /// Opens a connection to `target`, tearing down any live one first.
    ///
    /// The world is emptied before the new join handshake can go out, so
    /// nothing from the previous game survives the switch.
    pub fn connect(&mut self, target: GameTarget) -> Result<(), ClientError> {
        if self.loop_state == LoopState::Stopped {
            return Err(ClientError::SessionStopped);
        }

        self.close_connection();
        self.world.clear();
        self.loop_state = LoopState::Idle;

        self.generation += 1;
        self.status = ConnectionStatus::Connecting;
        self.last_target = Some(target.clone());

        let request = ConnectRequest {
            target: &target,
            token: &self.token,
            player_name: self.world.player_name(),
            generation: self.generation,
            events: self.events_tx.clone(),
        };

        match self.connector.connect(request) {
            Ok(transport) => {
                self.connection = Some(Connection {
                    target,
                    generation: self.generation,
                    transport,
                });
                Ok(())
            }
            Err(e) => {
                self.status = ConnectionStatus::Disconnected(e.to_string());
                Err(e)
            }
        }
    }

    /// Reconnects to the most recently requested game, whether or not that
    /// attempt succeeded.
    pub fn reconnect(&mut self) -> Result<(), ClientError> {
        let target = self.last_target.clone().ok_or(ClientError::NoTarget)?;

        info!("Reconnecting to game {}", target.game_id);
        self.connect(target)
    }

    fn close_connection(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            info!(
                "Closing connection to game {} (generation {})",
                connection.target.game_id, connection.generation
            );
            connection.transport.close();
        }
    }

    /// Applies every queued event in arrival order.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        if self.loop_state == LoopState::Stopped {
            return;
        }

        match event {
            GameEvent::Key(key) => self.input.handle_event(key),

            GameEvent::Net { generation, event } => {
                if generation != self.generation {
                    debug!("Dropping event from stale connection {}", generation);
                    return;
                }
                self.handle_net_event(event);
            }
        }
    }

    fn handle_net_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::Opened => {
                info!("Joined as {}", self.world.player_name());
                self.status = ConnectionStatus::Connected;
            }
            NetEvent::Frame(raw) => self.dispatch(&raw),
            NetEvent::Closed(reason) => {
                let reason = reason
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "closed by server".to_string());
                self.status = ConnectionStatus::Disconnected(reason);
            }
            NetEvent::Failed(reason) => {
                self.status = ConnectionStatus::Disconnected(reason);
            }
        }
    }

    /// Decodes one inbound frame and applies it to the world.
    ///
    /// Bad frames are logged and dropped; the world keeps its previous state.
    pub fn dispatch(&mut self, raw: &str) {
        match decode_server_message(raw) {
            Ok(Some(event)) => {
                let populates = event.carries_entities();
                self.world.apply_event(event);

                if populates && self.loop_state == LoopState::Idle {
                    debug!("First world data received, starting render loop");
                    self.loop_state = LoopState::Running;
                }
            }
            Ok(None) => debug!("Ignoring unknown message type"),
            Err(e) => warn!("Dropping frame: {}", e),
        }
    }

    /// Runs one render-loop iteration and returns what should be drawn.
    ///
    /// Drains the event queue, points the camera at the local player and sends
    /// the current movement intent. Returns `None` once the session has been
    /// torn down.
    ///
    /// The intent goes out before the caller draws the returned view. Both use
    /// the same drained state and nothing is received in between, so the wire
    /// sees one move per frame just as it would after the draw.
    pub fn tick(&mut self) -> Option<FrameView<'_>> {
        if self.loop_state == LoopState::Stopped {
            return None;
        }

        self.pump();
        self.camera.follow(self.world.me.as_ref());
        self.send_intent();

        Some(FrameView {
            world: (self.loop_state == LoopState::Running).then_some(&self.world),
            camera: self.camera,
            status: &self.status,
        })
    }

    /// Continuous intent: a move goes out every frame a direction is held.
    fn send_intent(&mut self) {
        let intent = self.input.sample();
        if intent.is_zero() || !self.status.is_connected() {
            return;
        }

        if let Some(connection) = self.connection.as_mut() {
            if let Err(e) = connection.transport.send(&intent.to_message()) {
                debug!("Move not sent: {}", e);
            }
        }
    }

    /// Unmounts the view: stops listening to keys, closes the socket and
    /// stops the loop. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.loop_state == LoopState::Stopped {
            return;
        }

        info!("Shutting down game session");
        self.input.detach();
        self.close_connection();
        self.loop_state = LoopState::Stopped;
        self.status = ConnectionStatus::Idle;
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
