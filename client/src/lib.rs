//! # Game Client Library
//!
//! Client side of a multiplayer blob game. The server is authoritative over
//! every position; this crate keeps a mirror of what it reports, draws that
//! mirror once per display refresh and streams movement intents back.
//!
//! ## Architecture Overview
//!
//! Three kinds of events drive the client, all applied on the render thread in
//! arrival order:
//! - frames and status changes from the game server socket,
//! - key presses and releases,
//! - the frame tick itself.
//!
//! The socket runs on a tokio task and only ever forwards what it hears into
//! the session's queue, so the world state has exactly one writer and needs
//! no locking.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! WebSocket connection to the game server:
//! - Connection URI built from server id, game id and identity token
//! - `join` handshake as soon as the socket opens
//! - Generation-tagged events so a replaced connection cannot leak frames
//! - Connection status for the HUD
//!
//! ### Game Module (`game`)
//! The reconciled world: the local player, other players and food, replaced
//! wholesale by each spawn, state or update message.
//!
//! ### Input Module (`input`)
//! Held-key table and the per-frame movement vector derived from it.
//!
//! ### Session Module (`session`)
//! Ties a mounted game view to its connection: message dispatch, the render
//! loop state machine, intent sending and guaranteed teardown.
//!
//! ### Camera and Rendering Modules (`camera`, `rendering`)
//! World-to-screen transform centred on the local player, and the macroquad
//! drawing of grid, food, players, name labels and status overlay.
//!
//! ### Auth Module (`auth`)
//! Identity token and display name resolution.
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::network::{GameTarget, WsConnector};
//! use client::session::{Session, SessionConfig};
//!
//! # fn demo(runtime: tokio::runtime::Handle) -> Result<(), client::error::ClientError> {
//! let connector = WsConnector::new(runtime, "wss://game.example.com");
//! let mut session = Session::new(
//!     connector,
//!     SessionConfig {
//!         player_name: "alice".to_string(),
//!         token: String::new(),
//!         width: 800.0,
//!         height: 600.0,
//!         zoom: 1.0,
//!     },
//! );
//! session.connect(GameTarget::new("server-1", "game-7"))?;
//!
//! // Once per frame
//! if let Some(frame) = session.tick() {
//!     let _ = frame.world;
//! }
//!
//! session.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod camera;
pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod session;
