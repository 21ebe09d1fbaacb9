//! Wire protocol spoken between the browser-style game client and the
//! authoritative game server.
//!
//! Every frame is a JSON text message wrapped in a `{type, data}` envelope.
//! Inbound frames are decoded into [`ServerEvent`]s; outbound intents are
//! [`ClientMessage`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const CANVAS_WIDTH: u16 = 800;
pub const CANVAS_HEIGHT: u16 = 600;
pub const GRID_SPACING: f32 = 50.0;
pub const LABEL_FONT_SIZE: f32 = 20.0;
pub const LABEL_OFFSET: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub player_name: String,
    pub circle: Circle,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodInfo {
    pub circle: Circle,
    pub index: u32,
}

/// Full description of every player and food item the server knows about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub players: Vec<PlayerInfo>,
    #[serde(default)]
    pub food: Vec<FoodInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeft {
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Spawn(PlayerInfo),
    GameState(WorldSnapshot),
    Update(WorldSnapshot),
    PlayerLeft(PlayerLeft),
}

impl ServerEvent {
    /// Whether applying this event can populate the world.
    pub fn carries_entities(&self) -> bool {
        !matches!(self, ServerEvent::PlayerLeft(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Join {
        #[serde(rename = "playerName")]
        player_name: String,
    },
    Move {
        x: i8,
        y: i8,
    },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid `{kind}` payload: {source}")]
    Payload {
        kind: String,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// Decodes one inbound text frame.
///
/// Returns `Ok(None)` for envelope types this client does not understand so
/// newer servers can add messages without breaking older clients.
pub fn decode_server_message(raw: &str) -> Result<Option<ServerEvent>, ProtocolError> {
    let envelope: Envelope = serde_json::from_str(raw)?;

    let event = match envelope.kind.as_str() {
        "spawn" => ServerEvent::Spawn(payload(&envelope)?),
        "gameState" => ServerEvent::GameState(payload(&envelope)?),
        "update" => ServerEvent::Update(payload(&envelope)?),
        "playerLeft" => ServerEvent::PlayerLeft(payload(&envelope)?),
        _ => return Ok(None),
    };

    Ok(Some(event))
}

fn payload<T: for<'de> Deserialize<'de>>(envelope: &Envelope) -> Result<T, ProtocolError> {
    T::deserialize(&envelope.data).map_err(|source| ProtocolError::Payload {
        kind: envelope.kind.clone(),
        source,
    })
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

pub fn encode_server_event(event: &ServerEvent) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_decode_spawn() {
        let raw = r#"{"type":"spawn","data":{"playerName":"bob","circle":{"x":10,"y":20,"radius":5},"alive":true}}"#;

        match decode_server_message(raw).unwrap() {
            Some(ServerEvent::Spawn(player)) => {
                assert_eq!(player.player_name, "bob");
                assert_approx_eq!(player.circle.x, 10.0);
                assert_approx_eq!(player.circle.y, 20.0);
                assert_approx_eq!(player.circle.radius, 5.0);
                assert!(player.alive);
            }
            other => panic!("Expected spawn, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_game_state_and_update() {
        let body = r#"{"players":[{"playerName":"me","circle":{"x":1,"y":1,"radius":3},"alive":true}],"food":[{"circle":{"x":5,"y":5,"radius":1},"index":0}]}"#;

        let state = decode_server_message(&format!(r#"{{"type":"gameState","data":{}}}"#, body))
            .unwrap()
            .unwrap();
        let update = decode_server_message(&format!(r#"{{"type":"update","data":{}}}"#, body))
            .unwrap()
            .unwrap();

        match (state, update) {
            (ServerEvent::GameState(a), ServerEvent::Update(b)) => {
                assert_eq!(a, b);
                assert_eq!(a.players.len(), 1);
                assert_eq!(a.food[0].index, 0);
            }
            other => panic!("Unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_decode_snapshot_without_food() {
        let raw = r#"{"type":"update","data":{"players":[]}}"#;
        match decode_server_message(raw).unwrap() {
            Some(ServerEvent::Update(snapshot)) => assert!(snapshot.food.is_empty()),
            other => panic!("Expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_player_left() {
        let raw = r#"{"type":"playerLeft","data":{"playerName":"bob"}}"#;
        assert_eq!(
            decode_server_message(raw).unwrap(),
            Some(ServerEvent::PlayerLeft(PlayerLeft {
                player_name: "bob".to_string()
            }))
        );
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let raw = r#"{"type":"leaderboard","data":{"top":["bob"]}}"#;
        assert!(decode_server_message(raw).unwrap().is_none());

        let no_data = r#"{"type":"ping"}"#;
        assert!(decode_server_message(no_data).unwrap().is_none());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = decode_server_message("{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn test_bad_payload_names_the_type() {
        let raw = r#"{"type":"spawn","data":{"playerName":"bob"}}"#;
        match decode_server_message(raw).unwrap_err() {
            ProtocolError::Payload { kind, .. } => assert_eq!(kind, "spawn"),
            other => panic!("Expected payload error, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_join() {
        let json = encode_client_message(&ClientMessage::Join {
            player_name: "alice".to_string(),
        })
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "join");
        assert_eq!(value["data"]["playerName"], "alice");
    }

    #[test]
    fn test_encode_move() {
        let json = encode_client_message(&ClientMessage::Move { x: -1, y: 1 }).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "move");
        assert_eq!(value["data"]["x"], -1);
        assert_eq!(value["data"]["y"], 1);
    }

    #[test]
    fn test_server_event_encoding_matches_decoder() {
        let event = ServerEvent::PlayerLeft(PlayerLeft {
            player_name: "carol".to_string(),
        });
        let json = encode_server_event(&event).unwrap();
        assert!(json.contains(r#""type":"playerLeft""#));
        assert_eq!(decode_server_message(&json).unwrap(), Some(event));
    }

    #[test]
    fn test_only_player_left_carries_no_entities() {
        assert!(ServerEvent::GameState(WorldSnapshot::default()).carries_entities());
        assert!(!ServerEvent::PlayerLeft(PlayerLeft {
            player_name: "x".to_string()
        })
        .carries_entities());
    }
}
