use log::debug;
use shared::{Circle, FoodInfo, PlayerInfo, ServerEvent, WorldSnapshot};
use std::collections::HashMap;

/// A player circle as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBlob {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub alive: bool,
}

impl From<&PlayerInfo> for PlayerBlob {
    fn from(info: &PlayerInfo) -> Self {
        Self {
            x: info.circle.x,
            y: info.circle.y,
            r: info.circle.radius,
            alive: info.alive,
        }
    }
}

pub type FoodBlob = Circle;

/// Local mirror of the server's world.
///
/// The server is authoritative: every entity is replaced wholesale by what the
/// latest message says, nothing is predicted or interpolated locally.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    player_name: String,
    pub me: Option<PlayerBlob>,
    pub others: HashMap<String, PlayerBlob>,
    pub food: HashMap<u32, FoodBlob>,
}

impl WorldState {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            me: None,
            others: HashMap::new(),
            food: HashMap::new(),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn apply_event(&mut self, event: ServerEvent) {
        match event {
            // Spawns always land in the remote table, even for our own name;
            // the next snapshot is what establishes the local player.
            ServerEvent::Spawn(player) => {
                debug!("Spawn: {}", player.player_name);
                let blob = PlayerBlob::from(&player);
                self.others.insert(player.player_name, blob);
            }

            ServerEvent::GameState(snapshot) | ServerEvent::Update(snapshot) => {
                self.apply_snapshot(&snapshot);
            }

            ServerEvent::PlayerLeft(left) => {
                if self.others.remove(&left.player_name).is_some() {
                    debug!("Player left: {}", left.player_name);
                }
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: &WorldSnapshot) {
        for player in &snapshot.players {
            let blob = PlayerBlob::from(player);
            if player.player_name == self.player_name {
                self.me = Some(blob);
            } else {
                self.others.insert(player.player_name.clone(), blob);
            }
        }

        // Food is never retracted; entries live until the server resends the index
        for FoodInfo { circle, index } in &snapshot.food {
            self.food.insert(*index, *circle);
        }
    }

    pub fn clear(&mut self) {
        self.me = None;
        self.others.clear();
        self.food.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.me.is_none() && self.others.is_empty() && self.food.is_empty()
    }

    pub fn live_self(&self) -> Option<&PlayerBlob> {
        self.me.as_ref().filter(|me| me.alive)
    }

    /// Player count shown in the HUD, the local player included.
    pub fn player_count(&self) -> usize {
        self.others.len() + usize::from(self.me.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PlayerLeft;

    fn player(name: &str, x: f32, y: f32, radius: f32, alive: bool) -> PlayerInfo {
        PlayerInfo {
            player_name: name.to_string(),
            circle: Circle::new(x, y, radius),
            alive,
        }
    }

    fn snapshot(players: Vec<PlayerInfo>, food: Vec<FoodInfo>) -> WorldSnapshot {
        WorldSnapshot { players, food }
    }

    #[test]
    fn test_world_creation() {
        let world = WorldState::new("me");
        assert_eq!(world.player_name(), "me");
        assert!(world.is_empty());
        assert_eq!(world.player_count(), 0);
    }

    #[test]
    fn test_spawn_upserts_remote() {
        let mut world = WorldState::new("me");
        world.apply_event(ServerEvent::Spawn(player("bob", 10.0, 20.0, 5.0, true)));

        assert_eq!(
            world.others.get("bob"),
            Some(&PlayerBlob {
                x: 10.0,
                y: 20.0,
                r: 5.0,
                alive: true
            })
        );

        world.apply_event(ServerEvent::Spawn(player("bob", 11.0, 21.0, 6.0, false)));
        assert_eq!(world.others.len(), 1);
        assert_eq!(world.others["bob"].r, 6.0);
        assert!(!world.others["bob"].alive);
    }

    #[test]
    fn test_spawn_with_own_name_goes_to_remote_table() {
        let mut world = WorldState::new("me");
        world.apply_event(ServerEvent::Spawn(player("me", 1.0, 1.0, 1.0, true)));

        assert!(world.me.is_none());
        assert!(world.others.contains_key("me"));
    }

    #[test]
    fn test_snapshot_routes_self_and_food() {
        let mut world = WorldState::new("me");
        world.apply_event(ServerEvent::GameState(snapshot(
            vec![player("me", 1.0, 1.0, 3.0, true), player("bob", 9.0, 9.0, 4.0, true)],
            vec![FoodInfo {
                circle: Circle::new(5.0, 5.0, 1.0),
                index: 0,
            }],
        )));

        assert_eq!(
            world.me,
            Some(PlayerBlob {
                x: 1.0,
                y: 1.0,
                r: 3.0,
                alive: true
            })
        );
        assert_eq!(world.food.get(&0), Some(&Circle::new(5.0, 5.0, 1.0)));
        assert!(world.others.contains_key("bob"));
        assert!(!world.others.contains_key("me"));
        assert_eq!(world.player_count(), 2);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let event = ServerEvent::Update(snapshot(
            vec![player("me", 3.0, 4.0, 2.0, true), player("eve", 7.0, 8.0, 9.0, false)],
            vec![
                FoodInfo {
                    circle: Circle::new(1.0, 2.0, 0.5),
                    index: 3,
                },
                FoodInfo {
                    circle: Circle::new(2.0, 3.0, 0.5),
                    index: 4,
                },
            ],
        ));

        let mut world = WorldState::new("me");
        world.apply_event(event.clone());
        let once = world.clone();
        world.apply_event(event);

        assert_eq!(world, once);
    }

    #[test]
    fn test_food_persists_until_overwritten() {
        let mut world = WorldState::new("me");
        let food = |index, x| FoodInfo {
            circle: Circle::new(x, 0.0, 1.0),
            index,
        };

        world.apply_event(ServerEvent::Update(snapshot(vec![], vec![food(0, 1.0), food(1, 2.0)])));
        world.apply_event(ServerEvent::Update(snapshot(vec![], vec![food(1, 5.0)])));

        assert_eq!(world.food.len(), 2);
        assert_eq!(world.food[&0].x, 1.0);
        assert_eq!(world.food[&1].x, 5.0);
    }

    #[test]
    fn test_spawn_then_player_left() {
        let mut world = WorldState::new("me");
        world.apply_event(ServerEvent::Spawn(player("bob", 0.0, 0.0, 1.0, true)));
        world.apply_event(ServerEvent::PlayerLeft(PlayerLeft {
            player_name: "bob".to_string(),
        }));

        assert!(!world.others.contains_key("bob"));
    }

    #[test]
    fn test_player_left_for_unknown_name_is_noop() {
        let mut world = WorldState::new("me");
        world.apply_event(ServerEvent::Spawn(player("bob", 0.0, 0.0, 1.0, true)));
        let before = world.clone();

        world.apply_event(ServerEvent::PlayerLeft(PlayerLeft {
            player_name: "nobody".to_string(),
        }));

        assert_eq!(world, before);
    }

    #[test]
    fn test_live_self_requires_alive() {
        let mut world = WorldState::new("me");
        assert!(world.live_self().is_none());

        world.apply_event(ServerEvent::GameState(snapshot(
            vec![player("me", 1.0, 1.0, 1.0, false)],
            vec![],
        )));
        assert!(world.me.is_some());
        assert!(world.live_self().is_none());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut world = WorldState::new("me");
        world.apply_event(ServerEvent::GameState(snapshot(
            vec![player("me", 1.0, 1.0, 1.0, true), player("bob", 2.0, 2.0, 1.0, true)],
            vec![FoodInfo {
                circle: Circle::new(0.0, 0.0, 1.0),
                index: 7,
            }],
        )));

        world.clear();
        assert!(world.is_empty());
        assert_eq!(world.player_name(), "me");
    }
}
