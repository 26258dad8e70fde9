pub mod actor;
pub mod actor_client;

use rand::distributions::{Alphanumeric, DistString};
use std::collections::HashMap;

use crate::config::GameSettings;
use crate::registry::actor_client::RoomRegistryClient;
use crate::room::actor::RoomActor;
use crate::room::actor_client::RoomClient;

/// The in-memory room store. Rooms exist only while occupied: a join against
/// an unknown id spawns a fresh room under that id, and a room actor removes
/// itself here once its last player leaves.
pub struct RoomRegistry {
    room_channels: HashMap<String, RoomClient>,
    game_settings: GameSettings,
}

impl RoomRegistry {
    const ROOM_ID_LENGTH: usize = 8;

    pub fn new(game_settings: GameSettings) -> Self {
        RoomRegistry {
            room_channels: HashMap::default(),
            game_settings,
        }
    }

    pub fn create_room(&mut self, registry: RoomRegistryClient) -> String {
        let id = self.create_unique_room_id();
        self.room_channels.insert(
            id.clone(),
            RoomActor::spawn(&id, self.game_settings.clone(), registry),
        );

        id
    }

    pub fn get_or_create_room(
        &mut self,
        room_id: &str,
        registry: RoomRegistryClient,
    ) -> RoomClient {
        self.room_channels
            .entry(room_id.to_string())
            .or_insert_with(|| RoomActor::spawn(room_id, self.game_settings.clone(), registry))
            .clone()
    }

    pub fn remove_room(&mut self, room_id: &str) -> Option<RoomClient> {
        self.room_channels.remove(room_id)
    }

    fn create_unique_room_id(&self) -> String {
        loop {
            let id = Alphanumeric
                .sample_string(&mut rand::thread_rng(), RoomRegistry::ROOM_ID_LENGTH)
                .replace('O', "P")
                .replace('0', "1")
                .replace('I', "J")
                .replace('l', "m");
            if !self.room_channels.contains_key(&id) {
                return id;
            }
        }
    }
}
