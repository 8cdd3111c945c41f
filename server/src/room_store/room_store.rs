use std::collections::{hash_map::Entry, HashMap};

use comms::room::{validate_room_name, RoomConfig};
use tokio::sync::RwLock;

use super::{RoomUrlResolver, StoreError};

#[derive(Debug)]
/// [RoomStore] keeps the configuration of every room registered by the clients.
///
/// A single store is shared by all the sessions, reads may run in parallel
/// while a create or update holds the map exclusively.
pub struct RoomStore {
    rooms: RwLock<HashMap<String, RoomConfig>>,
    url_resolver: RoomUrlResolver,
}

impl RoomStore {
    pub fn new(url_resolver: RoomUrlResolver) -> Self {
        RoomStore {
            rooms: RwLock::new(HashMap::new()),
            url_resolver,
        }
    }

    /// Registers `config` under `name`.
    /// Fails if the name is not a valid room name or a room with the same name already exists,
    /// the existing config is left untouched in that case.
    pub async fn create_room(&self, name: &str, config: RoomConfig) -> Result<(), StoreError> {
        validate_room_name(name).map_err(|cause| StoreError::InvalidRoomName {
            name: String::from(name),
            cause,
        })?;

        let mut rooms = self.rooms.write().await;

        match rooms.entry(String::from(name)) {
            Entry::Occupied(_) => Err(StoreError::RoomAlreadyExists(String::from(name))),
            Entry::Vacant(entry) => {
                entry.insert(config);
                log::info!("room '{}' created", name);

                Ok(())
            }
        }
    }

    /// Returns the stored config, `None` for rooms nobody has created
    pub async fn get_room_config(&self, name: &str) -> Option<RoomConfig> {
        self.rooms.read().await.get(name).cloned()
    }

    /// Replaces the config of a room created earlier
    pub async fn update_room_config(
        &self,
        name: &str,
        config: RoomConfig,
    ) -> Result<(), StoreError> {
        let mut rooms = self.rooms.write().await;

        let stored = rooms
            .get_mut(name)
            .ok_or_else(|| StoreError::RoomNotFound(String::from(name)))?;
        *stored = config;
        log::info!("room '{}' config updated", name);

        Ok(())
    }

    /// Derives the join URL, the room does not need to exist
    pub fn get_room_url(&self, name: &str) -> String {
        self.url_resolver.resolve(name)
    }
}
