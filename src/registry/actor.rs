use std::fmt::{Display, Formatter};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot::Sender as OneshotSender;

use crate::config::GameSettings;
use crate::registry::actor_client::RoomRegistryClient;
use crate::registry::RoomRegistry;
use crate::room::actor_client::RoomClient;

pub struct RoomRegistryActor {
    registry: RoomRegistry,
    registry_rx: Receiver<RoomRegistryCommand>,
    registry_tx: Sender<RoomRegistryCommand>,
}

impl RoomRegistryActor {
    /// Runs the RoomRegistry actor in background and returns a client to
    /// communicate with it.
    pub fn spawn(game_settings: GameSettings) -> RoomRegistryClient {
        let registry = RoomRegistry::new(game_settings);
        let (registry_tx, registry_rx): (
            Sender<RoomRegistryCommand>,
            Receiver<RoomRegistryCommand>,
        ) = mpsc::channel(512);

        tokio::spawn(
            RoomRegistryActor {
                registry,
                registry_rx,
                registry_tx: registry_tx.clone(),
            }
            .start(),
        );

        RoomRegistryClient { registry_tx }
    }

    async fn start(mut self) {
        while let Some(message) = self.registry_rx.recv().await {
            let response = match message {
                RoomRegistryCommand::CreateRoom { response_channel } => {
                    let room_id = self.registry.create_room(self.client());
                    Some((
                        RoomRegistryResponse::RoomCreated { room_id },
                        response_channel,
                    ))
                }
                RoomRegistryCommand::GetOrCreateRoom {
                    room_id,
                    response_channel,
                } => {
                    let room = self.registry.get_or_create_room(&room_id, self.client());
                    Some((RoomRegistryResponse::RoomActor { room }, response_channel))
                }
                RoomRegistryCommand::RemoveRoom { room_id } => {
                    let _ = self.registry.remove_room(&room_id);
                    None
                }
            };
            if let Some((event, response_tx)) = response {
                if let Err(error) = response_tx.send(event) {
                    log::error!("Sent RoomRegistryResponse but the response channel is closed. Error: '{error}'.");
                }
            }
        }
    }

    fn client(&self) -> RoomRegistryClient {
        RoomRegistryClient {
            registry_tx: self.registry_tx.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum RoomRegistryCommand {
    CreateRoom {
        response_channel: OneshotSender<RoomRegistryResponse>,
    },
    GetOrCreateRoom {
        room_id: String,
        response_channel: OneshotSender<RoomRegistryResponse>,
    },
    RemoveRoom {
        room_id: String,
    },
}

#[allow(clippy::enum_variant_names)]
#[derive(Debug)]
pub(crate) enum RoomRegistryResponse {
    RoomCreated { room_id: String },
    RoomActor { room: RoomClient },
}

impl Display for RoomRegistryResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                RoomRegistryResponse::RoomCreated { room_id } =>
                    format!("RoomCreated(room_id: {room_id})"),
                RoomRegistryResponse::RoomActor { room: _ } => "RoomActor".to_string(),
            }
        )
    }
}
