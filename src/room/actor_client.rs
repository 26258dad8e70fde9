use tokio::sync::broadcast;
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::Error;
use crate::room::actor::{RoomCommand, RoomEvent, RoomWideEvent};

#[derive(Clone, Debug)]
pub struct RoomClient {
    pub(super) room_tx: Sender<RoomCommand>,
}

impl RoomClient {
    pub async fn join(
        &self,
        conn_id: &str,
        name: Option<&str>,
    ) -> Result<RoomWideEventReceiver, Error> {
        let (tx, rx): (OneshotSender<RoomEvent>, OneshotReceiver<RoomEvent>) = oneshot::channel();

        self.room_tx
            .send(RoomCommand::Join {
                conn_id: conn_id.to_string(),
                name: name.map(str::to_string),
                response_tx: tx,
            })
            .await
            // The registry still knows the room but its actor is gone, which
            // happens when a player re-joins right as the room shuts down
            .map_err(|error| {
                Error::log_and_create_internal(&format!(
                    "The Room is not alive. Can't join. Error: '{error}'."
                ))
            })?;

        match rx.await {
            Ok(RoomEvent::Joined { broadcast_rx }) => Ok(RoomWideEventReceiver { broadcast_rx }),
            Ok(RoomEvent::Error { error }) => Err(error),
            _ => Err(Error::log_and_create_internal(
                "Player sent a RoomCommand::Join to the Room, but the Room channel died.",
            )),
        }
    }

    pub async fn set_secret(
        &self,
        conn_id: &str,
        secret: &str,
        hint: Option<&str>,
        max_wrong: Option<u8>,
    ) -> Result<(), Error> {
        self.send_command(RoomCommand::SetSecret {
            conn_id: conn_id.to_string(),
            secret: secret.to_string(),
            hint: hint.map(str::to_string),
            max_wrong,
        })
        .await
    }

    pub async fn guess(&self, conn_id: &str, letter: &str) -> Result<(), Error> {
        self.send_command(RoomCommand::Guess {
            conn_id: conn_id.to_string(),
            letter: letter.to_string(),
        })
        .await
    }

    /// The only intent answered directly to the caller instead of through
    /// the broadcast channel. `None` when the request was denied.
    pub async fn reveal_secret(&self, conn_id: &str) -> Result<Option<String>, Error> {
        let (tx, rx): (OneshotSender<RoomEvent>, OneshotReceiver<RoomEvent>) = oneshot::channel();

        self.room_tx
            .send(RoomCommand::RevealSecret {
                conn_id: conn_id.to_string(),
                response_tx: tx,
            })
            .await
            .map_err(|error| {
                Error::log_and_create_internal(&format!(
                    "Tried to send RoomCommand::RevealSecret but the RoomActor is not listening. Error: '{error}'."
                ))
            })?;

        match rx.await {
            Ok(RoomEvent::SecretRevealed { secret }) => Ok(Some(secret)),
            Ok(RoomEvent::Error { error }) if error.is_droppable_intent() => Ok(None),
            Ok(RoomEvent::Error { error }) => Err(error),
            _ => Err(Error::log_and_create_internal(
                "Player sent a RoomCommand::RevealSecret to the Room, but the Room channel died.",
            )),
        }
    }

    pub async fn rematch(&self, conn_id: &str) -> Result<(), Error> {
        self.send_command(RoomCommand::Rematch {
            conn_id: conn_id.to_string(),
        })
        .await
    }

    pub async fn chat(&self, conn_id: &str, text: &str) -> Result<(), Error> {
        self.send_command(RoomCommand::Chat {
            conn_id: conn_id.to_string(),
            text: text.to_string(),
        })
        .await
    }

    pub async fn typing(&self, conn_id: &str, is_typing: bool) -> Result<(), Error> {
        self.send_command(RoomCommand::Typing {
            conn_id: conn_id.to_string(),
            is_typing,
        })
        .await
    }

    pub async fn leave(&self, conn_id: &str) -> Result<(), Error> {
        self.send_command(RoomCommand::Leave {
            conn_id: conn_id.to_string(),
        })
        .await
    }

    async fn send_command(&self, command: RoomCommand) -> Result<(), Error> {
        self.room_tx.send(command).await.map_err(|error| {
            Error::log_and_create_internal(&format!(
                "Tried to send a RoomCommand but the RoomActor is not listening. Error: '{error}'."
            ))
        })
    }
}

pub struct RoomWideEventReceiver {
    broadcast_rx: broadcast::Receiver<RoomWideEvent>,
}

impl RoomWideEventReceiver {
    pub async fn next(&mut self) -> Result<RoomWideEvent, Error> {
        self.broadcast_rx.recv().await.map_err(|error| {
            Error::log_and_create_internal(&format!(
                "The broadcast channel with the Room has been closed. Error: '{error}'."
            ))
        })
    }
}
