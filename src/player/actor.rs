use axum::extract::ws::{Message, WebSocket};
use std::time::Duration;
use tokio::select;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::metrics::CONNECTED_PLAYERS;
use crate::player::generate_connection_id;
use crate::registry::actor_client::RoomRegistryClient;
use crate::room::actor::RoomWideEvent;
use crate::room::actor_client::{RoomClient, RoomWideEventReceiver};
use crate::websocket::message::{StateDto, WsMessageIn, WsMessageOut};
use crate::websocket::{close, parse_message, send_error, send_message, send_message_string};

/// One actor per websocket connection. Starts roomless; `createRoom` or
/// `joinRoom` binds it to a room session, and every later intent must carry
/// that session's room id or it is dropped.
pub struct PlayerActor {
    conn_id: String,
    registry: RoomRegistryClient,
    websocket: WebSocket,
    session: Option<Session>,
    inactivity_timeout: Duration,
}

struct Session {
    room_id: String,
    room: RoomClient,
    room_wide_event_receiver: RoomWideEventReceiver,
}

enum Input {
    Room(Result<RoomWideEvent, Error>),
    Socket(Result<Option<Result<Message, axum::Error>>, Elapsed>),
}

impl PlayerActor {
    pub async fn create(registry: RoomRegistryClient, websocket: WebSocket) {
        PlayerActor {
            conn_id: generate_connection_id(),
            registry,
            websocket,
            session: None,
            inactivity_timeout: Duration::from_secs(35),
        }
        .start()
        .await
    }

    async fn start(mut self) {
        CONNECTED_PLAYERS.inc();

        loop {
            let input = match self.session.as_mut() {
                Some(session) => {
                    select! {
                        event = session.room_wide_event_receiver.next() => Input::Room(event),
                        message = timeout(self.inactivity_timeout, self.websocket.recv()) => Input::Socket(message),
                    }
                }
                None => Input::Socket(timeout(self.inactivity_timeout, self.websocket.recv()).await),
            };

            let result = match input {
                Input::Room(event) => self.receive_room_wide_event(event).await,
                Input::Socket(message) => self.receive_websocket_message(message).await,
            };
            if let Err(error) = result {
                send_error(&mut self.websocket, &error).await;
                if PlayerActor::should_close_websocket(&error) {
                    break;
                }
            }
        }

        if let Some(session) = &self.session {
            let _ = session.room.leave(&self.conn_id).await;
        }
        close(self.websocket).await;
        CONNECTED_PLAYERS.dec();
    }

    fn should_close_websocket(error: &Error) -> bool {
        match error {
            Error::Internal(_) => true,
            Error::WebsocketClosed(_) => true,
            Error::UnprocessableMessage(_, _) => false,
            Error::Domain(_) => false,
        }
    }

    async fn receive_room_wide_event(
        &mut self,
        event: Result<RoomWideEvent, Error>,
    ) -> Result<(), Error> {
        match event? {
            RoomWideEvent::RoomState { snapshot } => {
                send_message(
                    &mut self.websocket,
                    &WsMessageOut::State {
                        state: StateDto::from_snapshot(snapshot, &self.conn_id),
                    },
                )
                .await
            }
            RoomWideEvent::RoundOver { outcome } => {
                send_message(
                    &mut self.websocket,
                    &WsMessageOut::RoundOver {
                        outcome: outcome.into(),
                    },
                )
                .await
            }
            RoomWideEvent::ChatMessage { from, text } => {
                send_message(&mut self.websocket, &WsMessageOut::Chat { from, text }).await
            }
            RoomWideEvent::Typing {
                conn_id,
                from,
                is_typing,
            } => {
                // Typing indicators are for the other player only
                if conn_id == self.conn_id {
                    return Ok(());
                }
                send_message(&mut self.websocket, &WsMessageOut::Typing { from, is_typing }).await
            }
            RoomWideEvent::SystemMessage { text } => {
                send_message(&mut self.websocket, &WsMessageOut::SystemMsg { text }).await
            }
        }
    }

    async fn receive_websocket_message(
        &mut self,
        websocket_message: Result<Option<Result<Message, axum::Error>>, Elapsed>,
    ) -> Result<(), Error> {
        match websocket_message {
            Ok(Some(Ok(Message::Text(txt)))) => match txt.as_str() {
                "ping" => send_message_string(&mut self.websocket, "pong").await,
                message => {
                    let message = parse_message(message)?;
                    self.handle_intent(message).await
                }
            },
            // browser said "close"
            Ok(Some(Ok(Message::Close(_)))) => {
                self.log_connection_lost("browser sent 'Close' websocket frame");
                Err(Error::WebsocketClosed(
                    "browser sent 'Close' websocket frame".to_string(),
                ))
            }
            // websocket was closed
            Ok(None) => {
                self.log_connection_lost("other end of websocket was closed abruptly");
                Err(Error::WebsocketClosed(
                    "other end of websocket was closed abruptly".to_string(),
                ))
            }
            // timeout without receiving anything from the player
            Err(_) => {
                self.log_connection_lost("connection timed out; missing 'ping' messages");
                Err(Error::WebsocketClosed(
                    "connection timed out; missing 'ping' messages".to_string(),
                ))
            }
            Ok(Some(Err(error))) => Err(Error::UnprocessableMessage(
                "Message cannot be loaded".to_string(),
                error.to_string(),
            )),
            Ok(Some(Ok(_))) => Err(Error::UnprocessableMessage(
                "Unsupported message type".to_string(),
                "Unsupported message type".to_string(),
            )),
        }
    }

    async fn handle_intent(&mut self, message: WsMessageIn) -> Result<(), Error> {
        match message {
            WsMessageIn::CreateRoom { name } => {
                if self.session.is_some() {
                    self.log_dropped_intent("createRoom while already in a room");
                    return Ok(());
                }
                let room_id = self.registry.create_room().await?;
                send_message(
                    &mut self.websocket,
                    &WsMessageOut::RoomCreated {
                        room_id: room_id.clone(),
                    },
                )
                .await?;
                self.join_room(&room_id, name.as_deref()).await
            }
            WsMessageIn::JoinRoom { room_id, name } => {
                if self.session.is_some() {
                    self.log_dropped_intent("joinRoom while already in a room");
                    return Ok(());
                }
                let room_id = room_id.trim().to_string();
                if room_id.is_empty() {
                    return Err(Error::UnprocessableMessage(
                        "The roomId is empty".to_string(),
                        "joinRoom".to_string(),
                    ));
                }
                self.join_room(&room_id, name.as_deref()).await
            }
            WsMessageIn::SetSecret {
                room_id,
                secret,
                hint,
                max_wrong,
            } => match self.room_for(&room_id) {
                Some(room) => {
                    room.set_secret(&self.conn_id, &secret, hint.as_deref(), max_wrong)
                        .await
                }
                None => Ok(()),
            },
            WsMessageIn::Guess { room_id, letter } => match self.room_for(&room_id) {
                Some(room) => room.guess(&self.conn_id, &letter).await,
                None => Ok(()),
            },
            WsMessageIn::RequestSecretReveal { room_id } => match self.room_for(&room_id) {
                Some(room) => {
                    if let Some(secret) = room.reveal_secret(&self.conn_id).await? {
                        send_message(&mut self.websocket, &WsMessageOut::SecretReveal { secret })
                            .await?;
                    }
                    Ok(())
                }
                None => Ok(()),
            },
            WsMessageIn::Rematch { room_id } => match self.room_for(&room_id) {
                Some(room) => room.rematch(&self.conn_id).await,
                None => Ok(()),
            },
            WsMessageIn::Chat { room_id, text } => match self.room_for(&room_id) {
                Some(room) => room.chat(&self.conn_id, &text).await,
                None => Ok(()),
            },
            WsMessageIn::Typing { room_id, is_typing } => match self.room_for(&room_id) {
                Some(room) => room.typing(&self.conn_id, is_typing).await,
                None => Ok(()),
            },
        }
    }

    async fn join_room(&mut self, room_id: &str, name: Option<&str>) -> Result<(), Error> {
        let room = self.registry.get_or_create_room(room_id).await?;
        match room.join(&self.conn_id, name).await {
            Ok(room_wide_event_receiver) => {
                self.session = Some(Session {
                    room_id: room_id.to_string(),
                    room,
                    room_wide_event_receiver,
                });
                Ok(())
            }
            Err(Error::Domain(DomainError::RoomFull(_))) => {
                send_message(
                    &mut self.websocket,
                    &WsMessageOut::RoomFull {
                        room_id: room_id.to_string(),
                    },
                )
                .await
            }
            Err(error) if error.is_droppable_intent() => {
                self.log_dropped_intent("joinRoom rejected by the room");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Intents against a room the connection is not part of are dropped.
    fn room_for(&self, room_id: &str) -> Option<RoomClient> {
        match &self.session {
            Some(session) if session.room_id == room_id.trim() => Some(session.room.clone()),
            _ => {
                self.log_dropped_intent("intent for a room the connection has not joined");
                None
            }
        }
    }

    fn log_dropped_intent(&self, reason: &str) {
        log::debug!(
            "Dropped an intent from connection {}: {}.",
            &self.conn_id,
            reason
        );
    }

    fn log_connection_lost(&self, reason: &str) {
        log::info!(
            "Connection {} lost due to: {}. Stopping player actor.",
            &self.conn_id,
            reason,
        );
    }
}
