use std::fmt::{Display, Formatter};
use std::time::Duration;
use tokio::sync::broadcast::error::SendError;
use tokio::sync::oneshot::Sender as OneshotSender;
use tokio::sync::{
    broadcast, mpsc,
    mpsc::{Receiver, Sender},
};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::GameSettings;
use crate::error::Error;
use crate::metrics::ACTIVE_ROOMS;
use crate::registry::actor_client::RoomRegistryClient;
use crate::room::actor_client::RoomClient;
use crate::room::fsm::RoomFsmState;
use crate::room::{GuessOutcome, Room, RoomSnapshot, RoundOutcome};

static MSG_PLAYER_JOINED: &str = "Bir oyuncu bağlandı.";
static MSG_ROUND_STARTED: &str = "Kelime ayarlandı. Oyun başladı!";
static MSG_AWAITING_SECRET: &str = "Yeni oyun için kelime bekleniyor.";
static MSG_PLAYER_LEFT: &str = "Bir oyuncu ayrıldı. Oyun sıfırlandı.";

/// Owns one [`Room`] and serializes every intent against it. The advance
/// timer is a spawned sleep that feeds [`RoomCommand::AdvanceRound`] back
/// into this same mailbox, so the settle-to-next-round transition races
/// nothing.
pub struct RoomActor {
    room: Room,
    room_rx: Receiver<RoomCommand>,
    room_tx: Sender<RoomCommand>,
    broadcast_tx: broadcast::Sender<RoomWideEvent>,
    registry: RoomRegistryClient,
    round_advance_delay: Duration,
    inactivity_timeout: Duration,
    pending_advance: Option<JoinHandle<()>>,
}

impl RoomActor {
    pub fn spawn(id: &str, settings: GameSettings, registry: RoomRegistryClient) -> RoomClient {
        let room = Room::new(id, settings.points_to_win_set, settings.sets_to_win_match);
        let (room_tx, room_rx): (Sender<RoomCommand>, Receiver<RoomCommand>) = mpsc::channel(128);
        let (broadcast_tx, _): (
            broadcast::Sender<RoomWideEvent>,
            broadcast::Receiver<RoomWideEvent>,
        ) = broadcast::channel(32);

        tokio::spawn(
            RoomActor {
                room,
                room_rx,
                room_tx: room_tx.clone(),
                broadcast_tx,
                registry,
                round_advance_delay: settings.round_advance_delay(),
                inactivity_timeout: settings.inactivity_timeout(),
                pending_advance: None,
            }
            .start(),
        );

        RoomClient { room_tx }
    }

    async fn start(mut self) {
        ACTIVE_ROOMS.inc();

        loop {
            match time::timeout(self.inactivity_timeout, self.room_rx.recv()).await {
                Err(_) => {
                    if self.room.is_empty() || self.broadcast_tx.receiver_count() == 0 {
                        log::info!(
                            "No activity detected in room {} after {} seconds. Stopping room actor.",
                            self.room.id(),
                            self.inactivity_timeout.as_secs()
                        );
                        break;
                    }
                }
                Ok(None) => {
                    log::info!("Room channel has been dropped. Stopping room actor.");
                    break;
                }
                Ok(Some(command)) => {
                    if self.handle_command(command) == ControlFlow::Stop {
                        break;
                    }
                }
            }
        }

        self.stop_room().await;
        ACTIVE_ROOMS.dec();
    }

    fn handle_command(&mut self, command: RoomCommand) -> ControlFlow {
        match command {
            RoomCommand::Join {
                conn_id,
                name,
                response_tx,
            } => match self.room.join(&conn_id, name.as_deref()) {
                Ok(maybe_outcome) => {
                    let event = RoomEvent::Joined {
                        broadcast_rx: self.broadcast_tx.subscribe(),
                    };
                    if response_tx.send(event).is_err() {
                        log::error!("Sent RoomEvent::Joined but the response channel is closed. Removing the player. ConnectionId: '{conn_id}'.");
                        return self.handle_leave(&conn_id);
                    }
                    self.send_system_message(MSG_PLAYER_JOINED);
                    if self.room.state() == &RoomFsmState::InRound {
                        self.send_system_message(MSG_ROUND_STARTED);
                    }
                    let _ = self.send_room_state();
                    if let Some(outcome) = maybe_outcome {
                        self.finish_round(outcome);
                    }
                }
                Err(error) => {
                    log::debug!("Rejected a join. ConnectionId: '{conn_id}', Error: '{error}'.");
                    let _ = response_tx.send(RoomEvent::Error { error });
                }
            },
            RoomCommand::SetSecret {
                conn_id,
                secret,
                hint,
                max_wrong,
            } => match self
                .room
                .set_secret(&conn_id, &secret, hint.as_deref(), max_wrong)
            {
                Ok(maybe_outcome) => {
                    self.cancel_pending_advance();
                    if self.room.state() == &RoomFsmState::InRound {
                        self.send_system_message(MSG_ROUND_STARTED);
                    }
                    let _ = self.send_room_state();
                    if let Some(outcome) = maybe_outcome {
                        self.finish_round(outcome);
                    }
                }
                Err(error) => Self::drop_intent("setting the secret", &conn_id, error),
            },
            RoomCommand::Guess { conn_id, letter } => match self.room.guess(&conn_id, &letter) {
                Ok(GuessOutcome::Continue) => {
                    let _ = self.send_room_state();
                }
                Ok(GuessOutcome::RoundOver(outcome)) => {
                    let _ = self.send_room_state();
                    self.finish_round(outcome);
                }
                Err(error) => Self::drop_intent("guessing", &conn_id, error),
            },
            RoomCommand::RevealSecret {
                conn_id,
                response_tx,
            } => {
                let event = match self.room.reveal_secret(&conn_id) {
                    Ok(secret) => RoomEvent::SecretRevealed {
                        secret: secret.to_string(),
                    },
                    Err(error) => RoomEvent::Error { error },
                };
                if response_tx.send(event).is_err() {
                    log::error!("Sent RoomEvent::SecretRevealed but the response channel is closed. ConnectionId: '{conn_id}'.");
                }
            }
            RoomCommand::Rematch { conn_id } => match self.room.rematch(&conn_id) {
                Ok(()) => {
                    self.cancel_pending_advance();
                    self.send_system_message(MSG_AWAITING_SECRET);
                    let _ = self.send_room_state();
                }
                Err(error) => Self::drop_intent("starting a rematch", &conn_id, error),
            },
            RoomCommand::Chat { conn_id, text } => match self.room.chat(&conn_id, &text) {
                Ok((from, text)) => {
                    if let Err(error) = self
                        .broadcast_tx
                        .send(RoomWideEvent::ChatMessage { from, text })
                    {
                        log::error!(
                            "Error when sending RoomWideEvent::ChatMessage broadcast: {error}."
                        );
                    }
                }
                Err(error) => Self::drop_intent("chatting", &conn_id, error),
            },
            RoomCommand::Typing { conn_id, is_typing } => match self.room.typing(&conn_id) {
                Ok(from) => {
                    let _ = self.broadcast_tx.send(RoomWideEvent::Typing {
                        conn_id,
                        from,
                        is_typing,
                    });
                }
                Err(error) => Self::drop_intent("typing", &conn_id, error),
            },
            RoomCommand::Leave { conn_id } => return self.handle_leave(&conn_id),
            RoomCommand::AdvanceRound => {
                self.pending_advance = None;
                // A cancellation can lose the race with the timer task
                if self.room.state() != &RoomFsmState::RoundSettled {
                    return ControlFlow::Continue;
                }
                if self.room.advance_round().is_ok() {
                    self.send_system_message(MSG_AWAITING_SECRET);
                    let _ = self.send_room_state();
                }
            }
        }
        ControlFlow::Continue
    }

    fn handle_leave(&mut self, conn_id: &str) -> ControlFlow {
        match self.room.leave(conn_id) {
            Ok(outcome) => {
                self.cancel_pending_advance();
                if outcome.is_empty {
                    log::info!(
                        "Last player left the room. Stopping room actor. RoomId: '{}'.",
                        self.room.id()
                    );
                    return ControlFlow::Stop;
                }
                self.send_system_message(MSG_PLAYER_LEFT);
                let _ = self.send_room_state();
            }
            Err(error) => Self::drop_intent("leaving", conn_id, error),
        }
        ControlFlow::Continue
    }

    /// Broadcasts the one-shot outcome with the cleartext secret, then arms
    /// the advance timer. Until it fires the room stays settled with the
    /// solved board on display.
    fn finish_round(&mut self, outcome: RoundOutcome) {
        if let Err(error) = self.broadcast_tx.send(RoomWideEvent::RoundOver { outcome }) {
            log::error!("Error when sending RoomWideEvent::RoundOver broadcast: {error}.");
        }
        self.cancel_pending_advance();
        let room_tx = self.room_tx.clone();
        let delay = self.round_advance_delay;
        self.pending_advance = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = room_tx.send(RoomCommand::AdvanceRound).await;
        }));
    }

    fn cancel_pending_advance(&mut self) {
        if let Some(handle) = self.pending_advance.take() {
            handle.abort();
        }
    }

    fn send_room_state(&self) -> Result<usize, SendError<RoomWideEvent>> {
        self.broadcast_tx.send(RoomWideEvent::RoomState {
            snapshot: self.room.snapshot(),
        })
    }

    fn send_system_message(&self, text: &str) {
        let _ = self.broadcast_tx.send(RoomWideEvent::SystemMessage {
            text: text.to_string(),
        });
    }

    fn drop_intent(action: &str, conn_id: &str, error: Error) {
        log::debug!("Dropped an invalid intent while {action}. ConnectionId: '{conn_id}', Error: '{error}'.");
    }

    async fn stop_room(mut self) {
        self.cancel_pending_advance();
        let room_id = self.room.id();
        if let Err(error) = self.registry.remove_room(room_id).await {
            log::error!("The RoomRegistry channel is closed, can't remove the Room. RoomId: '{room_id}', Error: '{error}'.");
        }
    }
}

#[derive(PartialEq)]
enum ControlFlow {
    Continue,
    Stop,
}

pub(crate) enum RoomCommand {
    Join {
        conn_id: String,
        name: Option<String>,
        response_tx: OneshotSender<RoomEvent>,
    },
    SetSecret {
        conn_id: String,
        secret: String,
        hint: Option<String>,
        max_wrong: Option<u8>,
    },
    Guess {
        conn_id: String,
        letter: String,
    },
    RevealSecret {
        conn_id: String,
        response_tx: OneshotSender<RoomEvent>,
    },
    Rematch {
        conn_id: String,
    },
    Chat {
        conn_id: String,
        text: String,
    },
    Typing {
        conn_id: String,
        is_typing: bool,
    },
    Leave {
        conn_id: String,
    },
    AdvanceRound,
}

#[derive(Debug)]
pub(crate) enum RoomEvent {
    Joined {
        broadcast_rx: broadcast::Receiver<RoomWideEvent>,
    },
    SecretRevealed {
        secret: String,
    },
    Error {
        error: Error,
    },
}

impl Display for RoomEvent {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                RoomEvent::Joined { .. } => "RoomEvent::Joined".to_string(),
                RoomEvent::SecretRevealed { .. } => "RoomEvent::SecretRevealed".to_string(),
                RoomEvent::Error { error } => format!("Error '{error}'"),
            }
        )
    }
}

#[derive(Clone, Debug)]
pub enum RoomWideEvent {
    RoomState {
        snapshot: RoomSnapshot,
    },
    RoundOver {
        outcome: RoundOutcome,
    },
    ChatMessage {
        from: String,
        text: String,
    },
    Typing {
        conn_id: String,
        from: String,
        is_typing: bool,
    },
    SystemMessage {
        text: String,
    },
}
