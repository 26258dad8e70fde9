use serde::{Deserialize, Serialize};

use crate::room::fsm::RoomFsmState;
use crate::room::{PlayerSlot, RoomSnapshot, RoundOutcome};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum WsMessageIn {
    CreateRoom {
        name: Option<String>,
    },
    JoinRoom {
        room_id: String,
        name: Option<String>,
    },
    SetSecret {
        room_id: String,
        secret: String,
        hint: Option<String>,
        max_wrong: Option<u8>,
    },
    Guess {
        room_id: String,
        letter: String,
    },
    RequestSecretReveal {
        room_id: String,
    },
    Rematch {
        room_id: String,
    },
    Chat {
        room_id: String,
        text: String,
    },
    Typing {
        room_id: String,
        is_typing: bool,
    },
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum WsMessageOut {
    RoomCreated {
        room_id: String,
    },
    RoomFull {
        room_id: String,
    },
    State {
        state: StateDto,
    },
    RoundOver {
        outcome: RoundOverDto,
    },
    SecretReveal {
        secret: String,
    },
    Chat {
        from: String,
        text: String,
    },
    Typing {
        from: String,
        is_typing: bool,
    },
    SystemMsg {
        text: String,
    },
    Error {
        r#type: String,
        title: String,
        detail: String,
    },
}

/// The per-connection projection of a [`RoomSnapshot`]: the shared fields
/// plus the receiver's own slot and role. The raw secret never appears here.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StateDto {
    pub room_id: String,
    pub phase: String,
    pub hint: String,
    pub revealed: Vec<String>,
    pub guessed: Vec<char>,
    pub wrong: u8,
    pub max_wrong: u8,
    pub players: Vec<Option<PlayerDto>>,
    pub setter: Option<usize>,
    pub guesser: Option<usize>,
    pub last_guess: Option<LastGuessDto>,
    pub current_set: u8,
    pub points_to_win_set: u8,
    pub sets_to_win_match: u8,
    pub you: YouDto,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub name: String,
    pub points: u8,
    pub sets: u8,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LastGuessDto {
    pub name: String,
    pub letter: char,
    pub hit: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct YouDto {
    pub slot: Option<usize>,
    pub role: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoundOverDto {
    pub winner: String,
    pub loser: String,
    pub guesser_won: bool,
    pub secret: String,
    pub points: Vec<u8>,
    pub sets: Vec<u8>,
    pub current_set: u8,
    pub set_ended: bool,
    pub match_ended: bool,
}

pub fn state_to_string(state: RoomFsmState) -> String {
    match state {
        RoomFsmState::Lobby => "lobby".to_string(),
        RoomFsmState::AwaitingSecret => "awaitingSecret".to_string(),
        RoomFsmState::InRound => "inRound".to_string(),
        RoomFsmState::RoundSettled => "roundSettled".to_string(),
    }
}

impl From<PlayerSlot> for PlayerDto {
    fn from(slot: PlayerSlot) -> Self {
        PlayerDto {
            name: slot.name,
            points: slot.points,
            sets: slot.sets,
        }
    }
}

impl From<RoundOutcome> for RoundOverDto {
    fn from(outcome: RoundOutcome) -> Self {
        RoundOverDto {
            winner: outcome.winner_name,
            loser: outcome.loser_name,
            guesser_won: outcome.guesser_won,
            secret: outcome.secret,
            points: outcome.points.to_vec(),
            sets: outcome.sets.to_vec(),
            current_set: outcome.current_set,
            set_ended: outcome.set_ended,
            match_ended: outcome.match_ended,
        }
    }
}

impl StateDto {
    /// Personalizes a snapshot for one connection. `conn_id` decides the
    /// `you` block; everything else is shared verbatim.
    pub fn from_snapshot(snapshot: RoomSnapshot, conn_id: &str) -> Self {
        let slot = snapshot.slots.iter().position(|slot| {
            slot.as_ref()
                .map(|occupant| occupant.conn_id == conn_id)
                .unwrap_or(false)
        });
        let role = slot.and_then(|slot| {
            if snapshot.setter == Some(slot) {
                Some("setter".to_string())
            } else if snapshot.guesser == Some(slot) {
                Some("guesser".to_string())
            } else {
                None
            }
        });

        StateDto {
            room_id: snapshot.room_id,
            phase: state_to_string(snapshot.phase),
            hint: snapshot.hint,
            revealed: snapshot.revealed,
            guessed: snapshot.guessed,
            wrong: snapshot.wrong,
            max_wrong: snapshot.max_wrong,
            players: snapshot
                .slots
                .into_iter()
                .map(|slot| slot.map(PlayerDto::from))
                .collect(),
            setter: snapshot.setter,
            guesser: snapshot.guesser,
            last_guess: snapshot.last_guess.map(|last| LastGuessDto {
                name: last.name,
                letter: last.letter,
                hit: last.hit,
            }),
            current_set: snapshot.current_set,
            points_to_win_set: snapshot.points_to_win_set,
            sets_to_win_match: snapshot.sets_to_win_match,
            you: YouDto { slot, role },
        }
    }
}
