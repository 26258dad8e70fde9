pub mod actor;
pub mod actor_client;
pub mod fsm;

use rust_fsm::StateMachine;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::mask;
use crate::room::fsm::{RoomFsm, RoomFsmInput, RoomFsmState};
use crate::text;

pub const SLOT_A: usize = 0;
pub const SLOT_B: usize = 1;

/// A persistent identity slot. Slots survive role swaps and carry the
/// cumulative score; the setter/guesser roles are a mutable mapping over
/// the occupied slots.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSlot {
    pub conn_id: String,
    pub name: String,
    pub points: u8,
    pub sets: u8,
}

#[derive(Clone, Debug)]
struct Secret {
    raw: String,
    normalized: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LastGuess {
    pub conn_id: String,
    pub letter: char,
    pub hit: bool,
}

/// One isolated game session. All mutation goes through the intent methods,
/// which validate sender identity and phase first; a failed validation
/// leaves the room untouched.
pub struct Room {
    id: String,
    fsm: StateMachine<RoomFsm>,
    slots: [Option<PlayerSlot>; 2],
    setter: Option<usize>,
    guesser: Option<usize>,
    secret: Option<Secret>,
    hint: String,
    guessed: Vec<char>,
    wrong: u8,
    max_wrong: u8,
    last_guess: Option<LastGuess>,
    current_set: u8,
    match_over: bool,
    points_to_win_set: u8,
    sets_to_win_match: u8,
}

/// What a decided round settles to. Carries the cleartext secret: the round
/// is over and both sides are entitled to see it, but only inside this
/// one-shot event, never in the persisted snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundOutcome {
    pub winner_slot: usize,
    pub winner_name: String,
    pub loser_name: String,
    pub guesser_won: bool,
    pub secret: String,
    pub points: [u8; 2],
    pub sets: [u8; 2],
    pub current_set: u8,
    pub set_ended: bool,
    pub match_ended: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GuessOutcome {
    Continue,
    RoundOver(RoundOutcome),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeaveOutcome {
    pub is_empty: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LastGuessView {
    pub name: String,
    pub letter: char,
    pub hit: bool,
}

/// The client-safe projection of a room. Never contains the raw secret.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub phase: RoomFsmState,
    pub hint: String,
    pub revealed: Vec<String>,
    pub guessed: Vec<char>,
    pub wrong: u8,
    pub max_wrong: u8,
    pub slots: [Option<PlayerSlot>; 2],
    pub setter: Option<usize>,
    pub guesser: Option<usize>,
    pub last_guess: Option<LastGuessView>,
    pub current_set: u8,
    pub points_to_win_set: u8,
    pub sets_to_win_match: u8,
}

impl Room {
    pub const DEFAULT_MAX_WRONG: u8 = 7;
    pub const MIN_MAX_WRONG: u8 = 3;
    pub const MAX_MAX_WRONG: u8 = 12;
    const DEFAULT_NAME: &'static str = "Oyuncu";
    const MAX_NAME_CHARS: usize = 24;

    /// Thresholds below one are floored; a best-of series needs at least
    /// one point per set and one set per match.
    pub fn new(id: &str, points_to_win_set: u8, sets_to_win_match: u8) -> Self {
        Self {
            id: id.to_string(),
            fsm: StateMachine::default(),
            slots: [None, None],
            setter: None,
            guesser: None,
            secret: None,
            hint: String::new(),
            guessed: Vec::default(),
            wrong: 0,
            max_wrong: Room::DEFAULT_MAX_WRONG,
            last_guess: None,
            current_set: 1,
            match_over: false,
            points_to_win_set: points_to_win_set.max(1),
            sets_to_win_match: sets_to_win_match.max(1),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &RoomFsmState {
        self.fsm.state()
    }

    pub fn slots(&self) -> &[Option<PlayerSlot>; 2] {
        &self.slots
    }

    pub fn setter(&self) -> Option<usize> {
        self.setter
    }

    pub fn guesser(&self) -> Option<usize> {
        self.guesser
    }

    pub fn guessed(&self) -> &[char] {
        &self.guessed
    }

    pub fn wrong(&self) -> u8 {
        self.wrong
    }

    pub fn max_wrong(&self) -> u8 {
        self.max_wrong
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    fn slot_of(&self, conn_id: &str) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .map(|occupant| occupant.conn_id == conn_id)
                .unwrap_or(false)
        })
    }

    fn occupant(&self, slot: usize) -> Option<&PlayerSlot> {
        self.slots.get(slot).and_then(|slot| slot.as_ref())
    }

    fn occupant_mut(&mut self, slot: usize) -> Result<&mut PlayerSlot, Error> {
        self.slots
            .get_mut(slot)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| {
                Error::log_and_create_internal(&format!(
                    "Tried to access an empty slot. Slot: '{slot}'."
                ))
            })
    }

    fn slot_name(&self, slot: usize) -> String {
        self.occupant(slot)
            .map(|occupant| occupant.name.clone())
            .unwrap_or_default()
    }

    fn setter_conn(&self) -> Option<&str> {
        self.setter
            .and_then(|slot| self.occupant(slot))
            .map(|occupant| occupant.conn_id.as_str())
    }

    fn guesser_conn(&self) -> Option<&str> {
        self.guesser
            .and_then(|slot| self.occupant(slot))
            .map(|occupant| occupant.conn_id.as_str())
    }

    fn participant_name(&self, conn_id: &str) -> Result<String, Error> {
        self.slot_of(conn_id)
            .map(|slot| self.slot_name(slot))
            .ok_or_else(|| Error::Domain(DomainError::NotInRoom(conn_id.to_string())))
    }

    fn clamp_name(name: Option<&str>) -> String {
        let trimmed = name.unwrap_or_default().trim();
        if trimmed.is_empty() {
            Room::DEFAULT_NAME.to_string()
        } else {
            trimmed.chars().take(Room::MAX_NAME_CHARS).collect()
        }
    }

    /// Fills the first empty slot. The first occupant of a fresh room becomes
    /// the setter, the second the guesser. Joining into a room that already
    /// holds a secret starts the round right away, which may even settle it
    /// when the secret has no guessable letters.
    pub fn join(
        &mut self,
        conn_id: &str,
        name: Option<&str>,
    ) -> Result<Option<RoundOutcome>, Error> {
        if self.slot_of(conn_id).is_some() {
            return Err(Error::Domain(DomainError::AlreadyInRoom(
                conn_id.to_string(),
            )));
        }
        let slot = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or_else(|| Error::Domain(DomainError::RoomFull(self.id.clone())))?;

        self.slots[slot] = Some(PlayerSlot {
            conn_id: conn_id.to_string(),
            name: Room::clamp_name(name),
            points: 0,
            sets: 0,
        });
        if self.setter.is_none() {
            self.setter = Some(slot);
        } else if self.guesser.is_none() {
            self.guesser = Some(slot);
        }

        if self.state() == &RoomFsmState::Lobby {
            self.process_event(&RoomFsmInput::FirstJoin)?;
        }
        if self.guesser.is_some()
            && self.secret.is_some()
            && self.state() == &RoomFsmState::AwaitingSecret
        {
            self.process_event(&RoomFsmInput::SecretReady)?;
            return self.check_immediate_solve();
        }
        Ok(None)
    }

    /// Stores a fresh secret and resets the round fields. Starts the round
    /// when a guesser is present, otherwise the room keeps waiting for one.
    /// The caller must cancel any pending advance timer on success.
    pub fn set_secret(
        &mut self,
        conn_id: &str,
        secret: &str,
        hint: Option<&str>,
        max_wrong: Option<u8>,
    ) -> Result<Option<RoundOutcome>, Error> {
        if self.setter_conn() != Some(conn_id) {
            return Err(Error::Domain(DomainError::OnlySetterCanSetSecret(
                conn_id.to_string(),
            )));
        }
        let raw = secret.trim();
        if raw.is_empty() {
            return Err(Error::Domain(DomainError::EmptySecret));
        }

        self.secret = Some(Secret {
            raw: raw.to_string(),
            normalized: text::normalize(raw),
        });
        self.hint = hint.unwrap_or_default().trim().to_string();
        self.max_wrong = max_wrong
            .unwrap_or(Room::DEFAULT_MAX_WRONG)
            .clamp(Room::MIN_MAX_WRONG, Room::MAX_MAX_WRONG);
        self.guessed.clear();
        self.wrong = 0;
        self.last_guess = None;
        // A new secret can preempt the advance timer of a decided match;
        // the next round then belongs to a fresh series
        if self.match_over {
            self.reset_match_score();
        }

        if self.guesser.is_some() {
            self.process_event(&RoomFsmInput::SecretReady)?;
            return self.check_immediate_solve();
        }
        Ok(None)
    }

    /// Applies a single-letter guess from the current guesser. A repeated
    /// letter is reported as a domain error so the caller drops it without
    /// any state change or broadcast.
    pub fn guess(&mut self, conn_id: &str, letter: &str) -> Result<GuessOutcome, Error> {
        if self.state() != &RoomFsmState::InRound {
            return Err(Error::Domain(DomainError::InvalidPhaseForGuess(
                self.state().clone(),
                RoomFsmState::InRound,
            )));
        }
        if self.guesser_conn() != Some(conn_id) {
            return Err(Error::Domain(DomainError::OnlyGuesserCanGuess(
                conn_id.to_string(),
            )));
        }

        let trimmed = letter.trim();
        let mut chars = trimmed.chars();
        let folded = match (chars.next(), chars.next()) {
            (Some(c), None) => text::fold_char(c),
            _ => {
                return Err(Error::Domain(DomainError::NotASingleLetter(
                    letter.to_string(),
                )))
            }
        };
        if !text::is_letter(folded) {
            return Err(Error::Domain(DomainError::NotASingleLetter(
                letter.to_string(),
            )));
        }
        if self.guessed.contains(&folded) {
            return Err(Error::Domain(DomainError::LetterAlreadyGuessed(folded)));
        }

        let (hit, raw) = {
            let secret = self.secret.as_ref().ok_or_else(|| {
                Error::log_and_create_internal(&format!(
                    "Room is in round without a secret. RoomId: '{}'.",
                    self.id
                ))
            })?;
            (secret.normalized.contains(folded), secret.raw.clone())
        };

        self.guessed.push(folded);
        if !hit {
            self.wrong += 1;
        }
        self.last_guess = Some(LastGuess {
            conn_id: conn_id.to_string(),
            letter: folded,
            hit,
        });

        if hit && mask::is_solved(&raw, &self.guessed) {
            let winner = self.require_role(self.guesser, "guesser")?;
            Ok(GuessOutcome::RoundOver(self.settle_round(winner)?))
        } else if !hit && self.wrong >= self.max_wrong {
            let winner = self.require_role(self.setter, "setter")?;
            Ok(GuessOutcome::RoundOver(self.settle_round(winner)?))
        } else {
            Ok(GuessOutcome::Continue)
        }
    }

    /// Hands the raw secret back to the setter alone, the "forgot the word"
    /// affordance. Never broadcast.
    pub fn reveal_secret(&self, conn_id: &str) -> Result<&str, Error> {
        if self.setter_conn() != Some(conn_id) {
            return Err(Error::Domain(DomainError::OnlySetterCanRevealSecret(
                conn_id.to_string(),
            )));
        }
        self.secret
            .as_ref()
            .map(|secret| secret.raw.as_str())
            .ok_or(Error::Domain(DomainError::NoSecretToReveal))
    }

    /// Rolls the room back to a fresh round with the first-slot occupant as
    /// setter. Cumulative points and sets are preserved unless the match was
    /// already decided. The caller must cancel any pending advance timer.
    pub fn rematch(&mut self, conn_id: &str) -> Result<(), Error> {
        let host_conn = self
            .occupant(SLOT_A)
            .map(|occupant| occupant.conn_id.as_str());
        if host_conn != Some(conn_id) {
            return Err(Error::Domain(DomainError::OnlyHostSlotCanStartRematch(
                conn_id.to_string(),
            )));
        }
        if self.slots.iter().any(|slot| slot.is_none()) {
            return Err(Error::Domain(DomainError::RematchRequiresTwoPlayers));
        }

        self.process_event(&RoomFsmInput::NewRound)?;
        self.clear_round_fields();
        self.setter = Some(SLOT_A);
        self.guesser = Some(SLOT_B);
        if self.match_over {
            self.reset_match_score();
        }
        Ok(())
    }

    /// Pure relay, no state mutation. Returns the sender name and the
    /// trimmed message for broadcasting.
    pub fn chat(&self, conn_id: &str, text: &str) -> Result<(String, String), Error> {
        let from = self.participant_name(conn_id)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::Domain(DomainError::EmptyChatMessage));
        }
        Ok((from, trimmed.to_string()))
    }

    pub fn typing(&self, conn_id: &str) -> Result<String, Error> {
        self.participant_name(conn_id)
    }

    /// The timer-driven post-round transition: swap roles, open a fresh
    /// round, and settle the match bookkeeping if the match was decided.
    pub fn advance_round(&mut self) -> Result<(), Error> {
        self.process_event(&RoomFsmInput::AdvanceRound)?;
        std::mem::swap(&mut self.setter, &mut self.guesser);
        self.clear_round_fields();
        if self.match_over {
            self.reset_match_score();
        }
        Ok(())
    }

    /// Disconnect handling: clears the slot and any role it held, hard-resets
    /// round and match state, and re-seats a remaining occupant as the setter
    /// of a joinable room.
    pub fn leave(&mut self, conn_id: &str) -> Result<LeaveOutcome, Error> {
        let slot = self
            .slot_of(conn_id)
            .ok_or_else(|| Error::Domain(DomainError::NotInRoom(conn_id.to_string())))?;

        self.slots[slot] = None;
        self.setter = None;
        self.guesser = None;
        self.clear_round_fields();
        self.max_wrong = Room::DEFAULT_MAX_WRONG;
        self.reset_match_score();
        self.process_event(&RoomFsmInput::Reset)?;

        let remaining = self.slots.iter().position(|slot| slot.is_some());
        if let Some(slot) = remaining {
            self.setter = Some(slot);
            self.process_event(&RoomFsmInput::FirstJoin)?;
        }
        Ok(LeaveOutcome {
            is_empty: remaining.is_none(),
        })
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            phase: self.state().clone(),
            hint: self.hint.clone(),
            revealed: self
                .secret
                .as_ref()
                .map(|secret| mask::render(&secret.raw, &self.guessed))
                .unwrap_or_default(),
            guessed: self.guessed.clone(),
            wrong: self.wrong,
            max_wrong: self.max_wrong,
            slots: self.slots.clone(),
            setter: self.setter,
            guesser: self.guesser,
            last_guess: self.last_guess.as_ref().map(|last| LastGuessView {
                name: self
                    .slot_of(&last.conn_id)
                    .map(|slot| self.slot_name(slot))
                    .unwrap_or_default(),
                letter: last.letter,
                hit: last.hit,
            }),
            current_set: self.current_set,
            points_to_win_set: self.points_to_win_set,
            sets_to_win_match: self.sets_to_win_match,
        }
    }

    fn check_immediate_solve(&mut self) -> Result<Option<RoundOutcome>, Error> {
        let solved = self
            .secret
            .as_ref()
            .map(|secret| mask::is_solved(&secret.raw, &self.guessed))
            .unwrap_or(false);
        if solved {
            let winner = self.require_role(self.guesser, "guesser")?;
            return Ok(Some(self.settle_round(winner)?));
        }
        Ok(None)
    }

    fn settle_round(&mut self, winner: usize) -> Result<RoundOutcome, Error> {
        self.process_event(&RoomFsmInput::RoundEnded)?;
        let loser = if winner == SLOT_A { SLOT_B } else { SLOT_A };

        self.occupant_mut(winner)?.points += 1;
        let mut set_ended = false;
        let mut match_ended = false;
        if self.occupant_mut(winner)?.points >= self.points_to_win_set {
            set_ended = true;
            self.occupant_mut(winner)?.sets += 1;
            for slot in self.slots.iter_mut().flatten() {
                slot.points = 0;
            }
            let max_sets = 2 * self.sets_to_win_match - 1;
            self.current_set = (self.current_set + 1).min(max_sets);
            if self.occupant_mut(winner)?.sets >= self.sets_to_win_match {
                match_ended = true;
                self.match_over = true;
            }
        }

        Ok(RoundOutcome {
            winner_slot: winner,
            winner_name: self.slot_name(winner),
            loser_name: self.slot_name(loser),
            guesser_won: self.guesser == Some(winner),
            secret: self
                .secret
                .as_ref()
                .map(|secret| secret.raw.clone())
                .unwrap_or_default(),
            points: [self.slot_points(SLOT_A), self.slot_points(SLOT_B)],
            sets: [self.slot_sets(SLOT_A), self.slot_sets(SLOT_B)],
            current_set: self.current_set,
            set_ended,
            match_ended,
        })
    }

    fn slot_points(&self, slot: usize) -> u8 {
        self.occupant(slot).map(|occupant| occupant.points).unwrap_or(0)
    }

    fn slot_sets(&self, slot: usize) -> u8 {
        self.occupant(slot).map(|occupant| occupant.sets).unwrap_or(0)
    }

    fn clear_round_fields(&mut self) {
        self.secret = None;
        self.hint.clear();
        self.guessed.clear();
        self.wrong = 0;
        self.last_guess = None;
    }

    fn reset_match_score(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.points = 0;
            slot.sets = 0;
        }
        self.current_set = 1;
        self.match_over = false;
    }

    fn require_role(&self, role: Option<usize>, role_name: &str) -> Result<usize, Error> {
        role.ok_or_else(|| {
            Error::log_and_create_internal(&format!(
                "Round ended without a {role_name} assigned. RoomId: '{}'.",
                self.id
            ))
        })
    }

    fn process_event(&mut self, event: &RoomFsmInput) -> Result<(), Error> {
        match self.fsm.consume(event) {
            Ok(_) => Ok(()),
            Err(error) => Err(Error::log_and_create_internal(&format!(
                "The fsm in state {:?} can't transition with an event {:?}. Error: '{error}'.",
                self.fsm.state(),
                event
            ))),
        }
    }
}
