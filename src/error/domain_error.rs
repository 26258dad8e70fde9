use thiserror::Error;

use crate::room::fsm::RoomFsmState;

/// Validation failures for intents against the current room state. These are
/// policy no-ops: the room actor logs them at debug level and drops them, so
/// a stale client can never corrupt shared state. `RoomFull` is the one
/// variant answered explicitly, with a `roomFull` event to the rejected
/// joiner.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("The room already has two players. RoomId: '{0}'.")]
    RoomFull(String),
    #[error("The connection is already in the room. ConnectionId: '{0}'.")]
    AlreadyInRoom(String),
    #[error("The connection is not a participant of the room. ConnectionId: '{0}'.")]
    NotInRoom(String),
    #[error("Only the setter can set the secret. ConnectionId: '{0}'.")]
    OnlySetterCanSetSecret(String),
    #[error("Only the setter can request the secret reveal. ConnectionId: '{0}'.")]
    OnlySetterCanRevealSecret(String),
    #[error("There is no secret to reveal.")]
    NoSecretToReveal,
    #[error("Only the guesser can guess. ConnectionId: '{0}'.")]
    OnlyGuesserCanGuess(String),
    #[error("Invalid phase for guessing. ActualPhase: '{0:?}', ExpectedPhase: '{1:?}'.")]
    InvalidPhaseForGuess(RoomFsmState, RoomFsmState),
    #[error("The secret is empty after trimming.")]
    EmptySecret,
    #[error("The guess is not a single letter of the alphabet. Guess: '{0}'.")]
    NotASingleLetter(String),
    #[error("The letter was already guessed this round. Letter: '{0}'.")]
    LetterAlreadyGuessed(char),
    #[error("Only the occupant of the first slot can start a rematch. ConnectionId: '{0}'.")]
    OnlyHostSlotCanStartRematch(String),
    #[error("A rematch needs both slots occupied.")]
    RematchRequiresTwoPlayers,
    #[error("The chat message is empty after trimming.")]
    EmptyChatMessage,
}
