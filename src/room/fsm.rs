use std::fmt;

use rust_fsm::state_machine;

/*
 * Lobby: fresh room, no slot occupied yet.
 * AwaitingSecret: at least the setter is present, no live secret.
 * InRound: secret set, guesser present, letters being guessed.
 * RoundSettled: round decided, board locked until the advance timer fires.
 */
state_machine! {
    derive(Debug, Clone, PartialEq)
    pub RoomFsm(Lobby)

    Lobby => {
        FirstJoin => AwaitingSecret
    },
    AwaitingSecret => {
        SecretReady => InRound,
        NewRound => AwaitingSecret,
        Reset => Lobby,
    },
    InRound => {
        SecretReady => InRound,
        RoundEnded => RoundSettled,
        NewRound => AwaitingSecret,
        Reset => Lobby,
    },
    RoundSettled => {
        SecretReady => InRound,
        AdvanceRound => AwaitingSecret,
        NewRound => AwaitingSecret,
        Reset => Lobby,
    }
}

impl fmt::Display for RoomFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
