use std::time::Duration;

use tokio_tungstenite::tungstenite::Message;

use crate::helpers::test_app::TestApp;
use crate::helpers::test_player::TestPlayer;
use crate::helpers::test_room::{ClientMessage, ServerMessage, TestRoom};

#[tokio::test]
async fn create_room_assigns_a_short_join_code() {
    let room = TestRoom::with_host().await;

    assert_eq!(room.id.len(), 8);
    assert_eq!(room.players.len(), 1);
}

#[tokio::test]
async fn the_second_player_joins_as_the_guesser() {
    let mut room = TestRoom::with_host().await;

    let state = room.join("p2").await.unwrap();

    assert_eq!(state.phase, "awaitingSecret");
    assert_eq!(state.setter, Some(0));
    assert_eq!(state.guesser, Some(1));
    assert_eq!(state.you.slot, Some(1));
    assert_eq!(state.players[0].as_ref().unwrap().name, "p1");
    assert_eq!(state.players[1].as_ref().unwrap().name, "p2");
}

#[tokio::test]
async fn a_third_connection_is_rejected_with_room_full() {
    let room = TestRoom::with_two_players().await;

    let websocket = room.app.open_websocket().await.unwrap();
    let mut third = TestPlayer::new("p3", websocket);
    third
        .send(ClientMessage::JoinRoom {
            room_id: room.id.clone(),
            name: Some("p3".to_string()),
        })
        .await;

    let rejected_room = third.receive_room_full().await.unwrap();
    assert_eq!(rejected_room, room.id);
}

#[tokio::test]
async fn joining_an_unknown_id_creates_the_room() {
    let app = TestApp::spawn_app().await;
    let websocket = app.open_websocket().await.unwrap();
    let mut player = TestPlayer::new("p1", websocket);

    player
        .send(ClientMessage::JoinRoom {
            room_id: "myFriend1".to_string(),
            name: None,
        })
        .await;

    let state = player.receive_state().await.unwrap();
    assert_eq!(state.room_id, "myFriend1");
    assert_eq!(state.phase, "awaitingSecret");
    // Missing names fall back to the default
    assert_eq!(state.players[0].as_ref().unwrap().name, "Oyuncu");
}

#[tokio::test]
async fn setting_the_secret_starts_a_masked_round() {
    let mut room = TestRoom::with_two_players().await;

    let state = room.set_secret("ELMA", Some("meyve"), None).await;

    assert_eq!(state.phase, "inRound");
    assert_eq!(state.revealed, vec!["_", "_", "_", "_"]);
    assert_eq!(state.hint, "meyve");
    assert_eq!(state.wrong, 0);
    assert_eq!(state.max_wrong, 7);
}

#[tokio::test]
async fn non_letter_characters_stay_visible_in_the_mask() {
    let mut room = TestRoom::with_two_players().await;

    let state = room.set_secret("AL GÜLÜM", None, None).await;

    assert_eq!(
        state.revealed,
        vec!["_", "_", " ", "_", "_", "_", "_", "_"]
    );
}

#[tokio::test]
async fn hits_and_misses_update_the_shared_board() {
    let mut room = TestRoom::in_round("ELMA", None).await;

    let state = room.guess("l").await;
    assert_eq!(state.revealed, vec!["_", "L", "_", "_"]);
    assert_eq!(state.wrong, 0);
    let last_guess = state.last_guess.unwrap();
    assert_eq!(last_guess.letter, 'l');
    assert!(last_guess.hit);

    let state = room.guess("z").await;
    assert_eq!(state.wrong, 1);
    assert!(!state.last_guess.unwrap().hit);
}

#[tokio::test]
async fn a_repeated_guess_is_dropped_without_a_broadcast() {
    let mut room = TestRoom::in_round("ELMA", None).await;
    room.guess("l").await;

    let room_id = room.id.clone();
    room.players[1]
        .send(ClientMessage::Guess {
            room_id: room_id.clone(),
            letter: "l".to_string(),
        })
        .await;
    room.players[1]
        .send(ClientMessage::Chat {
            room_id,
            text: "hâlâ buradayım".to_string(),
        })
        .await;

    // The chat relay is the very next frame, the repeat produced nothing
    let message = room.players[1].receive_message().await.unwrap();
    assert!(
        matches!(message, ServerMessage::Chat { ref from, .. } if from == "p2"),
        "expected the chat frame, got: {message:?}"
    );
    let _ = room.players[0].receive_chat().await.unwrap();
}

#[tokio::test]
async fn guesses_fold_with_the_turkish_locale() {
    let mut room = TestRoom::in_round("İKİ", None).await;

    let state = room.guess("i").await;

    assert_eq!(state.revealed, vec!["İ", "_", "İ"]);
    assert_eq!(state.wrong, 0);
}

#[tokio::test]
async fn solving_the_word_settles_and_then_advances_with_swapped_roles() {
    let mut room = TestRoom::in_round("ELMA", None).await;
    for letter in ["e", "l", "m"] {
        room.guess(letter).await;
    }

    let room_id = room.id.clone();
    room.players[1]
        .send(ClientMessage::Guess {
            room_id,
            letter: "a".to_string(),
        })
        .await;

    let state = room.players[1].receive_state().await.unwrap();
    assert_eq!(state.phase, "roundSettled");
    assert_eq!(state.revealed, vec!["E", "L", "M", "A"]);

    let outcome = room.players[1].receive_round_over().await.unwrap();
    assert!(outcome.guesser_won);
    assert_eq!(outcome.winner, "p2");
    assert_eq!(outcome.secret, "ELMA");
    assert_eq!(outcome.points, vec![0, 1]);
    assert!(!outcome.set_ended);

    let _ = room.players[0].receive_state().await.unwrap();
    let outcome = room.players[0].receive_round_over().await.unwrap();
    assert_eq!(outcome.secret, "ELMA");

    // After the advance delay the next round opens with the roles swapped
    let state = room.players[1].receive_state().await.unwrap();
    assert_eq!(state.phase, "awaitingSecret");
    assert_eq!(state.setter, Some(1));
    assert_eq!(state.guesser, Some(0));
    assert_eq!(state.you.role.as_deref(), Some("setter"));
    assert!(state.revealed.is_empty());
    assert_eq!(state.players[1].as_ref().unwrap().points, 1);
    let _ = room.players[0].receive_state().await.unwrap();
}

#[tokio::test]
async fn exhausting_wrong_guesses_awards_the_setter() {
    let mut room = TestRoom::in_round("ELMA", Some(3)).await;
    room.guess("z").await;
    room.guess("t").await;

    let room_id = room.id.clone();
    room.players[1]
        .send(ClientMessage::Guess {
            room_id,
            letter: "k".to_string(),
        })
        .await;

    let state = room.players[1].receive_state().await.unwrap();
    assert_eq!(state.phase, "roundSettled");
    assert_eq!(state.wrong, 3);

    let outcome = room.players[1].receive_round_over().await.unwrap();
    assert!(!outcome.guesser_won);
    assert_eq!(outcome.winner, "p1");
    assert_eq!(outcome.secret, "ELMA");
    assert_eq!(outcome.points, vec![1, 0]);

    let _ = room.players[0].receive_state().await.unwrap();
    let _ = room.players[0].receive_round_over().await.unwrap();
}

#[tokio::test]
async fn the_setter_can_privately_reveal_the_secret() {
    let mut room = TestRoom::in_round("ELMA", None).await;

    let room_id = room.id.clone();
    room.players[0]
        .send(ClientMessage::RequestSecretReveal {
            room_id: room_id.clone(),
        })
        .await;
    let secret = room.players[0].receive_secret_reveal().await.unwrap();
    assert_eq!(secret, "ELMA");

    // The guesser's request is dropped; the probe chat is the next frame
    room.players[1]
        .send(ClientMessage::RequestSecretReveal {
            room_id: room_id.clone(),
        })
        .await;
    room.players[1]
        .send(ClientMessage::Chat {
            room_id,
            text: "unuttun mu?".to_string(),
        })
        .await;
    let message = room.players[1].receive_message().await.unwrap();
    assert!(
        matches!(message, ServerMessage::Chat { .. }),
        "expected the chat frame, got: {message:?}"
    );
    let _ = room.players[0].receive_chat().await.unwrap();
}

#[tokio::test]
async fn chat_is_relayed_to_both_and_typing_only_to_the_other() {
    let mut room = TestRoom::with_two_players().await;

    let room_id = room.id.clone();
    room.players[0]
        .send(ClientMessage::Chat {
            room_id: room_id.clone(),
            text: "selam".to_string(),
        })
        .await;
    assert_eq!(
        room.players[0].receive_chat().await.unwrap(),
        ("p1".to_string(), "selam".to_string())
    );
    assert_eq!(
        room.players[1].receive_chat().await.unwrap(),
        ("p1".to_string(), "selam".to_string())
    );

    room.players[0]
        .send(ClientMessage::Typing {
            room_id: room_id.clone(),
            is_typing: true,
        })
        .await;
    assert_eq!(
        room.players[1].receive_typing().await.unwrap(),
        ("p1".to_string(), true)
    );

    // The sender never sees their own typing indicator; probe with a chat
    room.players[0]
        .send(ClientMessage::Chat {
            room_id,
            text: "yazıyorum".to_string(),
        })
        .await;
    let message = room.players[0].receive_message().await.unwrap();
    assert!(
        matches!(message, ServerMessage::Chat { .. }),
        "expected the chat frame, got: {message:?}"
    );
    let _ = room.players[1].receive_chat().await.unwrap();
}

#[tokio::test]
async fn a_disconnect_resets_the_room_for_the_remaining_player() {
    let mut room = TestRoom::in_round("ELMA", None).await;
    room.guess("l").await;

    let leaver = room.players.remove(1);
    drop(leaver);

    let state = room.players[0].receive_state().await.unwrap();
    assert_eq!(state.phase, "awaitingSecret");
    assert!(state.players[1].is_none());
    assert!(state.revealed.is_empty());
    assert!(state.guessed.is_empty());
    assert_eq!(state.setter, Some(0));
    assert_eq!(state.guesser, None);
    assert_eq!(state.players[0].as_ref().unwrap().points, 0);
}

#[tokio::test]
async fn an_emptied_room_is_removed_and_its_id_maps_to_a_fresh_one() {
    let room = TestRoom::in_round("ELMA", None).await;
    let app = room.app;
    let room_id = room.id;
    drop(room.players);

    // Let the server notice both disconnects and drop the room
    tokio::time::sleep(Duration::from_millis(250)).await;

    let websocket = app.open_websocket().await.unwrap();
    let mut player = TestPlayer::new("p3", websocket);
    player
        .send(ClientMessage::JoinRoom {
            room_id: room_id.clone(),
            name: Some("p3".to_string()),
        })
        .await;

    let state = player.receive_state().await.unwrap();
    assert_eq!(state.room_id, room_id);
    assert_eq!(state.phase, "awaitingSecret");
    assert_eq!(state.you.role.as_deref(), Some("setter"));
    assert!(state.revealed.is_empty());
    assert!(state.guessed.is_empty());
    assert_eq!(state.players[0].as_ref().unwrap().name, "p3");
    assert!(state.players[1].is_none());
}

#[tokio::test]
async fn rematch_restarts_with_the_original_roles_and_keeps_the_score() {
    let mut room = TestRoom::in_round("ELMA", None).await;
    for letter in ["e", "l", "m", "a"] {
        room.guess(letter).await;
    }

    // Wait out the advance; the roles are swapped at this point
    let state = room.players[0].receive_state().await.unwrap();
    assert_eq!(state.phase, "awaitingSecret");
    assert_eq!(state.setter, Some(1));
    let _ = room.players[1].receive_state().await.unwrap();

    let room_id = room.id.clone();
    room.players[0]
        .send(ClientMessage::Rematch { room_id })
        .await;

    let state = room.players[0].receive_state().await.unwrap();
    assert_eq!(state.phase, "awaitingSecret");
    assert_eq!(state.setter, Some(0));
    assert_eq!(state.guesser, Some(1));
    assert_eq!(state.players[1].as_ref().unwrap().points, 1);
    let _ = room.players[1].receive_state().await.unwrap();
}

#[tokio::test]
async fn ping_pong_and_malformed_messages_keep_the_connection_alive() {
    let mut room = TestRoom::with_two_players().await;

    room.players[0]
        .send_raw(Message::Text("ping".to_string()))
        .await;
    assert_eq!(room.players[0].next_raw_text().await.unwrap(), "pong");

    room.players[0]
        .send_raw(Message::Text("{not json".to_string()))
        .await;
    let error = room.players[0].receive_error().await.unwrap();
    assert_eq!(error, "UNPROCESSABLE_MESSAGE");

    // The connection survived and still relays intents
    let room_id = room.id.clone();
    room.players[0]
        .send(ClientMessage::Chat {
            room_id,
            text: "hala buradayım".to_string(),
        })
        .await;
    assert_eq!(
        room.players[0].receive_chat().await.unwrap(),
        ("p1".to_string(), "hala buradayım".to_string())
    );
    let _ = room.players[1].receive_chat().await.unwrap();
}
