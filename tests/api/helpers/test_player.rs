use std::time::Duration;

use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::test_room::{ClientMessage, RoundOver, ServerMessage, State};

pub struct TestPlayer {
    pub name: String,
    pub tx: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
    pub rx: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl TestPlayer {
    const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(
        name: &str,
        websocket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ) -> TestPlayer {
        let (tx, rx) = websocket.split();
        TestPlayer {
            name: name.to_string(),
            tx,
            rx,
        }
    }

    pub async fn send(&mut self, message: ClientMessage) {
        self.send_raw(Message::Text(
            serde_json::to_string(&message).expect("Could not serialize message"),
        ))
        .await;
    }

    pub async fn send_raw(&mut self, message: Message) {
        self.tx.send(message).await.expect("Could not send message");
    }

    pub async fn receive_message(&mut self) -> Result<ServerMessage, String> {
        let message = self.next_raw_text().await?;
        serde_json::from_str(&message)
            .map_err(|error| format!("Could not parse the message. Error: '{error}'."))
    }

    /// Skips interleaved broadcasts (system messages, chat, typing) until the
    /// next shared state frame. Error frames abort with their type.
    pub async fn receive_state(&mut self) -> Result<State, String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::State { state } => return Ok(state),
                ServerMessage::Error {
                    r#type,
                    title,
                    detail,
                } => {
                    assert!(!title.is_empty());
                    assert!(!detail.is_empty());
                    return Err(r#type);
                }
                _ => continue,
            }
        }
    }

    pub async fn receive_round_over(&mut self) -> Result<RoundOver, String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::RoundOver { outcome } => return Ok(outcome),
                ServerMessage::Error { r#type, .. } => return Err(r#type),
                _ => continue,
            }
        }
    }

    pub async fn receive_room_created(&mut self) -> Result<String, String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::RoomCreated { room_id } => return Ok(room_id),
                ServerMessage::Error { r#type, .. } => return Err(r#type),
                _ => continue,
            }
        }
    }

    pub async fn receive_room_full(&mut self) -> Result<String, String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::RoomFull { room_id } => return Ok(room_id),
                ServerMessage::Error { r#type, .. } => return Err(r#type),
                _ => continue,
            }
        }
    }

    pub async fn receive_secret_reveal(&mut self) -> Result<String, String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::SecretReveal { secret } => return Ok(secret),
                ServerMessage::Error { r#type, .. } => return Err(r#type),
                _ => continue,
            }
        }
    }

    pub async fn receive_chat(&mut self) -> Result<(String, String), String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::Chat { from, text } => return Ok((from, text)),
                ServerMessage::Error { r#type, .. } => return Err(r#type),
                _ => continue,
            }
        }
    }

    pub async fn receive_typing(&mut self) -> Result<(String, bool), String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::Typing { from, is_typing } => return Ok((from, is_typing)),
                ServerMessage::Error { r#type, .. } => return Err(r#type),
                _ => continue,
            }
        }
    }

    pub async fn receive_error(&mut self) -> Result<String, String> {
        loop {
            match self.receive_message().await? {
                ServerMessage::Error { r#type, .. } => return Ok(r#type),
                _ => continue,
            }
        }
    }

    pub async fn next_raw_text(&mut self) -> Result<String, String> {
        match tokio::time::timeout(TestPlayer::RECEIVE_TIMEOUT, self.rx.next()).await {
            Ok(Some(Ok(message))) => Ok(message
                .to_text()
                .expect("Message was not a text")
                .to_string()),
            Ok(Some(Err(error))) => Err(format!("Websocket returned an error: '{error}'.")),
            Ok(None) => Err("Websocket closed before expected.".to_string()),
            Err(_) => Err("Timed out waiting for a message.".to_string()),
        }
    }
}
