pub mod message;

use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;

use crate::error::Error;
use crate::websocket::message::{WsMessageIn, WsMessageOut};

pub fn parse_message(message: &str) -> Result<WsMessageIn, Error> {
    serde_json::from_str(message)
        .map_err(|error| Error::UnprocessableMessage(error.to_string(), message.to_string()))
}

pub async fn send_message<T>(websocket: &mut WebSocket, value: &T) -> Result<(), Error>
where
    T: ?Sized + Serialize,
{
    let message = serde_json::to_string(value).map_err(|error| {
        Error::log_and_create_internal(&format!(
            "Could not serialize the message. Error: '{error}'."
        ))
    })?;

    websocket
        .send(Message::Text(message))
        .await
        .map_err(|error| Error::WebsocketClosed(error.to_string()))
}

pub async fn send_message_string(websocket: &mut WebSocket, value: &str) -> Result<(), Error> {
    websocket
        .send(Message::Text(value.to_string()))
        .await
        .map_err(|error| Error::WebsocketClosed(error.to_string()))
}

pub async fn send_error(websocket: &mut WebSocket, error: &Error) {
    // The websocket might be in a broken state, ignore failures here
    let _ = send_message(websocket, &error_to_ws_error(error)).await;
}

pub async fn close(mut websocket: WebSocket) {
    if let Err(error) = websocket.close().await {
        log::debug!("Could not close the WebSocket. Error: '{error}'.")
    }
}

fn error_to_ws_error(error: &Error) -> WsMessageOut {
    match error {
        Error::Domain(_) => WsMessageOut::Error {
            r#type: "INVALID_INTENT".to_string(),
            title: "The intent is not valid in the current room state".to_string(),
            detail: error.to_string(),
        },
        Error::Internal(_) => WsMessageOut::Error {
            r#type: "INTERNAL_SERVER".to_string(),
            title: "Internal server error".to_string(),
            detail: error.to_string(),
        },
        Error::UnprocessableMessage(_, _) => WsMessageOut::Error {
            r#type: "UNPROCESSABLE_MESSAGE".to_string(),
            title: "The message could not be parsed".to_string(),
            detail: error.to_string(),
        },
        Error::WebsocketClosed(_) => WsMessageOut::Error {
            r#type: "WEBSOCKET_CLOSED".to_string(),
            title: "The player websocket is closed".to_string(),
            detail: error.to_string(),
        },
    }
}
