use axum::response::{IntoResponse, Response};
use hyper::StatusCode;

use crate::metrics::REGISTRY;

pub async fn metrics_handler() -> Response {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        log::error!("Could not encode custom metrics: {error}");
    };
    let mut body = match String::from_utf8(buffer) {
        Ok(body) => body,
        Err(error) => {
            log::error!("Custom metrics could not be from_utf8'd: {error}");
            String::default()
        }
    };

    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&prometheus::gather(), &mut buffer) {
        log::error!("Could not encode prometheus metrics: {error}");
    };
    let process_body = match String::from_utf8(buffer) {
        Ok(body) => body,
        Err(error) => {
            log::error!("Prometheus metrics could not be from_utf8'd: {error}");
            String::default()
        }
    };

    body.push_str(&process_body);

    (StatusCode::OK, body).into_response()
}
