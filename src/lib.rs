pub mod config;
pub mod error;
pub mod mask;
pub mod metrics;
pub mod player;
pub mod registry;
pub mod room;
pub mod routes;
pub mod startup;
pub mod text;
pub mod websocket;
