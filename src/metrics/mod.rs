use lazy_static::lazy_static;
use prometheus::{IntGauge, Registry};
use std::sync::Once;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ACTIVE_ROOMS: IntGauge =
        IntGauge::new("asmaca_active_rooms", "Active ongoing rooms")
            .expect("metric cannot be created");
    pub static ref CONNECTED_PLAYERS: IntGauge =
        IntGauge::new("asmaca_connected_players", "Amount of players connected")
            .expect("metric cannot be created");
}

static REGISTER: Once = Once::new();

pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(ACTIVE_ROOMS.clone()))
            .expect("collector cannot be registered");

        REGISTRY
            .register(Box::new(CONNECTED_PLAYERS.clone()))
            .expect("collector cannot be registered");
    });
}
