use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::metrics::register_metrics;
use crate::registry::actor::RoomRegistryActor;
use crate::routes;

pub async fn run_web_server(config: Config, listener: TcpListener) -> Result<(), std::io::Error> {
    register_metrics();

    let registry = Arc::new(RoomRegistryActor::spawn(config.game.clone()));
    let router = routes::create_router(&config).with_state(registry);

    if let Ok(address) = listener.local_addr() {
        log::info!("Listening on {address}");
    }
    axum::serve(listener, router).await
}
