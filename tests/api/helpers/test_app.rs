use std::{net::SocketAddr, time::Duration};

use asmaca::config::Config;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub struct TestApp {
    pub base_address: String,
    pub round_advance_delay: Duration,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        // Binding to port 0 triggers an OS scan for an available port, this way we can run tests in parallel where each runs its own application
        let random_port_address = SocketAddr::from(([0, 0, 0, 0], 0));
        let listener = TcpListener::bind(random_port_address)
            .await
            .expect("Failed to bind random port.");
        let address = listener.local_addr().unwrap();
        std::env::set_var("ENVIRONMENT", "dev");
        let config = {
            let mut config = Config::get().expect("Failed to read configuration.");
            config.game.inactivity_timeout_seconds = 2;
            // Keep the settle-to-next-round pause short so tests don't crawl
            config.game.round_advance_delay_millis = 100;
            config
        };

        let server = asmaca::startup::run_web_server(config.clone(), listener);
        let _ = tokio::spawn(server);

        TestApp {
            base_address: format!("localhost:{}", address.port()),
            round_advance_delay: config.game.round_advance_delay(),
        }
    }

    pub async fn open_websocket(
        &self,
    ) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>, String> {
        tokio_tungstenite::connect_async(format!("ws://{}/ws", self.base_address))
            .await
            .map(|websocket_stream| websocket_stream.0)
            .map_err(|error| format!("WebSocket could not be created. Error: '{error}'."))
    }
}
