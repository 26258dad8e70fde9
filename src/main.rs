use tokio::net::TcpListener;

use asmaca::config::Config;
use asmaca::startup::run_web_server;

#[tokio::main]
async fn main() {
    std_logger::Config::logfmt().init();

    let config = Config::get().expect("Unable to read the configuration.");
    let address = format!(
        "{}:{}",
        config.application.host, config.application.port
    );
    let listener = TcpListener::bind(&address)
        .await
        .expect("Unable to bind the listener.");

    if let Err(error) = run_web_server(config, listener).await {
        log::error!("The web server stopped. Error: '{error}'.");
    }
}
