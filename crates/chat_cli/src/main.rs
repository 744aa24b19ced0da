use std::io;

use chat_cli::app::ChatApp;
use chat_cli::transports;
use chat_session::{logging, EnvConfig, SessionController, SessionHooks};
use tokio::io::BufReader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let env = EnvConfig::from_env();
    logging::init(&env);

    let (transport, config) = transports::transport_from_env(&env).map_err(io::Error::other)?;
    tracing::info!(transport = transport.id(), send_url = %config.send_url, "starting chat session");

    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    let controller = SessionController::new(transport, config, SessionHooks::default(), sender);

    let app = ChatApp::new(controller, receiver, tokio::io::stdout());
    app.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
