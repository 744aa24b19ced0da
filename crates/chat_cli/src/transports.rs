//! Startup transport selection.

use std::path::Path;
use std::time::Duration;

use chat_session::{EnvConfig, InitialFetch, SessionConfig};
use chat_transport::{ChatTransport, TransportRequest, TransportResult};
use chat_transport_http::{HttpTransport, HttpTransportConfig, HTTP_TRANSPORT_ID};
use chat_transport_mock::{ScriptedTransport, MOCK_TRANSPORT_ID};

pub const DEFAULT_TRANSPORT_ID: &str = MOCK_TRANSPORT_ID;
pub const TRANSPORT_ENV_VAR: &str = "CHAT_CLI_TRANSPORT";

const MOCK_SEND_URL: &str = "mock://chat";
const MOCK_HISTORY_URL: &str = "mock://history";
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The transports the CLI can drive.
#[derive(Debug)]
pub enum CliTransport {
    Mock(ScriptedTransport),
    Http(HttpTransport),
}

impl CliTransport {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Mock(_) => MOCK_TRANSPORT_ID,
            Self::Http(_) => HTTP_TRANSPORT_ID,
        }
    }
}

impl ChatTransport for CliTransport {
    async fn fetch_initial(&self, request: TransportRequest) -> TransportResult {
        match self {
            Self::Mock(transport) => transport.fetch_initial(request).await,
            Self::Http(transport) => transport.fetch_initial(request).await,
        }
    }

    async fn send(&self, request: TransportRequest) -> TransportResult {
        match self {
            Self::Mock(transport) => transport.send(request).await,
            Self::Http(transport) => transport.send(request).await,
        }
    }

    fn close(&self) {
        match self {
            Self::Mock(transport) => transport.close(),
            Self::Http(transport) => transport.close(),
        }
    }
}

pub fn transport_from_env(env: &EnvConfig) -> Result<(CliTransport, SessionConfig), String> {
    let transport_id = std::env::var(TRANSPORT_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    transport_for_id(
        transport_id.as_deref().unwrap_or(DEFAULT_TRANSPORT_ID),
        env.config_path.as_deref(),
    )
}

pub fn transport_for_id(
    transport_id: &str,
    config_path: Option<&Path>,
) -> Result<(CliTransport, SessionConfig), String> {
    match transport_id {
        MOCK_TRANSPORT_ID => {
            let config = match config_path {
                Some(path) => SessionConfig::from_file(path).map_err(|error| error.to_string())?,
                None => SessionConfig::new(MOCK_SEND_URL)
                    .with_initial_fetch(InitialFetch::new(MOCK_HISTORY_URL)),
            };
            Ok((CliTransport::Mock(ScriptedTransport::new()), config))
        }
        HTTP_TRANSPORT_ID => {
            let Some(path) = config_path else {
                return Err(format!(
                    "Transport '{HTTP_TRANSPORT_ID}' requires {} to point at a session config file",
                    chat_session::config::CONFIG_PATH_ENV
                ));
            };
            let config = SessionConfig::from_file(path).map_err(|error| error.to_string())?;
            let transport = HttpTransport::new(
                HttpTransportConfig::new().with_connect_timeout(HTTP_CONNECT_TIMEOUT),
            )
            .map_err(|error| error.to_string())?;
            Ok((CliTransport::Http(transport), config))
        }
        unknown => Err(format!(
            "Unsupported transport '{unknown}'. Available transports: {MOCK_TRANSPORT_ID}, {HTTP_TRANSPORT_ID}"
        )),
    }
}
