//! IGN France token service over HTTP.

use futures::{
    SinkExt, StreamExt,
    channel::mpsc::{Receiver, Sender, channel},
};
use reqwest::header::USER_AGENT;

use super::runtime::Runtime;
use crate::token::TokenIssuer;

/// Commands waiting for the IO thread. Requests are rare, so this is plenty.
const CHANNEL_SIZE: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed token response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where and how tokens are requested.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct IssuerOptions {
    pub base_url: String,

    /// API key issued by IGN France for the Géoportail.
    pub api_key: String,

    /// User agent to be sent to the token service.
    ///
    /// This should be set only on native targets. The browser sets its own user agent on wasm
    /// targets.
    pub user_agent: Option<String>,
}

impl Default for IssuerOptions {
    fn default() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let user_agent = Some(
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        );

        #[cfg(target_arch = "wasm32")]
        let user_agent = None;

        Self {
            base_url: "http://jeton-api.ign.fr".to_owned(),
            api_key: String::new(),
            user_agent,
        }
    }
}

impl IssuerOptions {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    gppkey: String,
}

enum Command {
    Request(Option<String>),
    Release(String),
}

/// Requests tokens on a background IO thread. Issued tokens are handed out by
/// [`TokenIssuer::poll_token`].
pub struct HttpTokenIssuer {
    /// Commands to be executed by the IO thread.
    command_tx: Sender<Command>,

    /// Tokens issued by the service.
    token_rx: Receiver<String>,

    #[allow(dead_code)] // Significant Drop
    runtime: Runtime,
}

impl HttpTokenIssuer {
    pub fn new(options: IssuerOptions) -> Self {
        let (command_tx, command_rx) = channel(CHANNEL_SIZE);
        let (token_tx, token_rx) = channel(CHANNEL_SIZE);

        let runtime = Runtime::new(issue_continuously(options, command_rx, token_tx));

        Self {
            command_tx,
            token_rx,
            runtime,
        }
    }

    fn send(&mut self, command: Command) {
        if let Err(err) = self.command_tx.try_send(command) {
            log::warn!("Could not queue token command: {err}.");
        }
    }
}

impl TokenIssuer for HttpTokenIssuer {
    fn request(&mut self, previous: Option<&str>) {
        self.send(Command::Request(previous.map(str::to_owned)));
    }

    fn release(&mut self, token: Option<&str>) {
        match token {
            Some(token) => self.send(Command::Release(token.to_owned())),
            None => log::debug!("No token to release."),
        }
    }

    fn poll_token(&mut self) -> Option<String> {
        match self.token_rx.try_next() {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                log::error!("IO thread is dead.");
                None
            }
            // Nothing issued since the last call.
            Err(_) => None,
        }
    }
}

fn get(
    client: &reqwest::Client,
    options: &IssuerOptions,
    endpoint: &str,
) -> reqwest::RequestBuilder {
    let request = client.get(format!(
        "{}/{endpoint}",
        options.base_url.trim_end_matches('/')
    ));

    match &options.user_agent {
        Some(user_agent) => request.header(USER_AGENT, user_agent),
        None => request,
    }
}

async fn get_token(
    client: &reqwest::Client,
    options: &IssuerOptions,
    previous: Option<&str>,
) -> Result<String, Error> {
    let mut query = vec![("key", options.api_key.as_str())];
    if let Some(previous) = previous {
        query.push(("gppkey", previous));
    }

    let response = get(client, options, "getToken")
        .query(&query)
        .send()
        .await?
        .error_for_status()?;

    let bytes = response.bytes().await?;
    let response: TokenResponse = serde_json::from_slice(&bytes)?;
    Ok(response.gppkey)
}

async fn release_token(
    client: &reqwest::Client,
    options: &IssuerOptions,
    token: &str,
) -> Result<(), Error> {
    get(client, options, "releaseToken")
        .query(&[("gppkey", token)])
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

/// Execute commands until the issuer is dropped.
async fn issue_continuously(
    options: IssuerOptions,
    mut command_rx: Receiver<Command>,
    mut token_tx: Sender<String>,
) {
    // Keep outside the loop to reuse it as much as possible.
    let client = reqwest::Client::new();

    while let Some(command) = command_rx.next().await {
        match command {
            Command::Request(previous) => {
                log::debug!("Requesting a token from {}.", options.base_url);
                match get_token(&client, &options, previous.as_deref()).await {
                    Ok(token) => {
                        if token_tx.send(token).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => log::warn!("Could not get a token: {err}."),
                }
            }
            Command::Release(token) => {
                log::debug!("Releasing the token.");
                if let Err(err) = release_token(&client, &options, &token).await {
                    log::warn!("Could not release the token: {err}.");
                }
            }
        }
    }

    log::debug!("Token issuer is shutting down.");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{TokenLifecycle, options::TokenOptions};

    fn options(server: &hypermocker::Server) -> IssuerOptions {
        IssuerOptions {
            base_url: format!("http://localhost:{}", server.port()),
            ..IssuerOptions::with_api_key("abc")
        }
    }

    async fn token_eventually(issuer: &mut HttpTokenIssuer) -> String {
        loop {
            if let Some(token) = issuer.poll_token() {
                return token;
            }
            // Need to yield to the runtime for things to move.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn first_token() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let mut anticipated = server.anticipate("/getToken?key=abc").await;
        let mut issuer = HttpTokenIssuer::new(options(&server));

        issuer.request(None);
        assert_eq!(None, issuer.poll_token());

        let request = anticipated.expect().await;
        assert_eq!(
            Some(concat!("worldtopo/", env!("CARGO_PKG_VERSION"))),
            request
                .headers
                .get(USER_AGENT)
                .and_then(|value| value.to_str().ok())
        );

        anticipated.respond(r#"{"gppkey":"t1"}"#).await;
        assert_eq!("t1", token_eventually(&mut issuer).await);
    }

    #[tokio::test]
    async fn renewal_is_chained_to_previous_token() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let anticipated = server.anticipate("/getToken?key=abc&gppkey=t1").await;
        let mut issuer = HttpTokenIssuer::new(options(&server));

        issuer.request(Some("t1"));
        anticipated.respond(r#"{"gppkey":"t2"}"#).await;
        assert_eq!("t2", token_eventually(&mut issuer).await);
    }

    #[tokio::test]
    async fn release() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let mut anticipated = server.anticipate("/releaseToken?gppkey=t1").await;
        let mut issuer = HttpTokenIssuer::new(options(&server));

        // Nothing to release, so nothing is sent.
        issuer.release(None);
        issuer.release(Some("t1"));

        anticipated.expect().await;
        anticipated.respond("").await;
    }

    #[tokio::test]
    async fn malformed_response_is_dropped() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let first = server.anticipate("/getToken?key=abc").await;
        let mut issuer = HttpTokenIssuer::new(options(&server));

        issuer.request(None);
        first.respond("garbage").await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(None, issuer.poll_token());

        // Issuer keeps working.
        let second = server.anticipate("/getToken?key=abc").await;
        issuer.request(None);
        second.respond(r#"{"gppkey":"t1"}"#).await;
        assert_eq!("t1", token_eventually(&mut issuer).await);
    }

    #[tokio::test]
    async fn lifecycle_over_http() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let anticipated = server.anticipate("/getToken?key=abc").await;

        let mut lifecycle =
            TokenLifecycle::new(TokenOptions::default(), HttpTokenIssuer::new(options(&server)));
        anticipated.respond(r#"{"gppkey":"t1"}"#).await;

        while lifecycle.token().is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
            lifecycle.poll(instant::Instant::now());
        }
        assert_eq!(Some("t1".to_owned()), lifecycle.acquire());
    }
}
