//! The AnkiConnect client, its builder, and the wire envelope.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::actions::{DeckActions, MediaActions, MiscActions, NoteActions};
use crate::error::{Error, Result};

/// Default URL for AnkiConnect.
const DEFAULT_URL: &str = "http://127.0.0.1:8765";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// AnkiConnect API version this client speaks.
const API_VERSION: u8 = 6;

/// The request envelope expected by AnkiConnect.
#[derive(Debug, Serialize)]
struct Envelope<'a, T> {
    action: &'a str,
    version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<T>,
}

/// The response envelope returned by AnkiConnect.
#[derive(Debug, Deserialize)]
struct Reply<T> {
    result: Option<T>,
    error: Option<String>,
}

/// Client for a running AnkiConnect instance.
///
/// # Example
///
/// ```no_run
/// use deckmate::AnkiClient;
///
/// # async fn example() -> deckmate::Result<()> {
/// let client = AnkiClient::new();
/// let decks = client.decks().names().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AnkiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AnkiClient {
    /// Create a client with default settings (`http://127.0.0.1:8765`,
    /// 30 second timeout).
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for custom client configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Access miscellaneous operations.
    pub fn misc(&self) -> MiscActions<'_> {
        MiscActions { client: self }
    }

    /// Access deck operations.
    pub fn decks(&self) -> DeckActions<'_> {
        DeckActions { client: self }
    }

    /// Access note operations.
    pub fn notes(&self) -> NoteActions<'_> {
        NoteActions { client: self }
    }

    /// Access media operations.
    pub fn media(&self) -> MediaActions<'_> {
        MediaActions { client: self }
    }

    /// Execute an action without parameters.
    pub(crate) async fn invoke_without_params<R>(&self, action: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let reply: Reply<R> = self.post::<(), R>(action, None).await?;
        match (reply.result, reply.error) {
            (Some(result), None) => Ok(result),
            (_, Some(err)) => Err(classify(err)),
            (None, None) => Err(Error::EmptyResponse),
        }
    }

    /// Execute an action with parameters.
    pub(crate) async fn invoke<P, R>(&self, action: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let reply: Reply<R> = self.post(action, Some(params)).await?;
        match (reply.result, reply.error) {
            (Some(result), None) => Ok(result),
            (_, Some(err)) => Err(classify(err)),
            (None, None) => Err(Error::EmptyResponse),
        }
    }

    /// Execute an action that returns null on success.
    pub(crate) async fn invoke_void<P>(&self, action: &str, params: P) -> Result<()>
    where
        P: Serialize,
    {
        let reply: Reply<serde_json::Value> = self.post(action, Some(params)).await?;
        match reply.error {
            Some(err) => Err(classify(err)),
            None => Ok(()),
        }
    }

    async fn post<P, R>(&self, action: &str, params: Option<P>) -> Result<Reply<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        debug!(action, "invoking AnkiConnect action");
        let envelope = Envelope {
            action,
            version: API_VERSION,
            key: self.api_key.as_deref(),
            params,
        };
        let response = self
            .http_client
            .post(&self.base_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::ConnectionRefused
                } else {
                    Error::Http(e)
                }
            })?;
        Ok(response.json().await?)
    }
}

/// Map an AnkiConnect error message to an error variant.
fn classify(message: String) -> Error {
    if message.contains("permission") {
        Error::PermissionDenied
    } else {
        Error::AnkiConnect(message)
    }
}

impl Default for AnkiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a customized [`AnkiClient`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use deckmate::AnkiClient;
///
/// let client = AnkiClient::builder()
///     .url("http://localhost:8765")
///     .timeout(Duration::from_secs(60))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the AnkiConnect URL. Defaults to `http://127.0.0.1:8765`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key, if AnkiConnect is configured to require one.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Build the client.
    pub fn build(self) -> AnkiClient {
        let http_client = Client::builder()
            .timeout(self.timeout)
            .build()
            .expect("Failed to build HTTP client");

        AnkiClient {
            http_client,
            base_url: self.base_url,
            api_key: self.api_key,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
