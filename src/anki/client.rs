//! AnkiConnect client and the deck source built on it.
//!
//! Every request is a POST of `{action, version, key, params}` to the
//! configured URL; every response is `{result, error}` where a non-null
//! `error` means the action failed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::anki::DeckError;
use crate::config::AnkiConfig;

const ANKI_CONNECT_VERSION: u32 = 6;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<String>,
}

/// One field of a note, as returned by `cardsInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct CardField {
    pub value: String,
    pub order: u32,
}

/// Card data returned by `cardsInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct CardInfo {
    #[serde(rename = "cardId")]
    pub card_id: u64,
    pub fields: HashMap<String, CardField>,
}

impl CardInfo {
    /// Text of the front field (the one with `order == 0`).
    pub fn front(&self) -> Option<&str> {
        self.fields
            .values()
            .find(|field| field.order == 0)
            .map(|field| field.value.as_str())
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The two AnkiConnect actions deck fetching needs.
#[async_trait]
pub trait AnkiApi: Send + Sync {
    /// Card ids matching an Anki search query.
    async fn find_cards(&self, query: &str) -> Result<Vec<u64>, DeckError>;
    /// Card bodies for `ids`, in the order returned by the service.
    async fn cards_info(&self, ids: &[u64]) -> Result<Vec<CardInfo>, DeckError>;
}

/// Produces the ordered front-field texts of a named deck.
#[async_trait]
pub trait DeckSource: Send + Sync {
    async fn fetch_deck(&self, deck_name: &str) -> Result<Vec<String>, DeckError>;
}

// ---------------------------------------------------------------------------
// AnkiClient
// ---------------------------------------------------------------------------

pub struct AnkiClient {
    client: reqwest::Client,
    url: String,
    key: Option<String>,
}

impl AnkiClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>, key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            key,
        }
    }

    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &AnkiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::new(client, config.url.clone(), config.key.clone())
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<Value>,
    ) -> Result<Option<T>, DeckError> {
        let body = request_body(action, self.key.as_deref(), params);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeckError::FetchFailed(format!("{action}: {e}")))?;

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| DeckError::FetchFailed(format!("{action}: invalid response: {e}")))?;

        if let Some(error) = envelope.error {
            return Err(DeckError::FetchFailed(format!("{action}: {error}")));
        }
        Ok(envelope.result)
    }

    /// Ask the service to synchronise its collection with the remote account.
    pub async fn sync(&self) -> Result<(), DeckError> {
        self.invoke::<Value>("sync", None).await?;
        Ok(())
    }
}

pub(crate) fn request_body(action: &str, key: Option<&str>, params: Option<Value>) -> Value {
    let mut body = json!({
        "action":  action,
        "version": ANKI_CONNECT_VERSION,
    });
    if let Some(key) = key {
        body["key"] = key.into();
    }
    if let Some(params) = params {
        body["params"] = params;
    }
    body
}

/// Anki search query selecting every card of `deck_name`.
pub(crate) fn deck_query(deck_name: &str) -> String {
    format!("deck:\"{}\"", deck_name.replace('"', "\\\""))
}

#[async_trait]
impl AnkiApi for AnkiClient {
    async fn find_cards(&self, query: &str) -> Result<Vec<u64>, DeckError> {
        self.invoke("findCards", Some(json!({ "query": query })))
            .await?
            .ok_or_else(|| DeckError::FetchFailed("findCards: empty result".into()))
    }

    async fn cards_info(&self, ids: &[u64]) -> Result<Vec<CardInfo>, DeckError> {
        self.invoke("cardsInfo", Some(json!({ "cards": ids })))
            .await?
            .ok_or_else(|| DeckError::FetchFailed("cardsInfo: empty result".into()))
    }
}

// ---------------------------------------------------------------------------
// AnkiDeckSource
// ---------------------------------------------------------------------------

/// Fetches a deck by listing its card ids and then pulling card bodies in
/// fixed-size batches.
///
/// Batches are issued strictly one after another: batch N+1 is not sent until
/// batch N has been consumed.
pub struct AnkiDeckSource<A> {
    api: A,
    batch_size: usize,
}

impl<A: AnkiApi> AnkiDeckSource<A> {
    pub fn new(api: A, batch_size: usize) -> Self {
        Self {
            api,
            batch_size: batch_size.max(1),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl AnkiDeckSource<AnkiClient> {
    pub fn from_config(config: &AnkiConfig) -> Self {
        Self::new(AnkiClient::from_config(config), config.batch_size)
    }
}

#[async_trait]
impl<A: AnkiApi> DeckSource for AnkiDeckSource<A> {
    async fn fetch_deck(&self, deck_name: &str) -> Result<Vec<String>, DeckError> {
        let ids = self.api.find_cards(&deck_query(deck_name)).await?;
        log::debug!("decks: {deck_name} has {} cards", ids.len());

        let mut fronts = Vec::with_capacity(ids.len());
        for batch in ids.chunks(self.batch_size) {
            let cards = self.api.cards_info(batch).await?;
            fronts.extend(cards.iter().filter_map(|card| card.front().map(str::to_string)));
        }
        Ok(fronts)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
