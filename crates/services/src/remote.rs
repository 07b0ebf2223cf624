use std::env;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RemoteStoreError;

// Collection names owned by the deployed document store.
pub(crate) const COURSES: &str = "cursos";
pub(crate) const USER_PROGRESS: &str = "userProgress";
pub(crate) const FEEDBACKS: &str = "feedbacks";
pub(crate) const USERS: &str = "users";

#[derive(Clone, Debug)]
pub struct RemoteStoreConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RemoteStoreConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("CODEWISE_STORE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let api_key = env::var("CODEWISE_STORE_API_KEY").unwrap_or_default();
        Some(Self { base_url, api_key })
    }
}

/// A document together with its store-assigned identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    id: String,
}

/// JSON document client for the hosted store.
///
/// Each call suspends only for its HTTP round-trip; callers decide whether
/// the result is awaited (foreground actions) or detached (background sync).
/// With no configuration present every call fails with
/// `RemoteStoreError::Disabled`.
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    config: Option<RemoteStoreConfig>,
}

impl DocumentStore {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RemoteStoreConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<RemoteStoreConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&RemoteStoreConfig, RemoteStoreError> {
        self.config.as_ref().ok_or(RemoteStoreError::Disabled)
    }

    fn request(
        &self,
        method: Method,
        collection: &str,
        id: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, RemoteStoreError> {
        let config = self.config()?;
        let base = config.base_url.trim_end_matches('/');
        let url = match id {
            Some(id) => format!("{base}/{collection}/{id}"),
            None => format!("{base}/{collection}"),
        };
        let builder = self.client.request(method, url);
        if config.api_key.is_empty() {
            Ok(builder)
        } else {
            Ok(builder.bearer_auth(&config.api_key))
        }
    }

    /// Fetch one document; `Ok(None)` when it does not exist.
    ///
    /// This is the single point where an absent document becomes an option;
    /// callers map `None` onto their own not-found handling.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` for transport failures, non-success
    /// statuses other than 404, or when the client is disabled.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, RemoteStoreError> {
        let response = self.request(Method::GET, collection, Some(id))?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RemoteStoreError::HttpStatus(response.status()));
        }
        Ok(Some(response.json().await?))
    }

    /// List every document in a collection.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` for transport failures, non-success
    /// statuses, or when the client is disabled.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<Document<T>>, RemoteStoreError> {
        let response = self.request(Method::GET, collection, None)?.send().await?;
        if !response.status().is_success() {
            return Err(RemoteStoreError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Append a document; the store assigns and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` for transport failures, non-success
    /// statuses, or when the client is disabled.
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        body: &T,
    ) -> Result<String, RemoteStoreError> {
        let response = self
            .request(Method::POST, collection, None)?
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteStoreError::HttpStatus(response.status()));
        }
        let created: CreatedDocument = response.json().await?;
        Ok(created.id)
    }

    /// Merge fields onto a document, creating it when absent.
    ///
    /// The merge is field-level: fields not named in `body` survive.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` for transport failures, non-success
    /// statuses, or when the client is disabled.
    pub async fn upsert_merge<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        body: &T,
    ) -> Result<(), RemoteStoreError> {
        let response = self
            .request(Method::PATCH, collection, Some(id))?
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteStoreError::HttpStatus(response.status()));
        }
        Ok(())
    }

    /// Replace a document wholesale.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` for transport failures, non-success
    /// statuses, or when the client is disabled.
    pub async fn replace<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        body: &T,
    ) -> Result<(), RemoteStoreError> {
        let response = self
            .request(Method::PUT, collection, Some(id))?
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteStoreError::HttpStatus(response.status()));
        }
        Ok(())
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` for transport failures, non-success
    /// statuses, or when the client is disabled.
    pub async fn remove(&self, collection: &str, id: &str) -> Result<(), RemoteStoreError> {
        let response = self
            .request(Method::DELETE, collection, Some(id))?
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteStoreError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
