use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://cloud.pocketbook.digital/api/v1.0/";

#[derive(Debug, Error)]
pub enum PbCloudError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

impl PbCloudError {
    /// HTTP status reported by the API, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PbCloudError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Library listing endpoints. Authentication lives in [`crate::AuthClient`].
#[derive(Clone)]
pub struct CloudClient {
    http: Client,
    base_url: Url,
}

impl CloudClient {
    pub fn new() -> Result<Self, PbCloudError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, PbCloudError> {
        Ok(Self {
            http: Client::new(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Fetches one page of the user's books. `limit == 0` returns only the total.
    pub async fn books(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<BookPage, PbCloudError> {
        let mut url = endpoint(&self.base_url, "books")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?;
        handle_response(response).await
    }
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, PbCloudError> {
    // Url::join drops the last segment unless the base ends with a slash.
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{base_url}/"))?)
    }
}

pub(crate) fn endpoint(base_url: &Url, path: &str) -> Result<Url, PbCloudError> {
    Ok(base_url.join(path.trim_start_matches('/'))?)
}

pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PbCloudError> {
    if response.status().is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(PbCloudError::Api { status, body })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BookPage {
    pub total: u32,
    #[serde(default)]
    pub items: Vec<CloudBook>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CloudBook {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}
