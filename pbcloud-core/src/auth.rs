use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::{DEFAULT_BASE_URL, PbCloudError, endpoint, handle_response, parse_base_url};

/// Password-grant authentication against the PocketBook Cloud.
#[derive(Clone)]
pub struct AuthClient {
    http: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
}

impl AuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, PbCloudError> {
        Self::with_base_url(DEFAULT_BASE_URL, client_id, client_secret)
    }

    pub fn with_base_url(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, PbCloudError> {
        Ok(Self {
            http: Client::new(),
            base_url: parse_base_url(base_url)?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Lists the bookstores ("providers") the account is registered with.
    pub async fn providers(&self, username: &str) -> Result<Vec<Provider>, PbCloudError> {
        let mut url = endpoint(&self.base_url, "auth/login")?;
        url.query_pairs_mut()
            .append_pair("username", username)
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret);
        let response = self.http.get(url).send().await?;
        let payload: ProvidersResponse = handle_response(response).await?;
        Ok(payload.providers)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Token, PbCloudError> {
        let url = endpoint(&self.base_url, &format!("auth/login/{}", request.provider))?;
        let form = [
            ("shop_id", request.shop_id.as_str()),
            ("username", request.username.as_str()),
            ("password", request.password.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "password"),
        ];

        let response = self.http.post(url).form(&form).send().await?;
        handle_response(response).await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Provider {
    pub alias: String,
    #[serde(default)]
    pub name: String,
    pub shop_id: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub logged_by: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ProvidersResponse {
    #[serde(default)]
    providers: Vec<Provider>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub shop_id: String,
    pub username: String,
    pub password: String,
    pub provider: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
