pub mod endpoints;

use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, ShdwError};

/// HTTP client wrapper for the Shadow Drive storage gateway.
#[derive(Debug, Clone)]
pub struct ShdwHttpClient {
    client: Client,
    base_url: String,
}

impl ShdwHttpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let resp = self.client.post(&url).json(body).send().await?;
        Self::decode(resp).await
    }

    /// POST a multipart form and decode a JSON response.
    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST multipart");
        let resp = self.client.post(&url).multipart(form).send().await?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ShdwError::Http {
                status,
                message: body,
            });
        }

        resp.json::<T>().await.map_err(ShdwError::Request)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
