pub mod error;

pub use error::{Result, ScraperApiError};

use std::time::Duration;

use tracing::debug;

const SCRAPERAPI_URL: &str = "https://api.scraperapi.com/";

/// A completed proxy fetch. Non-2xx statuses are returned here, not as
/// errors — the caller decides what a failed page means.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

pub struct ScraperApiClient {
    client: reqwest::Client,
    api_key: String,
    country_code: String,
}

impl ScraperApiClient {
    pub fn new(api_key: &str, country_code: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            country_code: country_code.to_string(),
        }
    }

    /// Fetch a URL through the proxy. `render` enables JS rendering on the
    /// service side, which is slower — callers pass a matching `timeout`.
    pub async fn fetch(&self, url: &str, render: bool, timeout: Duration) -> Result<FetchResponse> {
        debug!(url, render, "ScraperAPI fetch");

        let resp = self
            .client
            .get(SCRAPERAPI_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", url),
                ("render", if render { "true" } else { "false" }),
                ("country_code", self.country_code.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(FetchResponse { status, body })
    }
}
