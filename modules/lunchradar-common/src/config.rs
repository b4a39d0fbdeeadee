use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Proxy fetch backend
    pub scraperapi_key: String,

    // AI extraction backend
    pub openai_api_key: String,

    // Screenshot rendering backend
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Locale hint passed to the fetch backend
    pub country_code: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            scraperapi_key: required_env("SCRAPERAPI_KEY"),
            openai_api_key: required_env("OPENAI_API_KEY"),
            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
            country_code: env::var("COUNTRY_CODE").unwrap_or_else(|_| "se".to_string()),
        }
    }

    /// Log a redacted view so runs record which backends were configured.
    pub fn log_redacted(&self) {
        tracing::info!(
            browserless_url = self.browserless_url.as_str(),
            browserless_token = self.browserless_token.is_some(),
            country_code = self.country_code.as_str(),
            "Config loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
