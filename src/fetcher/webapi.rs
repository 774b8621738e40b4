//! Web API fetcher
//!
//! Reads a single record attribute over an OData-style REST API:
//! `GET {base_url}/{entity_set}({id})?$select={attribute}`.
//! The bearer token is read from the environment variable named in the
//! control file (`web_api.token_env`).

use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use url::Url;

use super::RecordFetcher;
use crate::config::WebApiConfig;
use crate::error::{AutotextError, FetchError};

/// Default request timeout when the control file sets none
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetcher backed by an OData-style Web API
pub struct WebApiFetcher {
    /// HTTP client
    client: reqwest::Client,
    /// API root, e.g. `https://org.crm.dynamics.com/api/data/v9.2`
    base_url: Url,
    /// Bearer token
    token: Option<String>,
    /// entity type → entity set name overrides
    entity_sets: FxHashMap<String, String>,
}

impl WebApiFetcher {
    /// Create a fetcher for `base_url` with no token
    pub fn new(base_url: &str) -> Result<Self, AutotextError> {
        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT_SECS)?,
            base_url: parse_base_url(base_url)?,
            token: None,
            entity_sets: FxHashMap::default(),
        })
    }

    /// Create from the control file's `web_api` section.
    ///
    /// Reads the token from `token_env` when set.
    pub fn from_config(config: &WebApiConfig) -> Result<Self, AutotextError> {
        let token = match &config.token_env {
            Some(var) => Some(
                std::env::var(var).map_err(|_| AutotextError::MissingToken { var: var.clone() })?,
            ),
            None => None,
        };

        Ok(Self {
            client: build_client(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))?,
            base_url: parse_base_url(&config.base_url)?,
            token,
            entity_sets: config.entity_sets.clone(),
        })
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Map an entity type to its entity set name
    pub fn with_entity_set(mut self, entity_type: impl Into<String>, set: impl Into<String>) -> Self {
        self.entity_sets.insert(entity_type.into(), set.into());
        self
    }

    /// Entity set for an entity type; defaults to the plural `<entity_type>s`
    pub fn entity_set(&self, entity_type: &str) -> String {
        self.entity_sets
            .get(entity_type)
            .cloned()
            .unwrap_or_else(|| format!("{}s", entity_type))
    }

    /// URL selecting one attribute of one record
    pub fn record_url(&self, entity_type: &str, id: &str, attribute: &str) -> Result<Url, FetchError> {
        let id = id.trim_start_matches('{').trim_end_matches('}');
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Other(format!("base url '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .push(&format!("{}({})", self.entity_set(entity_type), id));
        url.query_pairs_mut().append_pair("$select", attribute);
        Ok(url)
    }
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, AutotextError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AutotextError::Config {
            reason: format!("Failed to build HTTP client: {}", e),
        })
}

fn parse_base_url(base_url: &str) -> Result<Url, AutotextError> {
    let url = Url::parse(base_url).map_err(|e| AutotextError::Config {
        reason: format!("Invalid web_api.base_url '{}': {}", base_url, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AutotextError::Config {
            reason: format!("web_api.base_url must be http or https, got '{}'", url.scheme()),
        });
    }

    Ok(url)
}

/// Render a JSON attribute value as display text
fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl RecordFetcher for WebApiFetcher {
    fn name(&self) -> &str {
        "webapi"
    }

    async fn fetch_attribute(
        &self,
        entity_type: &str,
        id: &str,
        attribute: &str,
    ) -> Result<String, FetchError> {
        let url = self.record_url(entity_type, id, attribute)?;
        tracing::debug!(%url, "retrieving record attribute");

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let record: Value = response.json().await?;
        record
            .get(attribute)
            .and_then(attribute_text)
            .ok_or_else(|| FetchError::AttributeMissing {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
                attribute: attribute.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_url_uses_plural_entity_set() {
        let fetcher = WebApiFetcher::new("https://org.example.com/api/data/v9.2").unwrap();
        let url = fetcher.record_url("account", "abc", "telephone1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://org.example.com/api/data/v9.2/accounts(abc)?%24select=telephone1"
        );
    }

    #[test]
    fn record_url_honours_entity_set_override_and_braces() {
        let fetcher = WebApiFetcher::new("https://org.example.com/api/data/v9.2/")
            .unwrap()
            .with_entity_set("city", "cities");
        let url = fetcher.record_url("city", "{1234}", "name").unwrap();
        assert_eq!(url.path(), "/api/data/v9.2/cities(1234)");
        assert_eq!(url.query(), Some("%24select=name"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(matches!(
            WebApiFetcher::new("ftp://example.com"),
            Err(AutotextError::Config { .. })
        ));
        assert!(WebApiFetcher::new("not a url").is_err());
    }

    #[test]
    fn missing_token_env_is_an_error() {
        let config = WebApiConfig {
            base_url: "https://org.example.com/api".into(),
            token_env: Some("AUTOTEXT_TEST_TOKEN_THAT_IS_NEVER_SET".into()),
            timeout_secs: None,
            entity_sets: FxHashMap::default(),
        };
        assert!(matches!(
            WebApiFetcher::from_config(&config),
            Err(AutotextError::MissingToken { .. })
        ));
    }

    #[test]
    fn attribute_text_rendering() {
        assert_eq!(attribute_text(&json!("x")), Some("x".to_string()));
        assert_eq!(attribute_text(&json!(12.5)), Some("12.5".to_string()));
        assert_eq!(attribute_text(&json!(false)), Some("false".to_string()));
        assert_eq!(attribute_text(&json!(null)), None);
    }
}
