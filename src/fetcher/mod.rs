//! # Record Fetch Capability
//!
//! The resolver reads attributes of referenced records through the
//! [`RecordFetcher`] trait, so the remote data API can be swapped out.
//!
//! - [`WebApiFetcher`] - OData-style Web API over HTTP
//! - [`MockFetcher`] - canned records with failure and latency simulation
//!
//! ```rust
//! use autotext::fetcher::create_fetcher;
//!
//! let mock = create_fetcher("mock", None);
//! assert!(mock.is_ok());
//!
//! let unknown = create_fetcher("ftp", None);
//! assert!(unknown.is_err());
//! ```

mod mock;
mod webapi;

pub use mock::{FetchCall, MockFetcher};
pub use webapi::WebApiFetcher;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::WebApiConfig;
use crate::error::{AutotextError, FetchError};

/// Reads one attribute of one record from the external store
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    /// Fetcher name (e.g., "webapi", "mock")
    fn name(&self) -> &str;

    /// Fetch `attribute` of the `entity_type` record identified by `id`.
    ///
    /// The value is returned as display text.
    async fn fetch_attribute(
        &self,
        entity_type: &str,
        id: &str,
        attribute: &str,
    ) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: RecordFetcher + ?Sized> RecordFetcher for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_attribute(
        &self,
        entity_type: &str,
        id: &str,
        attribute: &str,
    ) -> Result<String, FetchError> {
        (**self).fetch_attribute(entity_type, id, attribute).await
    }
}

/// Create a fetcher by name
///
/// | Name | Description | Requires |
/// |------|-------------|----------|
/// | `webapi` | HTTP Web API | `web_api` section + token env var |
/// | `mock` | Testing / offline | Nothing |
pub fn create_fetcher(
    name: &str,
    web_api: Option<&WebApiConfig>,
) -> anyhow::Result<Arc<dyn RecordFetcher>> {
    match name.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockFetcher::new())),
        "webapi" => {
            let config = web_api.ok_or_else(|| AutotextError::MissingWebApi {
                name: name.to_string(),
            })?;
            Ok(Arc::new(WebApiFetcher::from_config(config)?))
        }
        _ => Err(AutotextError::UnknownFetcher {
            name: name.to_string(),
        }
        .into()),
    }
}
