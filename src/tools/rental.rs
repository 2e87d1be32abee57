//! Remote lookup behind the `rental-search` tool.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::LookupConfig;
use crate::error::{Error, ErrorContext};
use crate::transport::HttpTransport;
use crate::Result;

/// Search parameters of one rental lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalQuery {
    pub search: String,
    pub country: String,
    pub city: Option<String>,
}

/// Location lookup collaborator. Implementations return the decoded JSON body
/// or [`Error::RemoteLookup`].
#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn lookup(&self, query: &RentalQuery) -> Result<Value>;
}

/// Single GET against a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpLocationLookup {
    transport: HttpTransport,
    base_url: Url,
    forward_search: bool,
}

impl HttpLocationLookup {
    pub fn new(config: &LookupConfig, transport: HttpTransport) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid lookup URL: {}", e),
                ErrorContext::new()
                    .with_field_path("lookup.base_url")
                    .with_details(config.base_url.clone()),
            )
        })?;
        Ok(Self {
            transport,
            base_url,
            forward_search: config.forward_search,
        })
    }

    /// Request URL for `query`. Search terms are appended only when forwarding is on.
    pub fn request_url(&self, query: &RentalQuery) -> Url {
        let mut url = self.base_url.clone();
        if self.forward_search {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("search", &query.search);
            pairs.append_pair("country", &query.country);
            if let Some(city) = &query.city {
                pairs.append_pair("city", city);
            }
        }
        url
    }
}

#[async_trait]
impl LocationLookup for HttpLocationLookup {
    async fn lookup(&self, query: &RentalQuery) -> Result<Value> {
        let url = self.request_url(query);
        tracing::debug!(%url, "rental lookup");
        self.transport.get_json(url).await.map_err(|e| {
            Error::remote_lookup_with_context(
                e.to_string(),
                ErrorContext::new()
                    .with_source("rental_lookup")
                    .with_details(self.base_url.to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(forward_search: bool) -> HttpLocationLookup {
        let config = LookupConfig {
            base_url: "http://localhost:8080/mock".into(),
            forward_search,
        };
        HttpLocationLookup::new(&config, HttpTransport::new().unwrap()).unwrap()
    }

    fn query(city: Option<&str>) -> RentalQuery {
        RentalQuery {
            search: "ocean view".into(),
            country: "US".into(),
            city: city.map(String::from),
        }
    }

    #[test]
    fn test_forwarding_appends_search_terms() {
        let url = lookup(true).request_url(&query(Some("Miami")));
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/mock?search=ocean+view&country=US&city=Miami"
        );
        let url = lookup(true).request_url(&query(None));
        assert_eq!(url.query(), Some("search=ocean+view&country=US"));
    }

    #[test]
    fn test_forwarding_disabled_keeps_bare_url() {
        let url = lookup(false).request_url(&query(Some("Miami")));
        assert_eq!(url.as_str(), "http://localhost:8080/mock");
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let config = LookupConfig {
            base_url: "not a url".into(),
            forward_search: true,
        };
        let err = HttpLocationLookup::new(&config, HttpTransport::new().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
