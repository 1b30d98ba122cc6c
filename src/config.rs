//! repository configuration
//!
//! build a [`RepositoryConfig`] with the graphql endpoint and optional overrides.
//! pass it to [`crate::Repository::new`] to create a repository.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// configuration for a graphql repository
#[derive(Clone)]
pub struct RepositoryConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// graphql endpoint (e.g., "<https://hasura.example.com/v1/graphql>")
    pub(crate) endpoint: Url,

    /// whether the provided endpoint parsed successfully
    pub(crate) endpoint_valid: bool,

    /// request timeout duration
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// whether to verify ssl certificates
    pub(crate) verify_ssl: bool,

    /// headers sent with every request
    pub(crate) global_headers: HeaderMap,

    /// prebuilt http client (takes precedence over http_client_builder)
    pub(crate) http_client: Option<reqwest::Client>,

    /// callback to customize the http client builder before building
    pub(crate) http_client_builder:
        Option<Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>>,
}

impl RepositoryConfig {
    /// create a new repository configuration
    ///
    /// # arguments
    ///
    /// * `endpoint` - the graphql endpoint; `https://` is assumed when no scheme is given
    ///
    /// # example
    ///
    /// ```
    /// use hentities::RepositoryConfig;
    ///
    /// let config = RepositoryConfig::new("https://hasura.example.com/v1/graphql");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let raw = endpoint.as_ref();

        let (endpoint, endpoint_valid) = match Url::parse(raw.trim())
            .or_else(|_| Url::parse(&format!("https://{}", raw.trim())))
        {
            Ok(url) => (url, true),
            Err(_) => (Url::parse("https://invalid.invalid").unwrap(), false),
        };

        Self {
            raw_endpoint: raw.to_string(),
            endpoint,
            endpoint_valid,
            timeout: Duration::from_secs(30),
            user_agent: format!("hentities-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            global_headers: HeaderMap::new(),
            http_client: None,
            http_client_builder: None,
        }
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// disable ssl certificate verification (not recommended for production)
    ///
    /// default: enabled
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.global_headers.insert(name, value);
        self
    }

    /// replace the headers sent with every request.
    ///
    /// `content-type: application/json` is always sent and cannot be replaced
    /// here.
    pub fn with_global_headers(mut self, headers: HeaderMap) -> Self {
        self.global_headers = headers;
        self
    }

    /// access the global headers configured on this repository
    pub fn global_headers(&self) -> &HeaderMap {
        &self.global_headers
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// inject a prebuilt http client.
    ///
    /// when set, this client is used as-is and takes precedence over
    /// `with_http_client_builder`. tls, timeouts, ssl verification, and user
    /// agent come from the prebuilt client; the corresponding
    /// `RepositoryConfig` fields are ignored. global headers still apply.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// customize the http client builder before the client is created.
    ///
    /// the callback receives a builder that already has the user agent,
    /// timeout, and ssl settings applied.
    ///
    /// ignored if `with_http_client` is also set.
    pub fn with_http_client_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.http_client_builder = Some(Arc::new(f));
        self
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.endpoint_valid {
            return Err(Error::Config(format!(
                "invalid endpoint: {}",
                self.raw_endpoint
            )));
        }

        if self.endpoint.scheme() != "http" && self.endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                self.endpoint.scheme()
            )));
        }

        Ok(())
    }

    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        if let Some(client) = &self.http_client {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.verify_ssl);
        if let Some(customize) = &self.http_client_builder {
            builder = customize(builder);
        }

        builder
            .build()
            .map_err(|err| Error::Config(format!("cannot build http client: {err}")))
    }
}

impl std::fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self
            .global_headers
            .keys()
            .map(|name| name.as_str())
            .collect();
        f.debug_struct("RepositoryConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("global_headers", &header_names)
            .field("http_client", &self.http_client.is_some())
            .field("http_client_builder", &self.http_client_builder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = RepositoryConfig::new("https://hasura.example.com/v1/graphql");
        assert_eq!(
            config.endpoint.as_str(),
            "https://hasura.example.com/v1/graphql"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.verify_ssl);
        assert!(config.global_headers.is_empty());
    }

    #[test]
    fn test_endpoint_without_scheme() {
        let config = RepositoryConfig::new("hasura.example.com/v1/graphql");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.endpoint().as_str(),
            "https://hasura.example.com/v1/graphql"
        );
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut config = RepositoryConfig::new("https://hasura.example.com");
        config.endpoint_valid = false;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = RepositoryConfig::new("");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_invalid_scheme() {
        let config = RepositoryConfig::new("ftp://example.com/graphql");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-hasura-admin-secret"),
            HeaderValue::from_static("secret"),
        );

        let config = RepositoryConfig::new("https://hasura.example.com/v1/graphql")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("hentities-test")
            .with_ssl_verification(false)
            .with_global_headers(headers)
            .with_header(
                HeaderName::from_static("x-other"),
                HeaderValue::from_static("other"),
            );

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "hentities-test");
        assert!(!config.verify_ssl);
        assert_eq!(
            config.global_headers().get("x-hasura-admin-secret").unwrap(),
            "secret"
        );
        assert_eq!(config.global_headers().get("x-other").unwrap(), "other");
    }

    #[test]
    fn test_with_http_client() {
        let prebuilt = reqwest::Client::new();
        let config = RepositoryConfig::new("https://hasura.example.com").with_http_client(prebuilt);
        assert!(config.http_client.is_some());
        assert!(config.http_client_builder.is_none());
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_with_http_client_builder() {
        let config = RepositoryConfig::new("https://hasura.example.com")
            .with_http_client_builder(|b| b.connection_verbose(true));
        assert!(config.http_client.is_none());
        assert!(config.http_client_builder.is_some());
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_debug_redacts_header_values() {
        let config = RepositoryConfig::new("https://hasura.example.com").with_header(
            HeaderName::from_static("x-hasura-admin-secret"),
            HeaderValue::from_static("top-secret"),
        );
        let debug = format!("{config:?}");
        assert!(debug.contains("x-hasura-admin-secret"));
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("http_client: false"));
    }
}
