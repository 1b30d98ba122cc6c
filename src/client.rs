//! graphql repository
//!
//! runs queries and mutations against a single endpoint and decodes the
//! payload found under the operation's root field.

use crate::call::Call;
use crate::config::RepositoryConfig;
use crate::error::{Error, Result};
use crate::graphql::{Envelope, GraphQlRequest, Payload};
use crate::operation::{Operation, TypedOperation};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// graphql repository bound to one endpoint
///
/// cloning is cheap; clones share the configuration and connection pool.
#[derive(Clone)]
pub struct Repository {
    config: Arc<RepositoryConfig>,
    headers: Arc<HeaderMap>,
    http: reqwest::Client,
}

impl Repository {
    /// create a new repository
    pub fn new(config: RepositoryConfig) -> Result<Self> {
        config.validate()?;
        let http = config.build_http_client()?;
        Ok(Self::with_http(config, http))
    }

    fn with_http(config: RepositoryConfig, http: reqwest::Client) -> Self {
        let mut headers = config.global_headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            config: Arc::new(config),
            headers: Arc::new(headers),
            http,
        }
    }

    /// access the repository configuration
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// headers sent with every request, including `content-type`
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// run a query and decode the payload under its root field
    pub async fn query<T: DeserializeOwned>(
        &self,
        source: impl Into<String>,
        call: Call,
    ) -> Result<T> {
        self.execute(Operation::query(source), call).await
    }

    /// run a mutation and decode the payload under its root field
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        source: impl Into<String>,
        call: Call,
    ) -> Result<T> {
        self.execute(Operation::mutation(source), call).await
    }

    /// run an operation and decode the payload under its root field
    pub async fn execute<T: DeserializeOwned>(&self, operation: Operation, call: Call) -> Result<T> {
        self.execute_with(operation, call, |url, headers, request| {
            self.post(url, headers, request)
        })
        .await
    }

    /// run an operation without decoding its payload
    pub async fn send(&self, operation: Operation, call: Call) -> Result<()> {
        self.send_with(operation, call, |url, headers, request| {
            self.post(url, headers, request)
        })
        .await
    }

    /// run a typed operation
    pub async fn execute_operation<O: TypedOperation>(&self, call: Call) -> Result<O::Response> {
        self.execute(O::operation(), call).await
    }

    async fn post(
        &self,
        url: Url,
        headers: HeaderMap,
        request: GraphQlRequest,
    ) -> Result<(StatusCode, String)> {
        let response = self
            .http
            .post(url)
            .headers(headers)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

impl Repository {
    /// global headers overlaid with the call's headers, in a fresh map
    pub(crate) fn merged_headers(&self, call_headers: &HeaderMap) -> HeaderMap {
        let mut headers = (*self.headers).clone();
        for (name, value) in call_headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    pub(crate) async fn execute_with<T: DeserializeOwned, F, Fut>(
        &self,
        operation: Operation,
        call: Call,
        send: F,
    ) -> Result<T>
    where
        F: FnOnce(Url, HeaderMap, GraphQlRequest) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let root = operation.root_field();
        let payload = self.request_with(operation, call, send).await?;
        payload.extract_root(&root)
    }

    pub(crate) async fn send_with<F, Fut>(
        &self,
        operation: Operation,
        call: Call,
        send: F,
    ) -> Result<()>
    where
        F: FnOnce(Url, HeaderMap, GraphQlRequest) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        self.request_with(operation, call, send).await.map(|_| ())
    }

    async fn request_with<F, Fut>(&self, operation: Operation, call: Call, send: F) -> Result<Payload>
    where
        F: FnOnce(Url, HeaderMap, GraphQlRequest) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let Call {
            variables,
            variables_error,
            headers: call_headers,
            timeout,
            cancellation,
        } = call;
        if let Some(err) = variables_error {
            return Err(Error::Variables(err));
        }

        let url = self.config.endpoint.clone();
        let headers = self.merged_headers(&call_headers);
        debug!(
            endpoint = %url,
            kind = %operation.kind(),
            root = %operation.root_field(),
            "executing graphql operation"
        );
        let request = GraphQlRequest::new(operation.into_source(), variables);

        let exchange = async move {
            let (status, text) = send(url, headers, request).await?;
            debug!(status = status.as_u16(), "graphql response received");
            Envelope::parse(text)
                .map_err(|err| match err {
                    Error::ParseResponse { message, body } if !status.is_success() => {
                        Error::ParseResponse {
                            message: format!("{message} (http status {status})"),
                            body,
                        }
                    }
                    other => other,
                })?
                .classify()
        };

        let exchange = async move {
            match timeout {
                Some(timeout) => tokio::time::timeout(timeout, exchange).await.map_err(|_| {
                    warn!(?timeout, "graphql operation deadline exceeded");
                    Error::DeadlineExceeded
                })?,
                None => exchange.await,
            }
        };

        match cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        warn!("graphql operation cancelled");
                        Err(Error::Cancelled)
                    }
                    outcome = exchange => outcome,
                }
            }
            None => exchange.await,
        }
    }
}
