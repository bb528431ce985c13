//! reqwest-backed implementation of [`NdsApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nds_api_models::{NdsCreateRequest, NdsPayload, NdsRecord, RecordId};
use nds_config::{ClientSettings, TokenStore};
use nds_core::{ApiError, ApiResult, NdsApi};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use url::Url;

use crate::response::{classify_failure, decode_json, decode_token};

/// Header carrying the per-invocation trace id.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Build the shared HTTP client with a timeout and a default `x-request-id`.
///
/// # Errors
///
/// Returns [`ApiError::Transport`] when the trace id is not a valid header value
/// or the client cannot be constructed.
pub fn build_http_client(timeout: Duration, trace_id: &str) -> ApiResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id).map_err(|_| ApiError::Transport {
        operation: "build_client",
        detail: "trace identifier contains invalid characters".to_string(),
    })?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(timeout)
        .default_headers(default_headers)
        .build()
        .map_err(|err| ApiError::Transport {
            operation: "build_client",
            detail: format!("failed to build HTTP client: {err}"),
        })
}

/// HTTP client for the reference-table endpoints.
///
/// The token is read from the injected store on every request, so a token set
/// or cleared mid-session applies to the next call.
#[derive(Clone)]
pub struct HttpNdsApi {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpNdsApi {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client, base_url: Url, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            base_url,
            tokens,
        }
    }

    /// Build a client from resolved settings.
    ///
    /// # Errors
    ///
    /// See [`build_http_client`].
    pub fn from_settings(
        settings: &ClientSettings,
        trace_id: &str,
        tokens: Arc<dyn TokenStore>,
    ) -> ApiResult<Self> {
        let client = build_http_client(settings.timeout, trace_id)?;
        Ok(Self::new(client, settings.base_url.clone(), tokens))
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, operation: &'static str, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                operation,
                detail: format!("'{}' cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, operation: &'static str, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|err| ApiError::Transport {
            operation,
            detail: err.to_string(),
        })?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_failure(operation, response).await)
        }
    }
}

#[async_trait]
impl NdsApi for HttpNdsApi {
    async fn fetch_token(&self) -> ApiResult<String> {
        const OPERATION: &str = "fetch_token";
        let url = self.endpoint(OPERATION, &["token"])?;
        let response = self
            .execute(OPERATION, self.request(Method::GET, url))
            .await?;
        let bytes = response.bytes().await.map_err(|err| ApiError::Transport {
            operation: OPERATION,
            detail: err.to_string(),
        })?;
        decode_token(OPERATION, &bytes)
    }

    async fn list_records(&self) -> ApiResult<Vec<NdsRecord>> {
        const OPERATION: &str = "list_records";
        let url = self.endpoint(OPERATION, &["api", "nds"])?;
        let response = self
            .execute(OPERATION, self.request(Method::GET, url))
            .await?;
        decode_json(OPERATION, response).await
    }

    async fn get_record(&self, id: &RecordId) -> ApiResult<NdsRecord> {
        const OPERATION: &str = "get_record";
        let url = self.endpoint(OPERATION, &["api", "nds", id.as_str()])?;
        let response = self
            .execute(OPERATION, self.request(Method::GET, url))
            .await?;
        decode_json(OPERATION, response).await
    }

    async fn create_record(&self, request: &NdsCreateRequest) -> ApiResult<NdsRecord> {
        const OPERATION: &str = "create_record";
        let url = self.endpoint(OPERATION, &["api", "nds"])?;
        let response = self
            .execute(OPERATION, self.request(Method::POST, url).json(request))
            .await?;
        decode_json(OPERATION, response).await
    }

    async fn update_record(&self, id: &RecordId, payload: &NdsPayload) -> ApiResult<()> {
        const OPERATION: &str = "update_record";
        let url = self.endpoint(OPERATION, &["api", "nds", id.as_str()])?;
        self.execute(OPERATION, self.request(Method::PUT, url).json(payload))
            .await?;
        Ok(())
    }

    async fn delete_record(&self, id: &RecordId) -> ApiResult<()> {
        const OPERATION: &str = "delete_record";
        let url = self.endpoint(OPERATION, &["api", "nds", id.as_str()])?;
        self.execute(OPERATION, self.request(Method::DELETE, url))
            .await?;
        Ok(())
    }
}
