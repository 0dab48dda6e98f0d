//! Request processor.
//!
//! An [`ApiProcessor`] is configured fluently (URL, headers) and consumed by
//! one terminal call: [`get`](ApiProcessor::get),
//! [`post_json`](ApiProcessor::post_json) or
//! [`post_multipart`](ApiProcessor::post_multipart). Each call makes a single
//! attempt with no retry and no timeout, decodes the response with the chosen
//! [`ResponseShape`], and reports the outcome to the interceptor.

use std::fmt::Debug;
use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::envelope::{self, ResponseShape};
use crate::error::{ApiError, ApiResult};
use crate::interceptor::{ResponseInterceptor, TracingInterceptor};
use crate::request::{Method, MultipartForm, RequestBody, RequestDescription};

/// Creates processors sharing one HTTP client and interceptor.
#[derive(Clone)]
pub struct ApiProcessorFactory {
    http: Client,
    interceptor: Arc<dyn ResponseInterceptor>,
}

impl std::fmt::Debug for ApiProcessorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiProcessorFactory").finish_non_exhaustive()
    }
}

impl ApiProcessorFactory {
    /// Create a factory from an existing client and interceptor.
    #[must_use]
    pub fn new(http: Client, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        Self { http, interceptor }
    }

    /// A factory with a fresh client and the [`TracingInterceptor`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_defaults() -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("pod-studio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(http, Arc::new(TracingInterceptor)))
    }

    /// A fresh processor.
    #[must_use]
    pub fn create(&self) -> ApiProcessor {
        ApiProcessor {
            http: self.http.clone(),
            interceptor: Arc::clone(&self.interceptor),
            url: String::new(),
            headers: Vec::new(),
        }
    }
}

/// A single configurable request.
pub struct ApiProcessor {
    http: Client,
    interceptor: Arc<dyn ResponseInterceptor>,
    url: String,
    headers: Vec<(String, String)>,
}

impl ApiProcessor {
    /// Set the target URL.
    #[must_use]
    pub fn set_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set a header when `value` is present. A later value for the same name wins.
    #[must_use]
    pub fn put_header(mut self, name: &str, value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => value.clone_into(existing),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
        self
    }

    /// GET the URL.
    ///
    /// # Errors
    ///
    /// Returns the transport error, a service error for a non-success answer,
    /// or a decode error.
    pub async fn get<T>(self, shape: ResponseShape) -> ApiResult<T>
    where
        T: DeserializeOwned + Debug,
    {
        self.execute(Method::Get, RequestBody::Empty, shape).await
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), plus a decode error if `body` cannot be serialized.
    pub async fn post_json<T, B>(self, body: &B, shape: ResponseShape) -> ApiResult<T>
    where
        T: DeserializeOwned + Debug,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.execute(Method::Post, RequestBody::Json(body), shape)
            .await
    }

    /// POST a multipart form.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn post_multipart<T>(self, form: MultipartForm, shape: ResponseShape) -> ApiResult<T>
    where
        T: DeserializeOwned + Debug,
    {
        self.execute(Method::Post, RequestBody::Multipart(form), shape)
            .await
    }

    async fn execute<T>(self, method: Method, body: RequestBody, shape: ResponseShape) -> ApiResult<T>
    where
        T: DeserializeOwned + Debug,
    {
        let description = RequestDescription::new(method, &self.url, &self.headers, &body);
        let interceptor = Arc::clone(&self.interceptor);

        let result = self.send(method, body, shape).await;
        match &result {
            Ok(payload) => interceptor.on_success(&description, payload),
            Err(error) => interceptor.on_error(&description, error),
        }
        result
    }

    async fn send<T>(self, method: Method, body: RequestBody, shape: ResponseShape) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(&self.url).map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.url)))?;

        let mut request = self.http.request(method.into(), url);
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            request = request.header(header_name, header_value);
        }

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form.into_reqwest()?),
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        tracing::debug!(status, len = bytes.len(), "response received");

        envelope::decode(shape, status, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> ApiProcessor {
        ApiProcessorFactory::new(Client::new(), Arc::new(TracingInterceptor)).create()
    }

    #[test]
    fn test_put_header_skips_none_and_last_write_wins() {
        let processor = processor()
            .put_header("X-Token", None)
            .put_header("Accept", Some("text/plain"))
            .put_header("accept", Some("application/json"));
        assert_eq!(
            processor.headers,
            vec![("Accept".to_string(), "application/json".to_string())]
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let result: ApiResult<serde_json::Value> =
            processor().set_url("::nope").get(ResponseShape::Flat).await;
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
