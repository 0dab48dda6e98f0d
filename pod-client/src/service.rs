//! Print service endpoints.

use crate::dto::{HealthCheck, PrintResult};
use crate::envelope::ResponseShape;
use crate::error::ApiResult;
use crate::processor::ApiProcessorFactory;
use crate::request::MultipartForm;
use crate::url_builder::UrlBuilder;

/// Form field carrying the composited artwork.
pub const STICKER_FIELD: &str = "sticker_image";

/// File name reported for the artwork.
pub const STICKER_FILE_NAME: &str = "image.jpg";

/// MIME type of the artwork.
pub const STICKER_MIME: &str = "image/jpeg";

/// Rendering options sent with a print request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Mock-up dataset.
    pub dataset_name: String,
    /// Model gender.
    pub gender: String,
    /// Keep white pixels of the artwork opaque.
    pub keep_white: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            dataset_name: "data1".to_string(),
            gender: "male".to_string(),
            keep_white: true,
        }
    }
}

/// Client for the print (mesh) service.
#[derive(Debug, Clone)]
pub struct MeshService {
    base_url: String,
    factory: ApiProcessorFactory,
    token: Option<String>,
}

impl MeshService {
    /// Create a client for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, factory: ApiProcessorFactory) -> Self {
        Self {
            base_url: base_url.into(),
            factory,
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request, if present.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// The service base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the service is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the envelope reports failure.
    #[tracing::instrument(skip(self), fields(base = %self.base_url))]
    pub async fn health_check(&self) -> ApiResult<HealthCheck> {
        let url = UrlBuilder::new(self.base_url.clone()).build();
        self.factory
            .create()
            .set_url(url)
            .put_header("Authorization", self.bearer().as_deref())
            .get(ResponseShape::Enveloped)
            .await
    }

    /// Submit artwork and get a rendered mock-up.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service answers non-200.
    #[tracing::instrument(skip(self, sticker_jpeg), fields(bytes = sticker_jpeg.len()))]
    pub async fn print(&self, sticker_jpeg: Vec<u8>, options: &PrintOptions) -> ApiResult<PrintResult> {
        let url = UrlBuilder::new(self.print_url()).build();
        let form = MultipartForm::new()
            .file(STICKER_FIELD, STICKER_FILE_NAME, STICKER_MIME, sticker_jpeg)
            .text("dataset_name", options.dataset_name.clone())
            .text("gender", options.gender.clone())
            .text("keep_white", options.keep_white.to_string());

        self.factory
            .create()
            .set_url(url)
            .put_header("Authorization", self.bearer().as_deref())
            .post_multipart(form, ResponseShape::Flat)
            .await
    }

    fn print_url(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}print", self.base_url)
        } else {
            format!("{}/print", self.base_url)
        }
    }

    fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}
