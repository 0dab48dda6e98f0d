//! Result screen model.
//!
//! Shows a checkerboard placeholder while the rendered mock-up downloads,
//! then the decoded image, or the reason it could not be shown.

use async_trait::async_trait;
use pod_client::ApiError;
use pod_core::{location, AppError};
use pod_renderer::{create_placeholder, decode, to_rgba_image, RasterImage};

use crate::error::StudioResult;

/// Edge length of the loading placeholder, in pixels.
pub const PLACEHOLDER_SIZE: u32 = 128;

/// Downloads result images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw bytes at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be downloaded.
    async fn fetch(&self, url: &str) -> StudioResult<Vec<u8>>;
}

/// [`ImageFetcher`] over plain HTTP GET.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher using `http`.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> StudioResult<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(ApiError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::service(
                i32::from(status.as_u16()),
                "Failed to load result image",
                location!(),
            )
            .into());
        }
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }
}

/// What the result screen currently shows.
#[derive(Debug, Clone)]
pub enum ResultState {
    /// Download in progress; shows the placeholder.
    Loading(RasterImage),
    /// The decoded mock-up.
    Loaded(RasterImage),
    /// The image could not be shown.
    Failed(String),
}

/// The screen displaying a rendered mock-up.
#[derive(Debug, Clone)]
pub struct ResultScreen {
    image_url: String,
    state: ResultState,
}

impl ResultScreen {
    /// A screen for `image_url`, initially loading.
    #[must_use]
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            state: ResultState::Loading(create_placeholder(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)),
        }
    }

    /// The mock-up URL.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ResultState {
        &self.state
    }

    /// The image on screen: placeholder while loading, mock-up once loaded.
    #[must_use]
    pub fn displayed(&self) -> Option<&RasterImage> {
        match &self.state {
            ResultState::Loading(image) | ResultState::Loaded(image) => Some(image),
            ResultState::Failed(_) => None,
        }
    }

    /// Download and decode the mock-up.
    pub async fn load(&mut self, fetcher: &dyn ImageFetcher) {
        let result = match fetcher.fetch(&self.image_url).await {
            Ok(bytes) => decode_raster(&bytes),
            Err(e) => Err(e),
        };
        self.finish(result);
    }

    /// Settle the screen with a download outcome.
    pub fn finish(&mut self, result: StudioResult<RasterImage>) {
        self.state = match result {
            Ok(image) => {
                tracing::debug!(
                    url = %self.image_url,
                    width = image.width(),
                    height = image.height(),
                    "result image loaded"
                );
                ResultState::Loaded(image)
            }
            Err(e) => {
                e.trace_warn("result image failed to load");
                ResultState::Failed(e.user_message())
            }
        };
    }
}

fn decode_raster(bytes: &[u8]) -> StudioResult<RasterImage> {
    Ok(to_rgba_image(&decode(bytes)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;
    use pod_renderer::{create_solid_color, encode_png};

    struct StaticFetcher(Option<Vec<u8>>);

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> StudioResult<Vec<u8>> {
            self.0
                .clone()
                .ok_or_else(|| StudioError::Script("offline".to_string()))
        }
    }

    #[test]
    fn test_new_screen_shows_placeholder() {
        let screen = ResultScreen::new("https://x/y.jpg");
        assert!(matches!(screen.state(), ResultState::Loading(_)));
        let placeholder = screen.displayed().expect("placeholder");
        assert_eq!(placeholder.dimensions(), (PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
    }

    #[tokio::test]
    async fn test_load_decodes_image() {
        let png = encode_png(&create_solid_color(4, 3, [1, 2, 3, 255])).expect("png");
        let mut screen = ResultScreen::new("https://x/y.png");
        screen.load(&StaticFetcher(Some(png))).await;
        match screen.state() {
            ResultState::Loaded(image) => assert_eq!(image.dimensions(), (4, 3)),
            other => panic!("expected loaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_failed() {
        let mut screen = ResultScreen::new("https://x/y.png");
        screen.load(&StaticFetcher(None)).await;
        assert!(matches!(screen.state(), ResultState::Failed(_)));
        assert!(screen.displayed().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_bytes_set_failed() {
        let mut screen = ResultScreen::new("https://x/y.png");
        screen.load(&StaticFetcher(Some(b"not an image".to_vec()))).await;
        assert!(matches!(screen.state(), ResultState::Failed(_)));
    }
}
