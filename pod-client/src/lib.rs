//! # POD Client
//!
//! HTTP request pipeline for the print-on-demand studio.
//!
//! ```text
//! MeshService ──▶ UrlBuilder ──▶ ApiProcessorFactory::create()
//!                                   │ set_url / put_header
//!                                   ▼
//!                  get / post_json / post_multipart (one attempt)
//!                                   │
//!                 envelope::decode(Flat | Enveloped, status, body)
//!                                   │
//!            ResponseInterceptor::on_success | on_error (exactly once)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dto;
pub mod envelope;
pub mod error;
pub mod interceptor;
pub mod processor;
pub mod request;
pub mod service;
pub mod url_builder;

pub use dto::{HealthCheck, PrintResult};
pub use envelope::{PodResponse, ResponseShape, DEFAULT_FAILURE_MESSAGE};
pub use error::{ApiError, ApiResult};
pub use interceptor::{ResponseInterceptor, TracingInterceptor};
pub use processor::{ApiProcessor, ApiProcessorFactory};
pub use request::{FormPart, Method, MultipartForm, RequestBody, RequestDescription};
pub use service::{MeshService, PrintOptions};
pub use url_builder::UrlBuilder;
