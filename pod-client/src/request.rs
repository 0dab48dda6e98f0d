//! Request bodies and their diagnostic description.

use std::fmt;

use reqwest::multipart::{Form, Part};

use crate::error::{ApiError, ApiResult};

/// HTTP method used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
}

impl Method {
    /// Method name as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
        }
    }
}

/// One part of a multipart form.
#[derive(Clone, PartialEq, Eq)]
pub enum FormPart {
    /// A plain string field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A binary file field.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        file_name: String,
        /// MIME type of the content.
        mime: String,
        /// File content.
        bytes: Vec<u8>,
    },
}

impl fmt::Debug for FormPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::File {
                name,
                file_name,
                mime,
                bytes,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("mime", mime)
                .field("bytes", &bytes.len())
                .finish(),
        }
    }
}

/// A multipart form: one or more file parts plus string parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a binary file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    /// The parts in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Convert into a reqwest form.
    ///
    /// # Errors
    ///
    /// Returns an error if a MIME type does not parse.
    pub fn into_reqwest(self) -> ApiResult<Form> {
        self.parts.into_iter().try_fold(Form::new(), |form, part| {
            Ok(match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(ApiError::Transport)?;
                    form.part(name, part)
                }
            })
        })
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON body.
    Json(serde_json::Value),
    /// Multipart form body.
    Multipart(MultipartForm),
}

/// Curl-equivalent rendering of a request, for logs.
///
/// `Authorization` header values are redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescription {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<String>,
}

impl RequestDescription {
    /// Describe a request.
    #[must_use]
    pub fn new(method: Method, url: &str, headers: &[(String, String)], body: &RequestBody) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                let value = if name.eq_ignore_ascii_case("authorization") {
                    "<redacted>".to_string()
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect();

        let body = match body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Json(value) => vec![format!("-d '{value}'")],
            RequestBody::Multipart(form) => form
                .parts()
                .iter()
                .map(|part| match part {
                    FormPart::Text { name, value } => format!("-F \"{name}={value}\""),
                    FormPart::File {
                        name,
                        file_name,
                        mime,
                        ..
                    } => format!("-F \"{name}=@{file_name};type={mime}\""),
                })
                .collect(),
        };

        Self {
            method,
            url: url.to_string(),
            headers,
            body,
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RequestDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curl -v -X {}", self.method.as_str())?;
        for (name, value) in &self.headers {
            write!(f, " \\\n\t-H \"{name}: {value}\"")?;
        }
        for arg in &self.body {
            write!(f, " \\\n\t{arg}")?;
        }
        write!(f, " \\\n\t\"{}\"", self.url)
    }
}
