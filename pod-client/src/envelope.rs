//! Response decoding strategies.
//!
//! Endpoints answer either with the typed payload directly ([`ResponseShape::Flat`])
//! or wrapped as `{ data, code, message }` ([`ResponseShape::Enveloped`]). Both
//! map every non-success answer to the same [`AppError::service`] error.

use pod_core::{location, AppError, Require};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// Status or envelope code signalling success.
pub const SUCCESS_CODE: i32 = 200;

/// Message used when the service gives no reason for a failure.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Something went wrong";

/// How an endpoint wraps its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{ data, code, message }`; `code == 200` means success.
    Enveloped,
    /// The payload itself; HTTP 200 means success.
    Flat,
}

/// Envelope used by [`ResponseShape::Enveloped`] endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodResponse<T> {
    /// Payload, absent on failure.
    pub data: Option<T>,
    /// Application status code.
    pub code: Option<i32>,
    /// Human-readable status message.
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
}

/// Decode a response body according to `shape`.
///
/// # Errors
///
/// Returns a service error for non-success status or envelope codes, a nil
/// error for a successful envelope without data, and a decode error if the
/// body does not match `T`.
pub fn decode<T: DeserializeOwned>(shape: ResponseShape, status: u16, body: &[u8]) -> ApiResult<T> {
    let status = i32::from(status);
    if status != SUCCESS_CODE {
        return Err(failure(status, body).into());
    }

    match shape {
        ResponseShape::Flat => Ok(serde_json::from_slice(body)?),
        ResponseShape::Enveloped => {
            let envelope: PodResponse<T> = serde_json::from_slice(body)?;
            let code = envelope.code.unwrap_or(status);
            if code != SUCCESS_CODE {
                let message = envelope.message.as_deref().unwrap_or(DEFAULT_FAILURE_MESSAGE);
                return Err(AppError::service(code, message, location!()).into());
            }
            Ok(envelope.data.require(location!())?)
        }
    }
}

/// Service error for a non-200 answer, using the body's `message` if it has one.
fn failure(status: i32, body: &[u8]) -> AppError {
    let message = serde_json::from_slice::<FailureBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty());
    AppError::service(
        status,
        message.as_deref().unwrap_or(DEFAULT_FAILURE_MESSAGE),
        location!(),
    )
}
