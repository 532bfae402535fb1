#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod error;
pub mod rest;
pub mod serde_helpers;
pub mod trading;
pub mod types;

use reqwest::StatusCode;
use reqwest::blocking::{Client as ReqwestClient, Request};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::types::ApiResponse;

pub use crate::rest::{Config, RestClient};
pub use crate::trading::Kucoin;

pub type Result<T> = std::result::Result<T, Error>;

/// Unix time in milliseconds, as used by `KC-API-TIMESTAMP`.
pub type Timestamp = i64;

/// Sends `request` and unwraps the exchange's `{ code, data, msg }` envelope.
///
/// A request that never gets a response fails with [`error::Kind::Transport`];
/// any answer other than exactly 200 with [`error::Kind::Status`], carrying
/// the envelope's `msg` when there is one; a 200 answer with a business error
/// code with [`error::Kind::Exchange`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, headers),
        fields(method, path, status_code)
    )
)]
pub(crate) fn request<Response: DeserializeOwned>(
    client: &ReqwestClient,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    #[cfg(feature = "tracing")]
    {
        let span = tracing::Span::current();
        span.record("method", method.as_str());
        span.record("path", path.as_str());
    }

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request)?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if status_code != StatusCode::OK {
        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.msg)
            .unwrap_or(body);

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<serde_json::Value>()?;
    let envelope: ApiResponse<Response> = serde_helpers::deserialize_with_warnings(json_value)?;

    #[cfg(feature = "tracing")]
    {
        if envelope.code != types::SUCCESS_CODE {
            tracing::warn!(
                method = %method,
                path = %path,
                code = %envelope.code,
                message = envelope.msg.as_deref().unwrap_or_default(),
                "exchange returned business error"
            );
        }
    }

    envelope.into_data()
}
