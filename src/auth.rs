//! Request signing for the exchange's private endpoints.
//!
//! Every authenticated call carries five headers: the API key, the millisecond
//! timestamp, an HMAC-SHA256 signature over
//! `timestamp + METHOD + /api/{version}/{path} + body`, the (signed) passphrase
//! and the key version.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac as _};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::Error;
use crate::rest::KeyVersion;
use crate::types::ApiVersion;
use crate::{Result, Timestamp};

// Header names are lowercase so they can be used as static `HeaderName`s.
pub const KEY: &str = "kc-api-key";
pub const SIGN: &str = "kc-api-sign";
pub const TIMESTAMP: &str = "kc-api-timestamp";
pub const PASSPHRASE: &str = "kc-api-passphrase";
pub const KEY_VERSION: &str = "kc-api-key-version";

type HmacSha256 = Hmac<Sha256>;

/// API key triple issued by the exchange.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    pub(crate) key: String,
    pub(crate) secret: SecretString,
    pub(crate) passphrase: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(key: impl Into<String>, secret: SecretString, passphrase: SecretString) -> Self {
        Self {
            key: key.into(),
            secret,
            passphrase,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Builds the exact string the exchange expects to be signed.
#[must_use]
pub fn prehash(
    method: &Method,
    timestamp: Timestamp,
    version: ApiVersion,
    path: &str,
    body: Option<&str>,
) -> String {
    format!(
        "{timestamp}{method}/api/{version}/{path}{}",
        body.unwrap_or_default()
    )
}

/// Base64 HMAC-SHA256 of the request, keyed by the API secret.
pub fn sign(
    secret: &SecretString,
    method: &Method,
    timestamp: Timestamp,
    version: ApiVersion,
    path: &str,
    body: Option<&str>,
) -> Result<String> {
    hmac(secret, &prehash(method, timestamp, version, path, body))
}

/// Base64 HMAC-SHA256 of the passphrase, keyed by the API secret.
pub fn sign_passphrase(credentials: &Credentials) -> Result<String> {
    hmac(&credentials.secret, credentials.passphrase.expose_secret())
}

/// Assembles the authentication headers for one call.
///
/// `Content-Type` is only set when `body` is present.
pub fn create_headers(
    credentials: &Credentials,
    key_version: KeyVersion,
    method: &Method,
    timestamp: Timestamp,
    version: ApiVersion,
    path: &str,
    body: Option<&str>,
) -> Result<HeaderMap> {
    let signature = sign(&credentials.secret, method, timestamp, version, path, body)?;
    let passphrase = match key_version {
        KeyVersion::V1 => credentials.passphrase.expose_secret().to_owned(),
        KeyVersion::V2 => sign_passphrase(credentials)?,
    };

    let mut map = HeaderMap::new();

    map.insert(KEY, HeaderValue::from_str(&credentials.key)?);
    map.insert(SIGN, HeaderValue::from_str(&signature)?);
    map.insert(TIMESTAMP, HeaderValue::from_str(&timestamp.to_string())?);
    map.insert(PASSPHRASE, HeaderValue::from_str(&passphrase)?);
    map.insert(KEY_VERSION, HeaderValue::from_static(key_version.as_str()));
    if body.is_some() {
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(map)
}

fn hmac(secret: &SecretString, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| Error::validation(format!("invalid API secret: {e}")))?;
    mac.update(message.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: Timestamp = 1_700_000_000_000;

    fn credentials() -> Credentials {
        Credentials::new(
            "key-123",
            SecretString::from("secret"),
            SecretString::from("passphrase"),
        )
    }

    #[test]
    fn prehash_concatenates_in_exchange_order() {
        assert_eq!(
            prehash(&Method::GET, TS, ApiVersion::V1, "accounts", None),
            "1700000000000GET/api/v1/accounts"
        );
        assert_eq!(
            prehash(
                &Method::POST,
                TS,
                ApiVersion::V3,
                "oco/order",
                Some(r#"{"side":"buy"}"#)
            ),
            r#"1700000000000POST/api/v3/oco/order{"side":"buy"}"#
        );
    }

    #[test]
    fn sign_matches_known_vectors() {
        let secret = SecretString::from("secret");

        assert_eq!(
            sign(&secret, &Method::GET, TS, ApiVersion::V1, "accounts", None).unwrap(),
            "ka2jGwVPj+HJ5t7L4fEM4HttekAXENIQpmo8ulfZmV8="
        );
        assert_eq!(
            sign(
                &secret,
                &Method::POST,
                TS,
                ApiVersion::V1,
                "orders",
                Some(r#"{"side":"buy"}"#)
            )
            .unwrap(),
            "Crm5KCkTa/SQMxz2yhpL0kgDwL7Uoba8j8501PsBLPk="
        );
        assert_eq!(
            sign(
                &secret,
                &Method::GET,
                TS,
                ApiVersion::V3,
                "oco/order/details/abc",
                None
            )
            .unwrap(),
            "2l79eAbgC7YGQWQ+rBY1Wn+trgeQ0dR3ajHPAidG8xE="
        );
    }

    #[test]
    fn sign_is_deterministic_and_input_sensitive() {
        let secret = SecretString::from("secret");
        let base = sign(&secret, &Method::GET, TS, ApiVersion::V1, "accounts", None).unwrap();

        assert_eq!(
            base,
            sign(&secret, &Method::GET, TS, ApiVersion::V1, "accounts", None).unwrap()
        );
        assert_eq!(
            sign(&secret, &Method::GET, TS + 1, ApiVersion::V1, "accounts", None).unwrap(),
            "4vGo7mVf7919mEd8h9FXb7QBLYRCkEWj9+YQ91K0QbI="
        );
        assert_eq!(
            sign(
                &SecretString::from("other"),
                &Method::GET,
                TS,
                ApiVersion::V1,
                "accounts",
                None
            )
            .unwrap(),
            "8NI31jizvlC/7DwVSQxdkWaZmHmcvUHPdUBQKXoBziQ="
        );
        assert_ne!(
            base,
            sign(&secret, &Method::DELETE, TS, ApiVersion::V1, "accounts", None).unwrap()
        );
        assert_ne!(
            base,
            sign(&secret, &Method::GET, TS, ApiVersion::V2, "accounts", None).unwrap()
        );
        assert_ne!(
            base,
            sign(&secret, &Method::GET, TS, ApiVersion::V1, "accounts", Some("{}")).unwrap()
        );
    }

    #[test]
    fn passphrase_signature_is_stable() {
        let credentials = credentials();

        assert_eq!(
            sign_passphrase(&credentials).unwrap(),
            "sWd5rQWAxDzYJTY6K2sov6seA0l3uNP70anWxITg8IA="
        );
        assert_eq!(
            sign_passphrase(&credentials).unwrap(),
            sign_passphrase(&credentials).unwrap()
        );
    }

    #[test]
    fn headers_without_body_skip_content_type() {
        let headers = create_headers(
            &credentials(),
            KeyVersion::V2,
            &Method::GET,
            TS,
            ApiVersion::V1,
            "accounts",
            None,
        )
        .unwrap();

        assert_eq!(headers.len(), 5);
        assert_eq!(headers[KEY], "key-123");
        assert_eq!(headers[TIMESTAMP], "1700000000000");
        assert_eq!(headers[SIGN], "ka2jGwVPj+HJ5t7L4fEM4HttekAXENIQpmo8ulfZmV8=");
        assert_eq!(
            headers[PASSPHRASE],
            "sWd5rQWAxDzYJTY6K2sov6seA0l3uNP70anWxITg8IA="
        );
        assert_eq!(headers[KEY_VERSION], "2");
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn headers_with_body_set_content_type() {
        let headers = create_headers(
            &credentials(),
            KeyVersion::V2,
            &Method::POST,
            TS,
            ApiVersion::V1,
            "orders",
            Some(r#"{"side":"buy"}"#),
        )
        .unwrap();

        assert_eq!(headers.len(), 6);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[SIGN], "Crm5KCkTa/SQMxz2yhpL0kgDwL7Uoba8j8501PsBLPk=");
    }

    #[test]
    fn key_version_one_sends_plain_passphrase() {
        let headers = create_headers(
            &credentials(),
            KeyVersion::V1,
            &Method::GET,
            TS,
            ApiVersion::V1,
            "accounts",
            None,
        )
        .unwrap();

        assert_eq!(headers[PASSPHRASE], "passphrase");
        assert_eq!(headers[KEY_VERSION], "1");
    }
}
