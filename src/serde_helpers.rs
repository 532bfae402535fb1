use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::error::{Error, Kind};

/// Appends `query`, form-encoded, to `path`.
///
/// The returned string is both signed and requested, so the two never differ.
pub fn path_with_query<Q: Serialize + ?Sized>(path: &str, query: &Q) -> Result<String> {
    let query =
        serde_html_form::to_string(query).map_err(|e| Error::with_source(Kind::Internal, e))?;

    if query.is_empty() {
        Ok(path.to_owned())
    } else {
        Ok(format!("{path}?{query}"))
    }
}

/// Deserializes a response body into `T`.
///
/// With the `tracing` feature, decode failures report the JSON path that
/// failed and fields the typed model does not know about are logged at debug
/// level, which surfaces exchange-side schema additions early.
#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> Result<T> {
    let mut ignored = Vec::new();
    let mut track = |path: serde_ignored::Path<'_>| ignored.push(path.to_string());
    let deserializer = serde_ignored::Deserializer::new(value, &mut track);
    let result: T = serde_path_to_error::deserialize(deserializer)?;

    if !ignored.is_empty() {
        tracing::debug!(fields = ?ignored, "ignored unknown response fields");
    }

    Ok(result)
}

#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        price: String,
    }

    #[derive(Serialize)]
    struct Query<'a> {
        symbol: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    }

    #[test]
    fn query_values_are_form_encoded() {
        let path = path_with_query(
            "market/orderbook/level1",
            &Query {
                symbol: "BTC USDT&type=1week#x+y",
                limit: None,
            },
        )
        .unwrap();

        assert_eq!(
            path,
            "market/orderbook/level1?symbol=BTC+USDT%26type%3D1week%23x%2By"
        );
    }

    #[test]
    fn unset_query_fields_are_left_out() {
        let path = path_with_query(
            "market/candles",
            &Query {
                symbol: "BTC-USDT",
                limit: Some(10),
            },
        )
        .unwrap();

        assert_eq!(path, "market/candles?symbol=BTC-USDT&limit=10");
    }

    #[test]
    fn extra_fields_do_not_fail_decoding() {
        let probe: Probe =
            deserialize_with_warnings(json!({ "price": "1.5", "unexpected": true })).unwrap();

        assert_eq!(probe.price, "1.5");
    }

    #[test]
    fn missing_fields_fail_with_internal_kind() {
        let err = deserialize_with_warnings::<Probe>(json!({ "size": "1" })).unwrap_err();

        assert_eq!(err.kind(), crate::error::Kind::Internal);
    }
}
