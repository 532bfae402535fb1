use chrono::Utc;

use crate::Timestamp;

/// Where the `KC-API-TIMESTAMP` value comes from.
///
/// `Server` asks `/api/v1/timestamp` before every signed call, which keeps
/// signatures valid on hosts with a drifting clock. `Local` uses the local
/// clock and saves one round trip per call.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimePolicy {
    #[default]
    Server,
    Local,
}

impl TimePolicy {
    pub(crate) fn local_timestamp() -> Timestamp {
        Utc::now().timestamp_millis()
    }
}

/// API key version. Version 2 keys expect the passphrase header to be
/// HMAC-signed with the secret; version 1 keys take it verbatim.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeyVersion {
    V1,
    #[default]
    V2,
}

impl KeyVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyVersion::V1 => "1",
            KeyVersion::V2 => "2",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Policies {
    pub time: TimePolicy,
    pub key_version: KeyVersion,
}

impl Policies {
    #[must_use]
    pub const fn with_time(mut self, time: TimePolicy) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub const fn with_key_version(mut self, key_version: KeyVersion) -> Self {
        self.key_version = key_version;
        self
    }
}
