use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::sign;

/// Body sent to the renewal endpoint.
pub const RENEWAL_REQUEST_PATH: &str = "%2Fweb%2Fbook%2Fread";

/// Fields fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseParams {
    /// Run start, epoch seconds.
    pub ct: u64,
    /// Nonce in `[0, 1000)`.
    pub rn: u32,
    pub key: String,
}

impl BaseParams {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            ct: epoch_millis() / 1000,
            rn: fastrand::u32(0..1000),
            key: key.into(),
        }
    }
}

/// Signed body of a read request, built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestParams {
    pub ct: u64,
    pub rn: u32,
    pub key: String,
    /// Attempt time, epoch milliseconds.
    pub ts: u64,
    pub sg: String,
    pub s: String,
}

impl RequestParams {
    /// Sign `base` for an attempt made at `ts` (epoch milliseconds).
    ///
    /// `s` covers every other field, so `ts`, `sg` and `s` always agree.
    pub fn sign(base: &BaseParams, ts: u64) -> Self {
        let sg = sign::derive_signature(ts, base.rn, &base.key);
        let canonical = sign::encode([
            ("ct", base.ct.to_string()),
            ("rn", base.rn.to_string()),
            ("key", base.key.clone()),
            ("ts", ts.to_string()),
            ("sg", sg.clone()),
        ]);

        Self {
            ct: base.ct,
            rn: base.rn,
            key: base.key.clone(),
            ts,
            sg,
            s: sign::hash_encoded(&canonical),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenewalRequest {
    pub rq: &'static str,
}

impl Default for RenewalRequest {
    fn default() -> Self {
        Self {
            rq: RENEWAL_REQUEST_PATH,
        }
    }
}

/// Response from the read endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResponse {
    /// Anything other than a literal `true` is a soft failure.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub succ: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

/// Result of one read attempt that reached the server.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub succ: bool,
    pub raw: serde_json::Value,
}

/// Counters for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub attempted: u32,
    pub succeeded: u32,
    pub soft_failures: u32,
    pub hard_failures: u32,
    pub renewals: u32,
    pub pauses: u32,
}

pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseParams {
        BaseParams {
            ct: 1_700_000_000,
            rn: 42,
            key: "abc".to_string(),
        }
    }

    #[test]
    fn test_base_params_ranges() {
        for _ in 0..100 {
            let base = BaseParams::new("k");
            assert!(base.rn < 1000);
            assert!(base.ct > 1_600_000_000);
        }
    }

    #[test]
    fn test_sign_keeps_base_fields() {
        let params = RequestParams::sign(&base(), 1_700_000_000_123);
        assert_eq!(params.ct, 1_700_000_000);
        assert_eq!(params.rn, 42);
        assert_eq!(params.key, "abc");
        assert_eq!(params.ts, 1_700_000_000_123);
    }

    #[test]
    fn test_sign_is_internally_consistent() {
        let params = RequestParams::sign(&base(), 1_700_000_000_123);
        assert_eq!(params.sg, sign::derive_signature(1_700_000_000_123, 42, "abc"));

        let canonical = format!(
            "ct=1700000000&key=abc&rn=42&sg={}&ts=1700000000123",
            params.sg
        );
        assert_eq!(params.s, sign::hash_encoded(&canonical));
    }

    #[test]
    fn test_signatures_follow_timestamp() {
        let first = RequestParams::sign(&base(), 1_700_000_000_123);
        let second = RequestParams::sign(&base(), 1_700_000_030_456);
        assert_ne!(first.sg, second.sg);
        assert_ne!(first.s, second.s);
        assert_eq!(first, RequestParams::sign(&base(), 1_700_000_000_123));
    }

    #[test]
    fn test_request_params_json_shape() {
        let params = RequestParams::sign(&base(), 1);
        let json = serde_json::to_value(&params).unwrap();
        for field in ["ct", "rn", "key", "ts", "sg", "s"] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["ts"], 1);
    }

    #[test]
    fn test_renewal_request_body() {
        let json = serde_json::to_value(RenewalRequest::default()).unwrap();
        assert_eq!(json, serde_json::json!({"rq": "%2Fweb%2Fbook%2Fread"}));
    }

    #[test]
    fn test_read_response_succ() {
        let ok: ReadResponse = serde_json::from_str(r#"{"succ": true, "synckey": 7}"#).unwrap();
        assert!(ok.succ);
        assert_eq!(ok.extra.get("synckey"), Some(&serde_json::json!(7)));

        let missing: ReadResponse = serde_json::from_str(r#"{"errcode": -2012}"#).unwrap();
        assert!(!missing.succ);

        let odd: ReadResponse = serde_json::from_str(r#"{"succ": 1}"#).unwrap();
        assert!(!odd.succ);
    }
}
