//! Request signing for the read endpoint.
//!
//! Every read request carries two signatures: `sg`, a SHA-256 over the
//! timestamp, nonce and session key, and `s`, the service's rolling XOR hash
//! over the canonical encoding of the other fields.

use sha2::{Digest, Sha256};

/// Seed for both accumulators of [`hash_encoded`].
const HASH_SEED: u64 = 0x15051505;

const HASH_MASK: u64 = 0x7fffffff;

/// Canonical encoding of a parameter set.
///
/// Keys are sorted lexicographically, values are percent-encoded with only the
/// unreserved characters (`A-Z a-z 0-9 - _ . ~`) left as-is, and pairs are
/// joined as `key=value` with `&`. The output depends only on the set of
/// pairs, never on the order they are supplied in.
pub fn encode<K, V, I>(params: I) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut pairs: Vec<(K, V)> = params.into_iter().collect();
    pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), urlencoding::encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex SHA-256 of `{ts}{rn}{key}` with no separators.
pub fn derive_signature(ts: u64, rn: u32, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}{}{}", ts, rn, key).as_bytes());
    hex::encode(hasher.finalize())
}

/// The service's rolling XOR hash over a canonical string.
///
/// Two accumulators start at `0x15051505` and walk the string from its end,
/// two characters per step:
///
/// ```text
/// a = 0x7fffffff & (a ^ (code(s[i])   << ((len - i) % 30)))
/// b = 0x7fffffff & (b ^ (code(s[i-1]) << (i % 30)))
/// ```
///
/// The result is `a + b` as lowercase hex without zero-padding.
pub fn hash_encoded(canonical: &str) -> String {
    let chars: Vec<char> = canonical.chars().collect();
    let len = chars.len();

    let mut a = HASH_SEED;
    let mut b = HASH_SEED;

    let mut i = len.saturating_sub(1);
    while i > 0 {
        let hi = chars[i] as u64;
        let lo = chars[i - 1] as u64;
        a = HASH_MASK & (a ^ (hi << ((len - i) % 30)));
        b = HASH_MASK & (b ^ (lo << (i % 30)));
        if i < 2 {
            break;
        }
        i -= 2;
    }

    format!("{:x}", a + b)
}
