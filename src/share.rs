//! Share codec: a whole `AnalysisResult` packed into one URL query value.
//!
//! `encode` deflates the JSON form and writes it in the URL-safe base64
//! alphabet without padding, so the token never needs percent-encoding.
//! `decode` is total: anything that is not a token it produced yields `None`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};
use std::io::{Read, Write};
use url::Url;

use crate::models::AnalysisResult;

/// Query parameter carrying the shared result.
pub const SHARE_PARAM: &str = "data";

/// Decompressed payloads above this size are rejected.
const MAX_DECODED_BYTES: u64 = 1024 * 1024;

pub fn encode(result: &AnalysisResult) -> String {
    // Serializing plain strings and numbers cannot fail, and writing into a
    // Vec-backed encoder cannot fail either.
    let json = serde_json::to_vec(result).unwrap_or_default();

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    let compressed = match encoder.write_all(&json).and_then(|_| encoder.finish()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to compress share payload: {}", e);
            return String::new();
        }
    };

    URL_SAFE_NO_PAD.encode(compressed)
}

pub fn decode(token: &str) -> Option<AnalysisResult> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let compressed = match URL_SAFE_NO_PAD.decode(token) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Share token is not base64: {}", e);
            return None;
        }
    };

    let mut json = Vec::new();
    if let Err(e) = DeflateDecoder::new(compressed.as_slice())
        .take(MAX_DECODED_BYTES + 1)
        .read_to_end(&mut json)
    {
        tracing::debug!("Share token failed to inflate: {}", e);
        return None;
    }
    if json.len() as u64 > MAX_DECODED_BYTES {
        tracing::debug!("Share token inflates past {} bytes", MAX_DECODED_BYTES);
        return None;
    }

    match serde_json::from_slice(&json) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::debug!("Share token is not an analysis result: {}", e);
            None
        }
    }
}

/// `base` with the encoded result in the `data` query parameter.
///
/// Other query parameters are kept; an existing `data` value is replaced.
pub fn share_url(base: &Url, result: &AnalysisResult) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != SHARE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(SHARE_PARAM, &encode(result));
    }

    url
}

/// Restore a shared result from `url` and strip the parameter from it.
///
/// When the parameter is absent or does not decode the URL is left as is
/// and `None` is returned; callers treat that as "nothing shared".
pub fn take_shared_result(url: &mut Url) -> Option<AnalysisResult> {
    let token = url
        .query_pairs()
        .find(|(k, _)| k == SHARE_PARAM)
        .map(|(_, v)| v.into_owned())?;

    let result = decode(&token)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != SHARE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    Some(result)
}
