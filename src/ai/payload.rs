use base64::{engine::general_purpose, Engine as _};

/// Upper bound on the bytes handed to the encoder per call.
///
/// A multiple of three, so no padding appears between chunks and the
/// concatenation equals a single-shot encoding.
pub const ENCODE_CHUNK_SIZE: usize = 0x8000 - (0x8000 % 3);

/// Base64-encode an audio payload chunk by chunk into one string.
pub fn encode_audio_base64(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(ENCODE_CHUNK_SIZE) {
        general_purpose::STANDARD.encode_string(chunk, &mut encoded);
    }
    encoded
}

/// Remove a markdown code fence the model sometimes wraps around its JSON.
///
/// Handles an opening "```" or "```json" (with optional newline) and a
/// closing "```" (with optional preceding newline). Text without a leading
/// fence is only trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let mut inner = &trimmed[3..];
    if let Some(rest) = inner.strip_prefix("json") {
        inner = rest;
    }
    inner = inner
        .strip_prefix("\r\n")
        .or_else(|| inner.strip_prefix('\n'))
        .unwrap_or(inner);

    if let Some(rest) = inner.strip_suffix("```") {
        inner = rest;
        inner = inner
            .strip_suffix("\r\n")
            .or_else(|| inner.strip_suffix('\n'))
            .unwrap_or(inner);
    }

    inner
}
