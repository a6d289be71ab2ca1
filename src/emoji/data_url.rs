//! `data:` URL encoding, the format images are stored in.

use base64::{Engine, engine::general_purpose::STANDARD};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn encode(content_type: Option<&str>, bytes: &[u8]) -> String {
    let mime = content_type.filter(|m| !m.is_empty()).unwrap_or(FALLBACK_MIME);
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode a base64 `data:` URL into its MIME type and bytes.
/// Returns `None` for anything else.
pub fn decode(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };
    Some((mime.to_string(), bytes))
}

/// Size of the decoded payload without decoding it.
pub fn payload_len(url: &str) -> Option<usize> {
    let (_, payload) = url.strip_prefix("data:")?.split_once(',')?;
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    Some(((payload.len() / 4) * 3).saturating_sub(padding.min(2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_content_type() {
        assert_eq!(encode(Some("image/png"), b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn encode_without_content_type_is_octet_stream() {
        assert!(encode(None, b"x").starts_with("data:application/octet-stream;base64,"));
        assert!(encode(Some(""), b"x").starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn decode_reverses_encode() {
        let url = encode(Some("image/jpeg"), &[1, 2, 3, 250]);
        assert_eq!(
            decode(&url),
            Some(("image/jpeg".to_string(), vec![1, 2, 3, 250]))
        );
    }

    #[test]
    fn decode_rejects_non_data_urls() {
        assert!(decode("https://example.com/a.png").is_none());
        assert!(decode("data:image/png,rawtext").is_none());
        assert!(decode("data:image/png;base64,@@@").is_none());
    }

    #[test]
    fn payload_len_matches_decoded() {
        for n in 0..8 {
            let bytes = vec![7u8; n];
            let url = encode(Some("image/png"), &bytes);
            assert_eq!(payload_len(&url), Some(n), "n = {n}");
        }
    }
}
