//! Legacy unframed payload extraction.
//!
//! Images written before the framed protocol carry a bare base64 run,
//! terminated either by a null byte or by the first byte outside the base64
//! alphabet. There is no length field and no checksum, so this path is
//! strictly best-effort and exists only for interoperability with
//! pre-protocol images.

/// True for bytes of the standard base64 alphabet (`A-Z a-z 0-9 + / =`).
pub fn is_base64_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/' | b'=')
}

/// Scans for a legacy payload starting at `start`.
///
/// A null byte found past `start` bounds the payload; otherwise the first
/// byte outside the base64 alphabet does. A non-base64 first byte yields an
/// empty payload. Returns the payload slice and the cursor where scanning
/// stopped (one past the null terminator when a null bounded the run).
pub fn extract_legacy_payload(data: &[u8], start: usize) -> (&[u8], usize) {
    if start >= data.len() {
        return (&[], data.len());
    }

    let tail = &data[start..];
    if let Some(null_offset) = tail.iter().position(|&b| b == 0) {
        if null_offset > 0 {
            return (&tail[..null_offset], start + null_offset + 1);
        }
    }

    let end = tail
        .iter()
        .position(|&b| !is_base64_byte(b))
        .unwrap_or(tail.len());
    (&tail[..end], start + end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_terminated_run() {
        let data = b"SGVsbG8=\x00leftover noise";
        let (payload, cursor) = extract_legacy_payload(data, 0);
        assert_eq!(payload, b"SGVsbG8=");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn test_charset_terminated_run() {
        let data = b"QUJD\xffgarbage";
        let (payload, cursor) = extract_legacy_payload(data, 0);
        assert_eq!(payload, b"QUJD");
        assert_eq!(cursor, 4);
    }

    #[test]
    fn test_non_base64_first_byte_is_empty() {
        let data = b"\xffQUJD";
        let (payload, cursor) = extract_legacy_payload(data, 0);
        assert!(payload.is_empty());
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_leading_null_is_empty() {
        // A null at the very start is not "found past start": the charset
        // scan takes over and stops immediately.
        let data = b"\x00QUJD";
        let (payload, _) = extract_legacy_payload(data, 0);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_scan_from_offset() {
        let data = b"xx--QUJERQ==\x00tail";
        let (payload, cursor) = extract_legacy_payload(data, 4);
        assert_eq!(payload, b"QUJERQ==");
        assert_eq!(cursor, 13);
    }

    #[test]
    fn test_run_to_end_of_data() {
        let data = b"QUJD";
        let (payload, cursor) = extract_legacy_payload(data, 0);
        assert_eq!(payload, b"QUJD");
        assert_eq!(cursor, 4);
    }

    #[test]
    fn test_start_past_end() {
        let (payload, cursor) = extract_legacy_payload(b"QQ", 10);
        assert!(payload.is_empty());
        assert_eq!(cursor, 2);
    }
}
