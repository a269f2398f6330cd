// Trace and span identifier rendering
//
// Doris stores identifiers as fixed-width lowercase hex strings.

/// Size of OpenTelemetry TraceId in bytes (128 bits)
pub const TRACE_ID_SIZE: usize = 16;

/// Size of OpenTelemetry SpanId in bytes (64 bits)
pub const SPAN_ID_SIZE: usize = 8;

/// Render a trace id as 32 lowercase hex characters.
pub fn trace_id_hex(bytes: &[u8]) -> String {
    fixed_width_hex::<TRACE_ID_SIZE>(bytes)
}

/// Render a span id as 16 lowercase hex characters.
pub fn span_id_hex(bytes: &[u8]) -> String {
    fixed_width_hex::<SPAN_ID_SIZE>(bytes)
}

// Absent ids render as all zeros; ids of the wrong length are zero-padded or
// truncated so the column width never varies.
fn fixed_width_hex<const N: usize>(bytes: &[u8]) -> String {
    if bytes.len() == N {
        return hex::encode(bytes);
    }
    let mut fixed = [0u8; N];
    let len = bytes.len().min(N);
    fixed[..len].copy_from_slice(&bytes[..len]);
    hex::encode(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_ids_render_as_zeros() {
        assert_eq!(trace_id_hex(&[]), "0".repeat(32));
        assert_eq!(span_id_hex(&[]), "0".repeat(16));
    }

    #[test]
    fn test_present_ids_render_lowercase_hex() {
        let trace_id = [
            0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45,
            0x67, 0x89,
        ];
        assert_eq!(trace_id_hex(&trace_id), "abcdef0123456789abcdef0123456789");
        assert_eq!(span_id_hex(&[1, 2, 3, 4, 5, 6, 7, 8]), "0102030405060708");
    }

    #[test]
    fn test_wrong_length_ids_keep_fixed_width() {
        assert_eq!(span_id_hex(&[0xff]), "ff00000000000000");
        assert_eq!(span_id_hex(&[0x11; 10]), "1111111111111111");
    }
}
