//! Hex ⇄ binary helpers for key and address formatting.

/// Decode a hex string into `out`. Strict: `hex` must be exactly twice the
/// output length and `out` must be non-empty. Accepts mixed case.
pub fn hex_to_bin(hex: &str, out: &mut [u8]) -> Result<(), CodecError> {
    if out.is_empty() || hex.len() != out.len() * 2 {
        return Err(CodecError::Length {
            expected: out.len() * 2,
            got: hex.len(),
        });
    }
    hex::decode_to_slice(hex, out).map_err(|_| CodecError::InvalidHex)
}

/// Render bytes as uppercase hex, the conventional form of Tox IDs.
pub fn bin_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Error decoding a hex string (wrong length or non-hex characters).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("expected {expected} hex characters, got {got}")]
    Length { expected: usize, got: usize },
    #[error("invalid hex")]
    InvalidHex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut out = [0u8; 4];
        hex_to_bin("DEADBEEF", &mut out).unwrap();
        assert_eq!(out, [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bin_to_hex(&out), "DEADBEEF");
    }

    #[test]
    fn mixed_case_accepted() {
        let mut out = [0u8; 2];
        hex_to_bin("aBcD", &mut out).unwrap();
        assert_eq!(out, [0xab, 0xcd]);
    }

    #[test]
    fn wrong_length_rejected() {
        let mut out = [0u8; 4];
        assert_eq!(
            hex_to_bin("DEADBE", &mut out),
            Err(CodecError::Length {
                expected: 8,
                got: 6
            })
        );
        let mut empty: [u8; 0] = [];
        assert!(hex_to_bin("", &mut empty).is_err());
    }

    #[test]
    fn non_hex_rejected() {
        let mut out = [0u8; 2];
        assert_eq!(hex_to_bin("zzzz", &mut out), Err(CodecError::InvalidHex));
    }
}
