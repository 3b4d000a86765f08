//! Key and address newtypes: the 32-byte public key and the 38-byte Tox ID
//! (public key ‖ 4-byte nospam ‖ 2-byte checksum).

use std::fmt;
use std::str::FromStr;

use toxide_sys as sys;

use crate::codec::{bin_to_hex, hex_to_bin, CodecError};

/// Long-term public key of a peer (32 bytes). Identifies a friend once the
/// request handshake is done; the checksum and nospam are only part of the
/// full address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; sys::TOX_PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; sys::TOX_PUBLIC_KEY_SIZE]) -> Self {
        PublicKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; sys::TOX_PUBLIC_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bin_to_hex(&self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; sys::TOX_PUBLIC_KEY_SIZE];
        hex_to_bin(s, &mut bytes)?;
        Ok(PublicKey(bytes))
    }
}

/// Full Tox ID as handed out to contacts. The trailing two bytes are an
/// XOR-fold checksum over the first 36; parsing verifies it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; sys::TOX_ADDRESS_SIZE]);

impl Address {
    /// Wrap raw address bytes, verifying the checksum.
    pub fn from_bytes(bytes: [u8; sys::TOX_ADDRESS_SIZE]) -> Result<Self, ParseAddressError> {
        let expected = checksum(&bytes[..sys::TOX_ADDRESS_SIZE - 2]);
        if bytes[sys::TOX_ADDRESS_SIZE - 2..] != expected {
            return Err(ParseAddressError::BadChecksum);
        }
        Ok(Address(bytes))
    }

    /// Wrap address bytes coming straight from the library, which are
    /// checksummed by construction.
    pub(crate) fn from_raw(bytes: [u8; sys::TOX_ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; sys::TOX_ADDRESS_SIZE] {
        &self.0
    }

    pub fn public_key(&self) -> PublicKey {
        let mut key = [0u8; sys::TOX_PUBLIC_KEY_SIZE];
        key.copy_from_slice(&self.0[..sys::TOX_PUBLIC_KEY_SIZE]);
        PublicKey(key)
    }

    /// The nospam bytes, as they appear in the address.
    pub fn nospam(&self) -> [u8; sys::TOX_NOSPAM_SIZE] {
        let mut nospam = [0u8; sys::TOX_NOSPAM_SIZE];
        nospam.copy_from_slice(
            &self.0[sys::TOX_PUBLIC_KEY_SIZE..sys::TOX_PUBLIC_KEY_SIZE + sys::TOX_NOSPAM_SIZE],
        );
        nospam
    }

    pub fn checksum(&self) -> [u8; 2] {
        [
            self.0[sys::TOX_ADDRESS_SIZE - 2],
            self.0[sys::TOX_ADDRESS_SIZE - 1],
        ]
    }
}

/// XOR-fold checksum over address bytes, two output bytes.
fn checksum(bytes: &[u8]) -> [u8; 2] {
    let mut check = [0u8; 2];
    for (i, b) in bytes.iter().enumerate() {
        check[i % 2] ^= b;
    }
    check
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bin_to_hex(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; sys::TOX_ADDRESS_SIZE];
        hex_to_bin(s, &mut bytes)?;
        Address::from_bytes(bytes)
    }
}

/// Error parsing a hex-encoded key or address.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("address checksum mismatch")]
    BadChecksum,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_address_bytes() -> [u8; sys::TOX_ADDRESS_SIZE] {
        let mut bytes = [0u8; sys::TOX_ADDRESS_SIZE];
        for (i, b) in bytes.iter_mut().enumerate().take(36) {
            *b = i as u8;
        }
        let check = checksum(&bytes[..36]);
        bytes[36] = check[0];
        bytes[37] = check[1];
        bytes
    }

    #[test]
    fn address_roundtrip() {
        let addr = Address::from_bytes(sample_address_bytes()).unwrap();
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(addr, parsed);
        assert_eq!(parsed.as_bytes(), &sample_address_bytes());
    }

    #[test]
    fn address_components() {
        let addr = Address::from_bytes(sample_address_bytes()).unwrap();
        assert_eq!(&addr.public_key().as_bytes()[..4], &[0, 1, 2, 3]);
        assert_eq!(addr.nospam(), [32, 33, 34, 35]);
        assert_eq!(addr.checksum(), checksum(&sample_address_bytes()[..36]));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut bytes = sample_address_bytes();
        bytes[37] ^= 0xff;
        assert_eq!(
            Address::from_bytes(bytes),
            Err(ParseAddressError::BadChecksum)
        );
    }

    #[test]
    fn corrupted_hex_digit_detected() {
        // Flipping any single byte changes the XOR fold.
        let addr = Address::from_bytes(sample_address_bytes()).unwrap();
        let mut bytes = *addr.as_bytes();
        bytes[10] ^= 0x01;
        assert!(Address::from_bytes(bytes).is_err());
    }

    #[test]
    fn public_key_parse() {
        let hex = "76518406F6A9F2217E8DC487CC783C25CC16A15EB36FF32E335A235342C48A39";
        let key: PublicKey = hex.parse().unwrap();
        assert_eq!(key.to_string(), hex);
        assert!("1234".parse::<PublicKey>().is_err());
        assert!(hex.to_lowercase().parse::<PublicKey>().is_ok());
    }

    #[test]
    fn address_wrong_length() {
        assert!(matches!(
            "ABCD".parse::<Address>(),
            Err(ParseAddressError::Codec(CodecError::Length { .. }))
        ));
    }
}
