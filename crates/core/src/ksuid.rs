//! K-sortable unique identifiers, after segment's KSUID design.
//!
//! An identifier is a big-endian timestamp followed by a random payload,
//! 20 bytes total, rendered as a fixed-width base62 string. Because the
//! timestamp leads and the encoding is width-stable, both the byte and the
//! string representations sort in creation-time order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::KsuidError;

/// Custom epoch (2014-05-13T16:53:20Z). Starting the 32-bit second counter
/// here instead of at the Unix epoch buys usable range until ~2150. The
/// value (14e8) was picked to be easy to remember.
pub const EPOCH_SECONDS: i64 = 1_400_000_000;

/// Length of the second-precision timestamp field in bytes.
pub const TIMESTAMP_LEN: usize = 4;

/// Length of the random payload of a [`Ksuid`] in bytes.
pub const PAYLOAD_LEN: usize = 16;

/// Total identifier length in bytes.
pub const BYTES_LEN: usize = TIMESTAMP_LEN + PAYLOAD_LEN;

/// Length of the base62 text form. 27 base62 digits cover the full
/// 160-bit range, so the encoding never truncates.
pub const ENCODED_LEN: usize = 27;

/// Length of the sub-second timestamp field of a [`KsuidMs`] in bytes.
pub const MS_TIMESTAMP_LEN: usize = 5;

/// Length of the random payload of a [`KsuidMs`] in bytes.
pub const MS_PAYLOAD_LEN: usize = 15;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// A second-precision K-sortable identifier.
///
/// 4-byte big-endian seconds since [`EPOCH_SECONDS`], then 16 random
/// bytes. Timestamps past the 32-bit range (~136 years after the custom
/// epoch) truncate and pre-epoch timestamps clamp to zero; neither is
/// checked.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ksuid([u8; BYTES_LEN]);

impl Ksuid {
    /// Generates an identifier for the current time with a random payload.
    pub fn new() -> Self {
        Self::from_parts(Utc::now(), random_payload())
    }

    /// Builds an identifier from an explicit timestamp and payload, for
    /// deterministic construction in tests and backfills.
    pub fn from_parts(at: DateTime<Utc>, payload: [u8; PAYLOAD_LEN]) -> Self {
        let mut bytes = [0u8; BYTES_LEN];
        bytes[..TIMESTAMP_LEN].copy_from_slice(&epoch_seconds(at).to_be_bytes());
        bytes[TIMESTAMP_LEN..].copy_from_slice(&payload);
        Self(bytes)
    }

    /// Reconstructs an identifier from its 20-byte representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KsuidError> {
        let bytes: [u8; BYTES_LEN] =
            bytes
                .try_into()
                .map_err(|_| KsuidError::InvalidByteLength {
                    expected: BYTES_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Parses an identifier from its 27-character base62 text form.
    pub fn from_base62(text: &str) -> Result<Self, KsuidError> {
        decode_base62(text).map(Self)
    }

    /// The full byte representation.
    pub fn as_bytes(&self) -> &[u8; BYTES_LEN] {
        &self.0
    }

    /// The random payload, with the timestamp portion removed.
    pub fn payload(&self) -> &[u8] {
        &self.0[TIMESTAMP_LEN..]
    }

    /// Raw seconds since the custom epoch.
    pub fn timestamp(&self) -> u32 {
        let mut field = [0u8; TIMESTAMP_LEN];
        field.copy_from_slice(&self.0[..TIMESTAMP_LEN]);
        u32::from_be_bytes(field)
    }

    /// Seconds since the Unix epoch.
    pub fn unix_timestamp(&self) -> i64 {
        i64::from(self.timestamp()) + EPOCH_SECONDS
    }

    /// Creation time carried by the identifier.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.unix_timestamp(), 0)
            .expect("u32 seconds past the custom epoch are within chrono range")
    }
}

impl Default for Ksuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Ksuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_base62(&self.0))
    }
}

impl fmt::Debug for Ksuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ksuid({self})")
    }
}

impl FromStr for Ksuid {
    type Err = KsuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base62(s)
    }
}

impl Serialize for Ksuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ksuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A K-sortable identifier with 1/256-second timestamp resolution.
///
/// Same 20-byte/27-character framing as [`Ksuid`], but the leading field
/// is 5 bytes of `seconds * 256` since the custom epoch and the payload
/// shrinks to 15 bytes. Useful when writes within the same second must
/// still sort by creation order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KsuidMs([u8; BYTES_LEN]);

impl KsuidMs {
    /// Generates an identifier for the current time with a random payload.
    pub fn new() -> Self {
        Self::from_parts(Utc::now(), random_ms_payload())
    }

    /// Builds an identifier from an explicit timestamp and payload.
    pub fn from_parts(at: DateTime<Utc>, payload: [u8; MS_PAYLOAD_LEN]) -> Self {
        let mut bytes = [0u8; BYTES_LEN];
        bytes[..MS_TIMESTAMP_LEN].copy_from_slice(&epoch_ticks(at).to_be_bytes()[3..]);
        bytes[MS_TIMESTAMP_LEN..].copy_from_slice(&payload);
        Self(bytes)
    }

    /// Reconstructs an identifier from its 20-byte representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KsuidError> {
        let bytes: [u8; BYTES_LEN] =
            bytes
                .try_into()
                .map_err(|_| KsuidError::InvalidByteLength {
                    expected: BYTES_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Parses an identifier from its 27-character base62 text form.
    pub fn from_base62(text: &str) -> Result<Self, KsuidError> {
        decode_base62(text).map(Self)
    }

    /// The full byte representation.
    pub fn as_bytes(&self) -> &[u8; BYTES_LEN] {
        &self.0
    }

    /// The random payload, with the timestamp portion removed.
    pub fn payload(&self) -> &[u8] {
        &self.0[MS_TIMESTAMP_LEN..]
    }

    /// Raw 1/256-second ticks since the custom epoch.
    pub fn timestamp_ticks(&self) -> u64 {
        let mut field = [0u8; 8];
        field[3..].copy_from_slice(&self.0[..MS_TIMESTAMP_LEN]);
        u64::from_be_bytes(field)
    }

    /// Creation time carried by the identifier.
    pub fn datetime(&self) -> DateTime<Utc> {
        let millis = (self.timestamp_ticks() as i64) * 1000 / 256 + EPOCH_SECONDS * 1000;
        DateTime::from_timestamp_millis(millis)
            .expect("40-bit ticks past the custom epoch are within chrono range")
    }
}

impl Default for KsuidMs {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for KsuidMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_base62(&self.0))
    }
}

impl fmt::Debug for KsuidMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KsuidMs({self})")
    }
}

impl FromStr for KsuidMs {
    type Err = KsuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base62(s)
    }
}

impl Serialize for KsuidMs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KsuidMs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Timestamp and payload helpers
// ============================================================================

fn epoch_seconds(at: DateTime<Utc>) -> u32 {
    at.timestamp()
        .saturating_sub(EPOCH_SECONDS)
        .clamp(0, i64::from(u32::MAX)) as u32
}

fn epoch_ticks(at: DateTime<Utc>) -> u64 {
    const MAX_TICKS: i64 = (1 << (MS_TIMESTAMP_LEN * 8)) - 1;
    let millis = at
        .timestamp_millis()
        .saturating_sub(EPOCH_SECONDS * 1000)
        .max(0);
    // Round to the nearest 1/256 s tick.
    let ticks = (millis as i128 * 256 + 500) / 1000;
    ticks.clamp(0, i128::from(MAX_TICKS)) as u64
}

fn random_payload() -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];
    rand::rng().fill_bytes(&mut payload);
    payload
}

fn random_ms_payload() -> [u8; MS_PAYLOAD_LEN] {
    let mut payload = [0u8; MS_PAYLOAD_LEN];
    rand::rng().fill_bytes(&mut payload);
    payload
}

// ============================================================================
// Fixed-width base62
// ============================================================================

/// Encodes 20 bytes as exactly [`ENCODED_LEN`] base62 characters,
/// left-padded with '0' so the width is constant and lexicographic order
/// matches byte order.
fn encode_base62(bytes: &[u8; BYTES_LEN]) -> String {
    let mut scratch = *bytes;
    let mut digits = [0u8; ENCODED_LEN];

    for digit in digits.iter_mut().rev() {
        // Long division of the whole buffer by 62; the remainder is the
        // next digit from the least significant end.
        let mut rem: u32 = 0;
        for byte in scratch.iter_mut() {
            let cur = (rem << 8) | u32::from(*byte);
            *byte = (cur / 62) as u8;
            rem = cur % 62;
        }
        *digit = ALPHABET[rem as usize];
    }

    digits.iter().map(|&b| b as char).collect()
}

/// Inverse of [`encode_base62`]; rejects wrong widths, characters outside
/// the alphabet, and values that do not fit in 20 bytes.
fn decode_base62(text: &str) -> Result<[u8; BYTES_LEN], KsuidError> {
    if text.chars().count() != ENCODED_LEN {
        return Err(KsuidError::InvalidTextLength {
            expected: ENCODED_LEN,
            actual: text.chars().count(),
        });
    }

    let mut bytes = [0u8; BYTES_LEN];
    for ch in text.chars() {
        let mut carry = u32::from(digit_value(ch)?);
        for byte in bytes.iter_mut().rev() {
            let cur = u32::from(*byte) * 62 + carry;
            *byte = (cur & 0xFF) as u8;
            carry = cur >> 8;
        }
        if carry != 0 {
            return Err(KsuidError::Overflow);
        }
    }

    Ok(bytes)
}

fn digit_value(ch: char) -> Result<u8, KsuidError> {
    match ch {
        '0'..='9' => Ok(ch as u8 - b'0'),
        'A'..='Z' => Ok(ch as u8 - b'A' + 10),
        'a'..='z' => Ok(ch as u8 - b'a' + 36),
        _ => Err(KsuidError::InvalidCharacter(ch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(unix: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(unix, 0).unwrap()
    }

    #[test]
    fn test_encoding_is_fixed_width() {
        let cases = [
            Ksuid::from_bytes(&[0u8; BYTES_LEN]).unwrap(),
            Ksuid::from_bytes(&[0xFFu8; BYTES_LEN]).unwrap(),
            Ksuid::from_parts(at(EPOCH_SECONDS), [0u8; PAYLOAD_LEN]),
            Ksuid::new(),
        ];
        for ksuid in cases {
            assert_eq!(ksuid.to_string().len(), ENCODED_LEN);
        }
    }

    #[test]
    fn test_zero_identifier_encodes_as_all_zeros() {
        let ksuid = Ksuid::from_bytes(&[0u8; BYTES_LEN]).unwrap();
        assert_eq!(ksuid.to_string(), "0".repeat(ENCODED_LEN));
    }

    #[test]
    fn test_small_values_encode_to_expected_digits() {
        let mut bytes = [0u8; BYTES_LEN];

        bytes[BYTES_LEN - 1] = 61;
        let encoded = Ksuid::from_bytes(&bytes).unwrap().to_string();
        assert_eq!(encoded, format!("{}z", "0".repeat(ENCODED_LEN - 1)));

        bytes[BYTES_LEN - 1] = 62;
        let encoded = Ksuid::from_bytes(&bytes).unwrap().to_string();
        assert_eq!(encoded, format!("{}10", "0".repeat(ENCODED_LEN - 2)));
    }

    #[test]
    fn test_byte_round_trip() {
        let ksuid = Ksuid::from_parts(at(1_700_000_000), *b"0123456789abcdef");
        let parsed = Ksuid::from_base62(&ksuid.to_string()).unwrap();
        assert_eq!(parsed, ksuid);
        assert_eq!(parsed.as_bytes(), ksuid.as_bytes());
    }

    #[test]
    fn test_string_round_trip_via_from_str() {
        let ksuid = Ksuid::new();
        let parsed: Ksuid = ksuid.to_string().parse().unwrap();
        assert_eq!(parsed, ksuid);
    }

    #[test]
    fn test_ordering_follows_timestamps_regardless_of_payload() {
        let earlier = Ksuid::from_parts(at(1_600_000_000), [0xFF; PAYLOAD_LEN]);
        let later = Ksuid::from_parts(at(1_600_000_001), [0x00; PAYLOAD_LEN]);

        assert!(earlier < later);
        assert!(earlier.to_string() < later.to_string());
    }

    #[test]
    fn test_timestamp_accessors() {
        let ksuid = Ksuid::from_parts(at(1_700_000_000), [0u8; PAYLOAD_LEN]);
        assert_eq!(ksuid.unix_timestamp(), 1_700_000_000);
        assert_eq!(ksuid.timestamp(), (1_700_000_000 - EPOCH_SECONDS) as u32);
        assert_eq!(ksuid.datetime(), at(1_700_000_000));
    }

    #[test]
    fn test_pre_epoch_timestamps_clamp_to_zero() {
        let ksuid = Ksuid::from_parts(at(EPOCH_SECONDS - 1000), [0u8; PAYLOAD_LEN]);
        assert_eq!(ksuid.timestamp(), 0);
    }

    #[test]
    fn test_payload_accessor() {
        let payload = *b"0123456789abcdef";
        let ksuid = Ksuid::from_parts(at(1_700_000_000), payload);
        assert_eq!(ksuid.payload(), &payload[..]);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_lengths() {
        assert_eq!(
            Ksuid::from_bytes(&[0u8; 19]),
            Err(KsuidError::InvalidByteLength {
                expected: 20,
                actual: 19
            })
        );
        assert_eq!(
            Ksuid::from_bytes(&[0u8; 21]),
            Err(KsuidError::InvalidByteLength {
                expected: 20,
                actual: 21
            })
        );
    }

    #[test]
    fn test_parse_rejects_wrong_width() {
        assert_eq!(
            Ksuid::from_base62("0"),
            Err(KsuidError::InvalidTextLength {
                expected: ENCODED_LEN,
                actual: 1
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_characters() {
        let text = format!("{}!", "0".repeat(ENCODED_LEN - 1));
        assert_eq!(
            Ksuid::from_base62(&text),
            Err(KsuidError::InvalidCharacter('!'))
        );
    }

    #[test]
    fn test_parse_rejects_values_out_of_range() {
        // 62^27 - 1 does not fit in 160 bits.
        let text = "z".repeat(ENCODED_LEN);
        assert_eq!(Ksuid::from_base62(&text), Err(KsuidError::Overflow));
    }

    #[test]
    fn test_serde_as_base62_string() {
        let ksuid = Ksuid::from_parts(at(1_700_000_000), *b"0123456789abcdef");
        let json = serde_json::to_string(&ksuid).unwrap();
        assert_eq!(json, format!("\"{ksuid}\""));

        let parsed: Ksuid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ksuid);
    }

    #[test]
    fn test_ms_round_trip() {
        let ksuid = KsuidMs::from_parts(at(1_700_000_000), *b"0123456789abcde");
        let parsed = KsuidMs::from_base62(&ksuid.to_string()).unwrap();
        assert_eq!(parsed, ksuid);
        assert_eq!(ksuid.to_string().len(), ENCODED_LEN);
    }

    #[test]
    fn test_ms_orders_within_a_second() {
        let base = at(1_700_000_000);
        let earlier = KsuidMs::from_parts(base, [0xFF; MS_PAYLOAD_LEN]);
        let later = KsuidMs::from_parts(base + chrono::Duration::milliseconds(500), [0x00; MS_PAYLOAD_LEN]);

        assert!(earlier < later);
        assert!(earlier.to_string() < later.to_string());
    }

    #[test]
    fn test_ms_datetime_resolution() {
        let stamp = at(1_700_000_000) + chrono::Duration::milliseconds(500);
        let ksuid = KsuidMs::from_parts(stamp, [0u8; MS_PAYLOAD_LEN]);
        let recovered = ksuid.datetime();

        let delta = (recovered - stamp).num_milliseconds().abs();
        // 1/256 s resolution loses at most ~4 ms.
        assert!(delta <= 4, "delta was {delta} ms");
    }
}
