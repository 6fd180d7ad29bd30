//! # Record Identifiers
//!
//! 12-byte identifiers assigned by the collection on insert:
//!
//! - 4 bytes: creation time, seconds since the Unix epoch (big endian)
//! - 5 bytes: random value chosen once per process
//! - 3 bytes: counter seeded randomly, incremented per identifier
//!
//! Rendered as 24 lowercase hex characters at the API boundary.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const ID_LEN: usize = 12;
const HEX_LEN: usize = ID_LEN * 2;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Error for a string that is not a well-formed record identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid record id (expected 24 hex characters)")]
pub struct InvalidRecordId(pub String);

/// Store-assigned identifier of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId([u8; ID_LEN]);

impl RecordId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        let timestamp = Utc::now().timestamp() as u32;
        let process = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }

    /// Hex rendering used in API responses
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidRecordId(s.to_string()));
        }

        let mut bytes = [0u8; ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| InvalidRecordId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
