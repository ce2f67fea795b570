/*
[INPUT]:  Hex-encoded EVM addresses in any letter case
[OUTPUT]: 20-byte account value with EIP-55 checksummed rendering
[POS]:    Data layer - account identity
[UPDATE]: When address parsing or display format changes
*/

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::HandshakeError;

/// An EVM account resolved from the signing agent
///
/// Equality is on the 20 address bytes, so a lowercase address reported by an
/// agent equals its checksummed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account {
    address: Address,
}

impl Account {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 mixed-case rendering
    pub fn checksummed(&self) -> String {
        self.address.to_checksum(None)
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        Self::new(address)
    }
}

impl FromStr for Account {
    type Err = HandshakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| HandshakeError::invalid_field("address", "missing 0x prefix"))?;

        if hex.len() != 40 {
            return Err(HandshakeError::invalid_field(
                "address",
                format!("expected 40 hex digits, got {}", hex.len()),
            ));
        }

        let address = Address::from_str(hex)
            .map_err(|e| HandshakeError::invalid_field("address", e.to_string()))?;
        Ok(Self { address })
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed())
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.checksummed())
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
