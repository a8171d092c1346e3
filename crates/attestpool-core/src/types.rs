// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub type Hash32 = [u8; 32];

/// Native value in base units.
pub type Amount = u128;

/// Base units per whole native unit.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Unix seconds.
pub type Timestamp = u64;

/// Expiry value meaning "never expires".
pub const NO_EXPIRY: Timestamp = 0;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub Hash32);

/// A pool is named by the id of the claim that created it.
pub type PoolId = ClaimId;

impl ClaimId {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimId({self})")
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaId(pub Hash32);

impl SchemaId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaId(0x{})", self.to_hex())
    }
}

/// 20-byte account address. Serialized as a `0x`-prefixed hex string.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Test and config helper: an address whose last byte is `tag`.
    pub const fn tagged(tag: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = tag;
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let mut out = [0u8; 20];
        hex::decode_to_slice(raw, &mut out)?;
        Ok(Self(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A signed, schema-typed claim as held by the claim store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub schema: SchemaId,
    pub attester: Address,
    pub recipient: Address,
    pub reference_id: ClaimId,
    pub payload: Vec<u8>,
    pub value: Amount,
    pub time: Timestamp,
    pub expiry: Timestamp,
    pub revocation_time: Timestamp,
    pub revocable: bool,
}

impl Claim {
    pub fn is_revoked(&self) -> bool {
        self.revocation_time != 0
    }

    /// True once `now` is strictly past a non-zero expiry.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiry != NO_EXPIRY && self.expiry < now
    }
}

/// What a submitter asks the claim store to attest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub schema: SchemaId,
    pub recipient: Address,
    pub expiry: Timestamp,
    pub revocable: bool,
    pub reference_id: ClaimId,
    pub payload: Vec<u8>,
    pub value: Amount,
}

impl ClaimRequest {
    pub fn new(schema: SchemaId, recipient: Address, reference_id: ClaimId, payload: Vec<u8>) -> Self {
        Self {
            schema,
            recipient,
            expiry: NO_EXPIRY,
            revocable: true,
            reference_id,
            payload,
            value: 0,
        }
    }

    pub fn with_expiry(mut self, expiry: Timestamp) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }

    pub fn irrevocable(mut self) -> Self {
        self.revocable = false;
        self
    }
}

/// A revocation signed by the original attester and relayed by anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedRevocation {
    pub schema: SchemaId,
    pub claim_id: ClaimId,
    pub revoker_key: Hash32,
    pub nonce: u64,
    pub deadline: Timestamp,
    pub signature: Vec<u8>,
}

/// The claim store's answer to a delegated revocation that passed its checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRevocation {
    pub claim: Claim,
    pub revoker: Address,
}
