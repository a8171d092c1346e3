// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::codec::CodecError;
use crate::router::Rejection;
use crate::types::{Amount, ClaimId};

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures reported by a claim store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("schema is not registered")]
    SchemaNotRegistered,

    #[error("claim not found: {0}")]
    ClaimNotFound(ClaimId),

    #[error("claim already revoked: {0}")]
    AlreadyRevoked(ClaimId),

    #[error("claim is not revocable: {0}")]
    NotRevocable(ClaimId),

    #[error("revocation schema does not match claim schema")]
    SchemaMismatch,

    #[error("revoker is not the claim attester")]
    NotAttester,

    #[error("delegated signature verification failed")]
    BadSignature,

    #[error("unexpected delegation nonce: expected {expected}, got {got}")]
    BadNonce { expected: u64, got: u64 },

    #[error("delegation deadline expired")]
    DeadlineExpired,

    #[error("duplicate claim id: {0}")]
    DuplicateClaim(ClaimId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures reported by a treasury implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreasuryError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("payout refused by recipient")]
    PayoutRefused,

    #[error("amount overflow")]
    Overflow,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("config io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("claim store failure: {0}")]
    Store(#[from] StoreError),

    #[error("treasury failure: {0}")]
    Treasury(#[from] TreasuryError),

    #[error("config failure: {0}")]
    Config(#[from] ConfigError),

    #[error("payload encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("revocation of {0} refused: {}", .1.as_str())]
    RevocationRefused(ClaimId, Rejection),

    #[error("revoke-reason for {0} refused: {}", .1.as_str())]
    ReasonRefused(ClaimId, Rejection),

    #[error("operation unsupported in this deployment: {0}")]
    UnsupportedInVariant(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}
