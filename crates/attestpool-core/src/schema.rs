// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, Decoder, Encoder};
use crate::collaborator::ClaimStore;
use crate::error::StoreError;
use crate::types::{Amount, SchemaId};

/// The closed set of claim kinds the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    PoolCreation,
    Invite,
    Block,
    Deposit,
    Transfer,
    RevokeReason,
}

impl ClaimKind {
    pub const MULTI_POOL: [ClaimKind; 6] = [
        ClaimKind::PoolCreation,
        ClaimKind::Invite,
        ClaimKind::Block,
        ClaimKind::Deposit,
        ClaimKind::Transfer,
        ClaimKind::RevokeReason,
    ];

    pub const SINGLE_POOL: [ClaimKind; 5] = [
        ClaimKind::Invite,
        ClaimKind::Block,
        ClaimKind::Deposit,
        ClaimKind::Transfer,
        ClaimKind::RevokeReason,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PoolCreation => "pool_creation",
            Self::Invite => "invite",
            Self::Block => "block",
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::RevokeReason => "revoke_reason",
        }
    }

    /// Field list registered with the claim store.
    pub const fn definition(self) -> &'static str {
        match self {
            Self::PoolCreation => "attestpool/pool_creation/v1(text name,text description,text creator_name)",
            Self::Invite => "attestpool/invite/v1(text name,text reason)",
            Self::Block => "attestpool/block/v1(text reason)",
            Self::Deposit => "attestpool/deposit/v1(text reason)",
            Self::Transfer => "attestpool/transfer/v1(u128 amount,text reason)",
            Self::RevokeReason => "attestpool/revoke_reason/v1(text reason)",
        }
    }
}

/// Decoded payload, one variant per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimBody {
    PoolCreation {
        name: String,
        description: String,
        creator_name: String,
    },
    Invite {
        name: String,
        reason: String,
    },
    Block {
        reason: String,
    },
    Deposit {
        reason: String,
    },
    Transfer {
        amount: Amount,
        reason: String,
    },
    RevokeReason {
        reason: String,
    },
}

impl ClaimBody {
    pub fn kind(&self) -> ClaimKind {
        match self {
            Self::PoolCreation { .. } => ClaimKind::PoolCreation,
            Self::Invite { .. } => ClaimKind::Invite,
            Self::Block { .. } => ClaimKind::Block,
            Self::Deposit { .. } => ClaimKind::Deposit,
            Self::Transfer { .. } => ClaimKind::Transfer,
            Self::RevokeReason { .. } => ClaimKind::RevokeReason,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let e = Encoder::new();
        let encoded = match self {
            Self::PoolCreation {
                name,
                description,
                creator_name,
            } => e.text(name)?.text(description)?.text(creator_name)?,
            Self::Invite { name, reason } => e.text(name)?.text(reason)?,
            Self::Block { reason } | Self::Deposit { reason } | Self::RevokeReason { reason } => {
                e.text(reason)?
            }
            Self::Transfer { amount, reason } => e.amount(*amount).text(reason)?,
        };
        Ok(encoded.finish())
    }

    pub fn decode(kind: ClaimKind, payload: &[u8], max_text_bytes: usize) -> Result<Self, CodecError> {
        let mut d = Decoder::new(payload, max_text_bytes);
        let body = match kind {
            ClaimKind::PoolCreation => Self::PoolCreation {
                name: d.text()?,
                description: d.text()?,
                creator_name: d.text()?,
            },
            ClaimKind::Invite => Self::Invite {
                name: d.text()?,
                reason: d.text()?,
            },
            ClaimKind::Block => Self::Block { reason: d.text()? },
            ClaimKind::Deposit => Self::Deposit { reason: d.text()? },
            ClaimKind::Transfer => Self::Transfer {
                amount: d.amount()?,
                reason: d.text()?,
            },
            ClaimKind::RevokeReason => Self::RevokeReason { reason: d.text()? },
        };
        d.finish()?;
        Ok(body)
    }
}

/// Schema ids registered for one deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaBook {
    by_id: BTreeMap<SchemaId, ClaimKind>,
    by_kind: BTreeMap<ClaimKind, SchemaId>,
}

impl SchemaBook {
    /// Registers every kind in `kinds` with the store. Only the revoke-reason
    /// schema is registered as non-revocable.
    pub fn register<S: ClaimStore + ?Sized>(store: &mut S, kinds: &[ClaimKind]) -> Result<Self, StoreError> {
        let mut book = Self::default();
        for &kind in kinds {
            let revocable = kind != ClaimKind::RevokeReason;
            let id = store.register_schema(kind.definition(), revocable)?;
            book.insert(kind, id)?;
        }
        Ok(book)
    }

    pub fn insert(&mut self, kind: ClaimKind, id: SchemaId) -> Result<(), StoreError> {
        if self.by_id.contains_key(&id) || self.by_kind.contains_key(&kind) {
            return Err(StoreError::InvalidArgument(format!(
                "schema for {} registered twice",
                kind.as_str()
            )));
        }
        self.by_id.insert(id, kind);
        self.by_kind.insert(kind, id);
        Ok(())
    }

    pub fn kind_of(&self, schema: &SchemaId) -> Option<ClaimKind> {
        self.by_id.get(schema).copied()
    }

    pub fn id_of(&self, kind: ClaimKind) -> Option<SchemaId> {
        self.by_kind.get(&kind).copied()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ClaimKind> + '_ {
        self.by_kind.keys().copied()
    }
}
