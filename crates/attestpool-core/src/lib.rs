// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

//! attestpool-core
//!
//! Membership and fund-custody engine driven by attestations. The engine acts
//! as the resolver of a claim store: it decides which claims are accepted,
//! keeps per-pool invite and block sets plus per-pool balances, and only lets
//! membership claims be revoked together with a recorded reason.
//!
//! - Schema Router: accept/revoke dispatch over a closed set of claim kinds
//! - Membership and Custody ledgers
//! - Reason-bound revocation through a scoped [`revocation::ReasonGrant`]
//! - Caller-triggered expiry sweep

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod codec;
pub mod collaborator;
pub mod config;
pub mod custody;
pub mod engine;
pub mod error;
pub mod membership;
pub mod revocation;
pub mod router;
pub mod schema;
pub mod sweeper;
pub mod telemetry;
pub mod types;

pub use crate::collaborator::{ClaimStore, Treasury};
pub use crate::config::EngineConfig;
pub use crate::engine::{Deployment, PoolEngine, Submission};
pub use crate::error::{ConfigError, EngineError, EngineResult, StoreError, TreasuryError};
pub use crate::revocation::RevocationReceipt;
pub use crate::router::{Decision, Rejection};
pub use crate::schema::{ClaimBody, ClaimKind, SchemaBook};
pub use crate::sweeper::SweepReport;
pub use crate::telemetry::{Telemetry, TelemetrySnapshot};
pub use crate::types::{
    Address, Amount, Claim, ClaimId, ClaimRequest, DelegatedRevocation, PoolId, SchemaId,
    Timestamp, VerifiedRevocation, NO_EXPIRY, UNIT,
};
