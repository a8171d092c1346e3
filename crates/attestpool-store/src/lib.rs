// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

//! Reference collaborators for `attestpool-core`: an in-memory claim store
//! with ed25519 delegated revocation, and an in-memory treasury.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod delegation;
pub mod memory;
pub mod treasury;

pub use crate::delegation::{address_of, sign_revocation, verify_revocation_signature};
pub use crate::memory::{MemoryClaimStore, SchemaRecord, GENESIS_TIME};
pub use crate::treasury::MemoryTreasury;
