// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::router::Decision;
use crate::schema::ClaimKind;
use crate::sweeper::SweepReport;

const UNKNOWN_KIND: &str = "unknown";

#[derive(Debug, Default)]
struct TelemetryState {
    accepted_total: BTreeMap<&'static str, u64>,
    rejected_total: BTreeMap<&'static str, u64>,
    rejects_by_reason: BTreeMap<&'static str, u64>,
    revocations_accepted: BTreeMap<&'static str, u64>,
    revocations_refused: BTreeMap<&'static str, u64>,
    revocations_completed: u64,
    swept_invites: u64,
    swept_blocks: u64,
}

/// Point-in-time copy of the decision counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub accepted_total: BTreeMap<String, u64>,
    pub rejected_total: BTreeMap<String, u64>,
    pub rejects_by_reason: BTreeMap<String, u64>,
    pub revocations_accepted: BTreeMap<String, u64>,
    pub revocations_refused: BTreeMap<String, u64>,
    pub revocations_completed: u64,
    pub swept_invites: u64,
    pub swept_blocks: u64,
}

impl TelemetrySnapshot {
    pub fn accepted(&self, kind: ClaimKind) -> u64 {
        self.accepted_total.get(kind.as_str()).copied().unwrap_or(0)
    }

    pub fn rejected(&self, kind: ClaimKind) -> u64 {
        self.rejected_total.get(kind.as_str()).copied().unwrap_or(0)
    }

    pub fn rejects_for(&self, code: &str) -> u64 {
        self.rejects_by_reason.get(code).copied().unwrap_or(0)
    }
}

/// Shared decision counters. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    state: Arc<Mutex<TelemetryState>>,
}

fn bump(map: &mut BTreeMap<&'static str, u64>, key: &'static str) {
    let entry = map.entry(key).or_insert(0);
    *entry = entry.saturating_add(1);
}

fn owned(map: &BTreeMap<&'static str, u64>) -> BTreeMap<String, u64> {
    map.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accept_decision(&self, kind: Option<ClaimKind>, decision: &Decision) {
        let kind = kind.map_or(UNKNOWN_KIND, ClaimKind::as_str);
        let mut guard = self.state.lock();
        match decision {
            Decision::Accept => bump(&mut guard.accepted_total, kind),
            Decision::Reject(reason) => {
                bump(&mut guard.rejected_total, kind);
                bump(&mut guard.rejects_by_reason, reason.as_str());
            }
        }
    }

    pub fn record_revoke_decision(&self, kind: Option<ClaimKind>, decision: &Decision) {
        let kind = kind.map_or(UNKNOWN_KIND, ClaimKind::as_str);
        let mut guard = self.state.lock();
        match decision {
            Decision::Accept => bump(&mut guard.revocations_accepted, kind),
            Decision::Reject(reason) => {
                bump(&mut guard.revocations_refused, kind);
                bump(&mut guard.rejects_by_reason, reason.as_str());
            }
        }
    }

    pub fn record_revocation(&self) {
        let mut guard = self.state.lock();
        guard.revocations_completed = guard.revocations_completed.saturating_add(1);
    }

    pub fn record_sweep(&self, report: &SweepReport) {
        let mut guard = self.state.lock();
        guard.swept_invites = guard.swept_invites.saturating_add(report.invites_removed as u64);
        guard.swept_blocks = guard.swept_blocks.saturating_add(report.blocks_removed as u64);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let guard = self.state.lock();
        TelemetrySnapshot {
            accepted_total: owned(&guard.accepted_total),
            rejected_total: owned(&guard.rejected_total),
            rejects_by_reason: owned(&guard.rejects_by_reason),
            revocations_accepted: owned(&guard.revocations_accepted),
            revocations_refused: owned(&guard.revocations_refused),
            revocations_completed: guard.revocations_completed,
            swept_invites: guard.swept_invites,
            swept_blocks: guard.swept_blocks,
        }
    }
}
