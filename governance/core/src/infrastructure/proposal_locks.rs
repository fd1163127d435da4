// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Per-proposal write serialization.
//!
//! Every read-modify-write sequence on a proposal (vote, tally + finalize, stage
//! transition, workflow advance) runs while holding that proposal's guard.
//! Different proposals never contend. Entries of proposals that reached a
//! terminal stage are dropped with [`ProposalLocks::retire`].

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::proposal::ProposalId;

#[derive(Clone, Default)]
pub struct ProposalLocks {
    locks: Arc<DashMap<ProposalId, Arc<Mutex<()>>>>,
}

impl ProposalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: ProposalId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard lock is released before awaiting.
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the entry for `id` once nobody holds or waits on it. Call after the
    /// caller's own guard is released; a busy entry is left in place.
    pub fn retire(&self, id: ProposalId) -> bool {
        self.locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
