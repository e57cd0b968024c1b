//! Pull-based reconciliation between one client and a shared status store.
//!
//! The engine owns the client's local copy of the status map. The copy is
//! replaced wholesale by every successful pull and only mutated in place by
//! this client's own submissions. Concurrent writers are not merged: the
//! last upsert to reach the store wins, and the next pull on every client
//! converges to it.
//!
//! Failures never escape as errors. A failed pull falls back to the local
//! cache; a failed write keeps the optimistic local update. Both are logged
//! and left for the next scheduled pull, with no retries in between.

use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use chrono::{Local, Timelike};

use rollcall_protocol::{StatusMap, StatusRecord};

use crate::board::{aggregate, Board};
use crate::cache::LocalCache;
use crate::quorum::QuorumPolicy;
use crate::store::StatusStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// Fresh map from the store.
    Remote,
    /// Store unreachable; local map restored from the cache.
    Cached,
    /// Store unreachable and nothing cached; local map left as it was.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Store accepted the write.
    Stored,
    /// Store rejected or missed the write; only the local view has it.
    LocalOnly,
}

pub struct SyncEngine<S> {
    store: S,
    cache: LocalCache,
    policy: QuorumPolicy,
    statuses: StatusMap,
}

impl<S: StatusStore> SyncEngine<S> {
    pub fn new(store: S, cache: LocalCache, policy: QuorumPolicy) -> Self {
        Self {
            store,
            cache,
            policy,
            statuses: StatusMap::new(),
        }
    }

    pub fn statuses(&self) -> &StatusMap {
        &self.statuses
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pull(&mut self) -> PullOutcome {
        match self.store.get_all() {
            Ok(statuses) => {
                tracing::debug!(members = statuses.len(), "Pulled statuses");
                self.statuses = statuses;
                PullOutcome::Remote
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to pull statuses, using local cache");
                match self.cache.load() {
                    Some(cached) => {
                        self.statuses = cached;
                        PullOutcome::Cached
                    }
                    None => PullOutcome::Unchanged,
                }
            }
        }
    }

    /// Applies `record` locally, then writes it to the store and the cache.
    pub fn submit(&mut self, member: &str, record: StatusRecord) -> SubmitOutcome {
        self.statuses.insert(member.to_string(), record.clone());

        let outcome = match self.store.upsert(member, record) {
            Ok(_) => {
                tracing::info!(member = %member, "Status submitted");
                SubmitOutcome::Stored
            }
            Err(err) => {
                tracing::warn!(member = %member, error = %err, "Failed to submit status");
                SubmitOutcome::LocalOnly
            }
        };
        self.save_cache();
        outcome
    }

    /// Clears a member's status with the same optimistic policy as `submit`.
    pub fn remove(&mut self, member: &str) -> SubmitOutcome {
        self.statuses.remove(member);

        let outcome = match self.store.remove(member) {
            Ok(_) => {
                tracing::info!(member = %member, "Status cleared");
                SubmitOutcome::Stored
            }
            Err(err) => {
                tracing::warn!(member = %member, error = %err, "Failed to clear status");
                SubmitOutcome::LocalOnly
            }
        };
        self.save_cache();
        outcome
    }

    pub fn board<T: Timelike>(&self, now: &T) -> Board {
        aggregate(&self.statuses, now, &self.policy)
    }

    /// Pulls every `interval` until `on_refresh` breaks, returning the number
    /// of pulls made. The first pull happens immediately.
    pub fn run<F>(&mut self, interval: Duration, mut on_refresh: F) -> usize
    where
        F: FnMut(&Board, PullOutcome) -> ControlFlow<()>,
    {
        let mut ticks = 0;
        loop {
            let outcome = self.pull();
            ticks += 1;
            let board = self.board(&Local::now());
            if on_refresh(&board, outcome).is_break() {
                return ticks;
            }
            thread::sleep(interval);
        }
    }

    fn save_cache(&self) {
        if let Err(err) = self.cache.save(&self.statuses) {
            tracing::warn!(error = %err, "Failed to write local status cache");
        }
    }
}
