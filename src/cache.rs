//! A bounded TTL cache for dashboard reads, held in managed state.
//!
//! Only the read-only dashboard endpoint consults this cache; vote casting
//! always goes to the database, so a stale entry can never change what the
//! ledger accepts.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::model::{api::DashboardView, common::ElectionType, mongodb::Id};

/// One dashboard per voter per election.
type Key = (Id, ElectionType);

struct Entry {
    cached_at: Instant,
    view: DashboardView,
}

/// A bounded TTL cache of dashboard views.
///
/// Eviction is deliberately crude: when full, expired entries go first,
/// then the oldest entry makes room. Dashboard traffic does not justify
/// more.
pub struct DashboardCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<Key, Entry>>,
}

impl DashboardCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A fresh-enough cached view, if there is one.
    pub fn get(&self, voter_id: Id, election_type: ElectionType) -> Option<DashboardView> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(&(voter_id, election_type))
            .filter(|entry| entry.cached_at.elapsed() < self.ttl)
            .map(|entry| entry.view.clone())
    }

    /// Cache a freshly built view.
    pub fn put(&self, voter_id: Id, election_type: ElectionType, view: DashboardView) {
        let key = (voter_id, election_type);
        let mut entries = self.entries.lock().unwrap();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.cached_at)
                    .map(|(key, _)| *key);
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            Entry {
                cached_at: Instant::now(),
                view,
            },
        );
    }

    /// Forget a voter's cached view, e.g. after their votes change.
    pub fn invalidate(&self, voter_id: Id, election_type: ElectionType) {
        self.entries
            .lock()
            .unwrap()
            .remove(&(voter_id, election_type));
    }
}
