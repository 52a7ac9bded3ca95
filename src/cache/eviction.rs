//! Eviction Index Module
//!
//! Chooses which entry to drop when a full cache receives a new key.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Eviction Policy ==
/// Which entry a full cache gives up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently written or read
    #[default]
    Lru,
    /// Oldest insertion; overwrites keep their place
    Fifo,
    /// Fewest reads, oldest first among equals
    Lfu,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Fifo => "fifo",
            EvictionPolicy::Lfu => "lfu",
        })
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "fifo" => Ok(EvictionPolicy::Fifo),
            "lfu" => Ok(EvictionPolicy::Lfu),
            other => Err(format!("unknown eviction policy: {}", other)),
        }
    }
}

/// Sort key of a tracked entry: (read count, logical clock). Only LFU uses
/// the first component; it stays zero for LRU and FIFO.
type Rank = (u64, u64);

// == Eviction Index ==
/// Ordered index over the cached keys. The smallest rank is the victim.
#[derive(Debug)]
pub struct EvictionIndex {
    policy: EvictionPolicy,
    order: BTreeMap<Rank, String>,
    ranks: HashMap<String, Rank>,
    clock: u64,
}

impl EvictionIndex {
    // == Constructor ==
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            order: BTreeMap::new(),
            ranks: HashMap::new(),
            clock: 0,
        }
    }

    // == Record Insert ==
    /// Records a write of `key`, new or overwrite.
    pub fn record_insert(&mut self, key: &str) {
        let tick = self.tick();
        match self.ranks.get(key).copied() {
            None => self.place(key.to_string(), (0, tick)),
            Some((reads, _)) => match self.policy {
                EvictionPolicy::Lru => self.rerank(key, (0, tick)),
                EvictionPolicy::Fifo => {}
                EvictionPolicy::Lfu => self.rerank(key, (reads, tick)),
            },
        }
    }

    // == Record Access ==
    /// Records a successful read of `key`. Unknown keys are ignored.
    pub fn record_access(&mut self, key: &str) {
        let Some((reads, _)) = self.ranks.get(key).copied() else {
            return;
        };
        let tick = self.tick();
        match self.policy {
            EvictionPolicy::Lru => self.rerank(key, (0, tick)),
            EvictionPolicy::Fifo => {}
            EvictionPolicy::Lfu => self.rerank(key, (reads.saturating_add(1), tick)),
        }
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(rank) = self.ranks.remove(key) {
            self.order.remove(&rank);
        }
    }

    // == Victims ==
    /// Removes and returns the next entry to evict.
    pub fn pop_victim(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ranks.remove(&key);
        Some(key)
    }

    pub fn peek_victim(&self) -> Option<&str> {
        self.order.first_key_value().map(|(_, key)| key.as_str())
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.ranks.clear();
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ranks.contains_key(key)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn place(&mut self, key: String, rank: Rank) {
        self.order.insert(rank, key.clone());
        self.ranks.insert(key, rank);
    }

    fn rerank(&mut self, key: &str, rank: Rank) {
        if let Some(old) = self.ranks.get_mut(key) {
            if let Some(owned) = self.order.remove(&*old) {
                *old = rank;
                self.order.insert(rank, owned);
            }
        }
    }
}
