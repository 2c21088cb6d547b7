use slotmap::{SlotMap, new_key_type};
use std::collections::{HashMap, HashSet};

use crate::domain::install::hop::Hop;
use crate::domain::protocol::message::PacketIn;
use crate::domain::utils::id::{Dpid, Xid};

new_key_type! {
    pub struct WaitingPathId;
}

/// A barrier-strategy install that is waiting for its acknowledgements.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitingPath {
    pub hops: Vec<Hop>,

    /// Packet to release through the first switch once the path is live.
    pub packet: Option<PacketIn>,

    pub first_switch: Dpid,

    /// Barrier requests not yet acknowledged.
    pub outstanding: HashSet<(Dpid, Xid)>,

    /// Absolute deadline in clock milliseconds.
    pub expires_at_ms: i64,
}

impl WaitingPath {
    pub fn new(hops: Vec<Hop>, packet: Option<PacketIn>, first_switch: Dpid, expires_at_ms: i64) -> Self {
        Self { hops, packet, first_switch, outstanding: HashSet::new(), expires_at_ms }
    }

    pub fn add_xid(&mut self, dpid: Dpid, xid: Xid) {
        self.outstanding.insert((dpid, xid));
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

#[derive(Debug, PartialEq)]
pub enum Acknowledgement {
    /// No waiting path expects this `(dpid, xid)`.
    Unknown,
    Pending { remaining: usize },
    /// The last outstanding barrier was acknowledged; the entry left the ledger.
    Completed(WaitingPath),
}

/// Waiting paths keyed by slot, with a lookup from each outstanding `(dpid, xid)`.
#[derive(Debug, Default)]
pub struct WaitingPathLedger {
    slots: SlotMap<WaitingPathId, WaitingPath>,
    xid_index: HashMap<(Dpid, Xid), WaitingPathId>,
}

impl WaitingPathLedger {
    pub fn new() -> Self {
        Self { slots: SlotMap::with_key(), xid_index: HashMap::new() }
    }

    /// Stores a waiting path and indexes all of its outstanding barriers.
    pub fn insert(&mut self, waiting_path: WaitingPath) -> WaitingPathId {
        let pairs: Vec<(Dpid, Xid)> = waiting_path.outstanding.iter().copied().collect();
        let key = self.slots.insert(waiting_path);
        for pair in pairs {
            self.xid_index.insert(pair, key);
        }
        key
    }

    pub fn acknowledge(&mut self, dpid: Dpid, xid: Xid) -> Acknowledgement {
        let Some(key) = self.xid_index.remove(&(dpid, xid)) else {
            return Acknowledgement::Unknown;
        };
        let Some(waiting_path) = self.slots.get_mut(key) else {
            return Acknowledgement::Unknown;
        };

        waiting_path.outstanding.remove(&(dpid, xid));
        if !waiting_path.outstanding.is_empty() {
            return Acknowledgement::Pending { remaining: waiting_path.outstanding.len() };
        }

        match self.slots.remove(key) {
            Some(waiting_path) => Acknowledgement::Completed(waiting_path),
            None => Acknowledgement::Unknown,
        }
    }

    /// Removes and returns every entry whose deadline has passed.
    pub fn remove_expired(&mut self, now_ms: i64) -> Vec<WaitingPath> {
        let expired: Vec<WaitingPathId> = self.slots.iter().filter(|(_, waiting_path)| waiting_path.is_expired(now_ms)).map(|(key, _)| key).collect();

        let mut removed = Vec::with_capacity(expired.len());
        for key in expired {
            if let Some(waiting_path) = self.slots.remove(key) {
                for pair in &waiting_path.outstanding {
                    self.xid_index.remove(pair);
                }
                removed.push(waiting_path);
            }
        }
        removed
    }

    pub fn get(&self, key: WaitingPathId) -> Option<&WaitingPath> {
        self.slots.get(key)
    }

    pub fn is_waiting_for(&self, dpid: Dpid, xid: Xid) -> bool {
        self.xid_index.contains_key(&(dpid, xid))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
