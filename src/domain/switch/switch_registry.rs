use std::collections::HashMap;

use crate::domain::protocol::message::{PortDesc, SwitchMessage};
use crate::domain::switch::connection::SwitchConnection;
use crate::domain::switch::switch::Switch;
use crate::domain::utils::id::{ConnectionId, Dpid};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// First connection of this switch.
    New,
    /// The switch was known and disconnected.
    Reconnected,
    /// The switch was still connected; the old connection was released.
    Replaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    Released,
    /// The connection id is not the live one, e.g. the old connection of a switch that has
    /// already reconnected.
    Stale,
    AlreadyDisconnected,
    Unknown,
}

/// Tracks every switch the controller has seen and its current connection.
#[derive(Debug, Default)]
pub struct SwitchRegistry {
    switches: HashMap<Dpid, Switch>,
}

impl SwitchRegistry {
    pub fn new() -> Self {
        Self { switches: HashMap::new() }
    }

    pub fn connect(&mut self, dpid: Dpid, connection: Box<dyn SwitchConnection>, ports: Vec<PortDesc>, now_ms: i64) -> ConnectOutcome {
        let outcome = match self.switches.get(&dpid) {
            None => ConnectOutcome::New,
            Some(switch) if switch.is_connected() => ConnectOutcome::Replaced,
            Some(_) => ConnectOutcome::Reconnected,
        };

        if outcome == ConnectOutcome::Replaced {
            log::warn!("Switch {} is already connected; replacing its connection.", dpid);
        }

        self.switches.entry(dpid).or_insert_with(|| Switch::new(dpid)).connect(connection, ports, now_ms);
        outcome
    }

    /// Releases the connection of `dpid` if `connection_id` is the live one.
    pub fn disconnect(&mut self, dpid: Dpid, connection_id: ConnectionId) -> DisconnectOutcome {
        let Some(switch) = self.switches.get_mut(&dpid) else {
            log::warn!("Switch {} is unknown; ignoring disconnect.", dpid);
            return DisconnectOutcome::Unknown;
        };

        match switch.connection_id() {
            None => {
                log::warn!("Switch {} is already disconnected.", dpid);
                DisconnectOutcome::AlreadyDisconnected
            }
            Some(live) if live != connection_id => {
                log::debug!("Ignoring disconnect of stale connection {} for {}; live connection is {}.", connection_id, dpid, live);
                DisconnectOutcome::Stale
            }
            Some(_) => {
                switch.disconnect();
                DisconnectOutcome::Released
            }
        }
    }

    pub fn send(&self, dpid: Dpid, message: SwitchMessage) -> Result<()> {
        match self.switches.get(&dpid) {
            Some(switch) => switch.send(message),
            None => Err(Error::SwitchNotConnected(dpid)),
        }
    }

    pub fn get(&self, dpid: Dpid) -> Option<&Switch> {
        self.switches.get(&dpid)
    }

    pub fn is_connected(&self, dpid: Dpid) -> bool {
        self.switches.get(&dpid).is_some_and(Switch::is_connected)
    }

    /// Connected switches, sorted.
    pub fn connected(&self) -> Vec<Dpid> {
        let mut dpids: Vec<Dpid> = self.switches.values().filter(|switch| switch.is_connected()).map(|switch| switch.dpid).collect();
        dpids.sort();
        dpids
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}
