use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::clock::clock::SharedClock;
use crate::domain::controller::controller_config::ControllerConfig;
use crate::domain::install::hop::Hop;
use crate::domain::install::install_strategy::InstallStrategy;
use crate::domain::install::waiting_path::{Acknowledgement, WaitingPath, WaitingPathLedger};
use crate::domain::protocol::flow_match::FlowMatch;
use crate::domain::protocol::message::{FlowMod, PacketIn, PacketOut, SwitchMessage};
use crate::domain::switch::switch_registry::SwitchRegistry;
use crate::domain::utils::id::{Dpid, Xid};
use crate::error::{Error, Result};

pub const ANALYTICS_TARGET: &str = "sdn_dynroute::analytics";

const PATH_INSTALLED_CHANNEL_CAPACITY: usize = 256;

/// Published once per completed barrier-strategy install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathInstalled {
    pub hops: Vec<Hop>,
}

/// Programs resolved paths into switches and tracks barrier acknowledgements.
#[derive(Debug)]
pub struct PathInstaller {
    strategy: InstallStrategy,
    flow_idle_timeout_s: u16,
    flow_hard_timeout_s: u16,
    path_setup_time_ms: i64,
    next_xid: Xid,
    ledger: WaitingPathLedger,
    clock: SharedClock,
    installed_tx: broadcast::Sender<PathInstalled>,
}

impl PathInstaller {
    pub fn new(config: &ControllerConfig, clock: SharedClock) -> Self {
        let (installed_tx, _) = broadcast::channel(PATH_INSTALLED_CHANNEL_CAPACITY);
        Self {
            strategy: config.strategy,
            flow_idle_timeout_s: config.flow_idle_timeout_s,
            flow_hard_timeout_s: config.flow_hard_timeout_s,
            path_setup_time_ms: config.path_setup_time_ms,
            next_xid: Xid::new(1),
            ledger: WaitingPathLedger::new(),
            clock,
            installed_tx,
        }
    }

    pub fn strategy(&self) -> InstallStrategy {
        self.strategy
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PathInstalled> {
        self.installed_tx.subscribe()
    }

    pub fn waiting_path_count(&self) -> usize {
        self.ledger.len()
    }

    /// Installs `flow_match` along `hops` and releases `packet` according to the strategy.
    ///
    /// Nothing is sent if one of the hop switches has no live connection. A send that fails
    /// part way returns the error and leaves nothing in the ledger; rules already sent stay on
    /// their switches until they time out, and the caller drops the packet.
    pub fn install(&mut self, switches: &SwitchRegistry, hops: &[Hop], flow_match: &FlowMatch, packet: Option<&PacketIn>) -> Result<()> {
        let Some(first) = hops.first() else {
            return Ok(());
        };
        if let Some(offline) = hops.iter().find(|hop| !switches.is_connected(hop.dpid)) {
            return Err(Error::SwitchNotConnected(offline.dpid));
        }

        match self.strategy {
            InstallStrategy::Barrier => {
                let expires_at_ms = self.clock.get_current_time_in_ms() + self.path_setup_time_ms;
                let mut waiting_path = WaitingPath::new(hops.to_vec(), packet.cloned(), first.dpid, expires_at_ms);

                for hop in hops.iter().rev() {
                    self.install_hop(switches, hop, flow_match)?;
                    let xid = self.allocate_xid();
                    switches.send(hop.dpid, SwitchMessage::BarrierRequest { xid })?;
                    waiting_path.add_xid(hop.dpid, xid);
                }

                log::debug!("Waiting for {} barrier(s) before releasing the path from {}.", waiting_path.outstanding.len(), first.dpid);
                self.ledger.insert(waiting_path);
            }
            InstallStrategy::NextHop => {
                self.install_hop(switches, first, flow_match)?;
                Self::release(switches, first.dpid, packet)?;
            }
            InstallStrategy::EagerReinstall => {
                for hop in hops {
                    self.install_hop(switches, hop, flow_match)?;
                }
                Self::release(switches, first.dpid, packet)?;
            }
        }

        Ok(())
    }

    /// Marks a barrier as acknowledged and completes its waiting path if it was the last.
    ///
    /// # Returns
    /// `true` if a path completed.
    pub fn on_barrier_reply(&mut self, switches: &SwitchRegistry, dpid: Dpid, xid: Xid) -> bool {
        match self.ledger.acknowledge(dpid, xid) {
            Acknowledgement::Unknown => {
                log::debug!("Ignoring barrier reply {} from {}: no waiting path.", xid, dpid);
                false
            }
            Acknowledgement::Pending { remaining } => {
                log::trace!("Barrier reply {} from {}; {} outstanding.", xid, dpid, remaining);
                false
            }
            Acknowledgement::Completed(waiting_path) => {
                if waiting_path.packet.is_some() {
                    log::debug!("Sending delayed packet out {}.", waiting_path.first_switch);
                }
                if let Err(e) = Self::release(switches, waiting_path.first_switch, waiting_path.packet.as_ref()) {
                    log::error!("Failed to release packet at {}: {}", waiting_path.first_switch, e);
                }

                tracing::info!(
                    target: ANALYTICS_TARGET,
                    event = "PathInstalled",
                    first_switch = %waiting_path.first_switch,
                    hops = waiting_path.hops.len()
                );

                // No subscribers is fine.
                let _ = self.installed_tx.send(PathInstalled { hops: waiting_path.hops });
                true
            }
        }
    }

    /// Discards waiting paths past their deadline and frees the switch buffers they held.
    ///
    /// # Returns
    /// The number of discarded waiting paths.
    pub fn sweep_expired(&mut self, switches: &SwitchRegistry) -> usize {
        let now_ms = self.clock.get_current_time_in_ms();
        let expired = self.ledger.remove_expired(now_ms);

        for waiting_path in &expired {
            tracing::warn!(
                target: ANALYTICS_TARGET,
                event = "WaitingPathExpired",
                first_switch = %waiting_path.first_switch,
                hops = waiting_path.hops.len(),
                outstanding = waiting_path.outstanding.len()
            );

            if let Some(discard) = waiting_path.packet.as_ref().and_then(PacketOut::drop_buffer) {
                if let Err(e) = switches.send(waiting_path.first_switch, SwitchMessage::PacketOut(discard)) {
                    log::debug!("Could not free buffer at {}: {}", waiting_path.first_switch, e);
                }
            }
        }

        expired.len()
    }

    fn install_hop(&self, switches: &SwitchRegistry, hop: &Hop, flow_match: &FlowMatch) -> Result<()> {
        let flow_mod = FlowMod {
            flow_match: flow_match.with_in_port(hop.in_port),
            idle_timeout: self.flow_idle_timeout_s,
            hard_timeout: self.flow_hard_timeout_s,
            out_port: hop.out_port,
            buffer_id: None,
        };
        switches.send(hop.dpid, SwitchMessage::FlowMod(flow_mod))
    }

    fn release(switches: &SwitchRegistry, first_switch: Dpid, packet: Option<&PacketIn>) -> Result<()> {
        match packet {
            Some(packet) => switches.send(first_switch, SwitchMessage::PacketOut(PacketOut::resubmit(packet))),
            None => Ok(()),
        }
    }

    fn allocate_xid(&mut self) -> Xid {
        let xid = self.next_xid;
        self.next_xid = xid.next();
        xid
    }
}
