use serde::{Deserialize, Serialize};

use crate::domain::protocol::message::{PacketIn, PortDesc};
use crate::domain::switch::connection::SwitchConnection;
use crate::domain::utils::id::{ConnectionId, Dpid, PortNo, Xid};

/// A discovered switch-to-switch link came up or went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEvent {
    pub dpid1: Dpid,
    pub port1: PortNo,
    pub dpid2: Dpid,
    pub port2: PortNo,
    pub added: bool,
}

/// Events the network I/O layer delivers to the controller, one at a time.
pub trait SwitchEventSink {
    fn connection_up(&mut self, dpid: Dpid, connection: Box<dyn SwitchConnection>, ports: Vec<PortDesc>);

    fn connection_down(&mut self, dpid: Dpid, connection_id: ConnectionId);

    fn packet_in(&mut self, dpid: Dpid, packet: PacketIn);

    fn link_event(&mut self, event: LinkEvent);

    fn barrier_in(&mut self, dpid: Dpid, xid: Xid);

    /// Periodic housekeeping tick.
    fn sweep(&mut self);
}
