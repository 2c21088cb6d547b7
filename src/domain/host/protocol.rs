use actix::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::controller::event_sink::LinkEvent;
use crate::domain::protocol::message::{PacketIn, PortDesc, SwitchMessage};
use crate::domain::utils::id::{Dpid, Xid};

/// What a switch agent reports to the controller. `Features` must come first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SwitchReport {
    /// Handshake: datapath id and port list of the switch.
    Features { dpid: Dpid, ports: Vec<PortDesc> },
    PacketIn(PacketIn),
    BarrierReply { xid: Xid },
    /// Link discovery result for a link starting at this switch.
    LinkStatus(LinkEvent),
}

/// A message to write to the switch behind a session.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Outbound(pub SwitchMessage);

/// Asks a session to shut its connection down.
#[derive(Debug, Clone, Copy, Message)]
#[rtype(result = "()")]
pub struct CloseSession;
