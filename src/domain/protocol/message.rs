use serde::{Deserialize, Serialize};

use crate::domain::protocol::flow_match::FlowMatch;
use crate::domain::protocol::frame::EthernetFrame;
use crate::domain::utils::id::{PortNo, Xid};

/// Port description reported by a switch when it connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDesc {
    pub port_no: PortNo,
    pub name: String,
    /// Current-feature bitmask (OpenFlow 1.0 `ofp_port_features`).
    pub curr: u32,
}

/// Frame punted to the controller by a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketIn {
    /// Switch-side buffer holding the frame, if the switch buffered it.
    pub buffer_id: Option<u32>,
    pub in_port: PortNo,
    pub frame: EthernetFrame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMod {
    pub flow_match: FlowMatch,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub out_port: PortNo,
    pub buffer_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketOut {
    pub buffer_id: Option<u32>,
    /// Frame to emit when the switch holds no buffer for it.
    pub data: Option<EthernetFrame>,
    pub in_port: PortNo,
    /// Output ports; empty means drop.
    pub actions: Vec<PortNo>,
}

impl PacketOut {
    /// Re-injects a punted packet into the switch's flow table.
    pub fn resubmit(packet: &PacketIn) -> PacketOut {
        PacketOut::referencing(packet, vec![PortNo::TABLE])
    }

    pub fn flood(packet: &PacketIn) -> PacketOut {
        PacketOut::referencing(packet, vec![PortNo::FLOOD])
    }

    /// Frees the switch buffer of a punted packet. Unbuffered packets need no message.
    pub fn drop_buffer(packet: &PacketIn) -> Option<PacketOut> {
        packet.buffer_id.map(|buffer_id| PacketOut { buffer_id: Some(buffer_id), data: None, in_port: packet.in_port, actions: Vec::new() })
    }

    /// Sends a controller-built frame out of one port.
    pub fn emit(frame: EthernetFrame, out_port: PortNo) -> PacketOut {
        PacketOut { buffer_id: None, data: Some(frame), in_port: PortNo::NONE, actions: vec![out_port] }
    }

    fn referencing(packet: &PacketIn, actions: Vec<PortNo>) -> PacketOut {
        let data = match packet.buffer_id {
            Some(_) => None,
            None => Some(packet.frame.clone()),
        };
        PacketOut { buffer_id: packet.buffer_id, data, in_port: packet.in_port, actions }
    }
}

/// Messages the controller sends to a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchMessage {
    FlowMod(FlowMod),
    BarrierRequest { xid: Xid },
    PacketOut(PacketOut),
}

impl SwitchMessage {
    pub fn is_flow_mod(&self) -> bool {
        matches!(self, SwitchMessage::FlowMod(_))
    }

    pub fn is_barrier_request(&self) -> bool {
        matches!(self, SwitchMessage::BarrierRequest { .. })
    }

    pub fn is_packet_out(&self) -> bool {
        matches!(self, SwitchMessage::PacketOut(_))
    }
}
